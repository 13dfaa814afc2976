//! Weighted moving average used as the dynamic step threshold

use crate::filter::SignalFilter;

/// Number of peak strengths kept in the history
pub const THRESHOLD_TAPS: usize = 4;

/// Tap weights, newest first; an approximately exponential decay summing to 1
pub const THRESHOLD_WEIGHTS: [f32; THRESHOLD_TAPS] = [0.533, 0.267, 0.133, 0.067];

/// Four-tap weighted average of recent peak strengths
///
/// Every call shifts the history by one slot, dropping the oldest value, and
/// returns the weighted sum with the newest value weighted highest. The
/// manager only feeds it nonzero peaks, so its output tracks the intensity of
/// recent steps.
///
/// # Example
/// ```
/// use pedometer_dsp::{SignalFilter, ThresholdEstimator};
///
/// let mut estimator = ThresholdEstimator::new();
/// let first = estimator.process(10.0, 0);
/// assert!((first - 5.33).abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdEstimator {
    history: [f32; THRESHOLD_TAPS],
}

impl ThresholdEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored peak strengths, most recent first
    pub fn history(&self) -> &[f32; THRESHOLD_TAPS] {
        &self.history
    }
}

impl SignalFilter for ThresholdEstimator {
    fn reset(&mut self) {
        self.history = [0.0; THRESHOLD_TAPS];
    }

    fn process(&mut self, sample: f32, _timestamp_ns: i64) -> f32 {
        self.history.rotate_right(1);
        self.history[0] = sample;

        self.history
            .iter()
            .zip(THRESHOLD_WEIGHTS.iter())
            .map(|(value, weight)| value * weight)
            .sum()
    }
}
