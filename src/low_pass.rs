//! Cascaded single-pole IIR low-pass filter

use crate::filter::SignalFilter;

/// Low-pass filter built from identical single-pole recursive stages
///
/// Each stage computes `y = gain·x + decay·y[n-1]` with
/// `decay = e^(-2π·fc)` and `gain = 1 - decay`, where `fc` is the cutoff as a
/// fraction of the sample rate. The output of one stage is the input of the
/// next, so `N` stages give an `N`-th order roll-off.
///
/// The stage count is fixed at construction. With zero stages the filter is
/// a pass-through.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    /// Normalized cutoff frequency (cycles per sample)
    cutoff: f32,
    /// Input weight
    gain: f32,
    /// Feedback weight
    decay: f32,
    /// One accumulator per cascade stage
    stages: Box<[f32]>,
}

impl LowPassFilter {
    /// Create a filter with the given normalized cutoff and number of stages
    ///
    /// # Arguments
    /// * `normalized_cutoff` - Cutoff frequency divided by the sample rate
    /// * `stage_count` - Number of cascaded single-pole stages
    ///
    /// # Example
    /// ```
    /// use pedometer_dsp::LowPassFilter;
    ///
    /// // 4 Hz corner at 64 Hz sampling, fourth order
    /// let filter = LowPassFilter::new(4.0 / 64.0, 4);
    /// assert_eq!(filter.stage_count(), 4);
    /// ```
    pub fn new(normalized_cutoff: f32, stage_count: usize) -> Self {
        let mut filter = Self {
            cutoff: normalized_cutoff,
            gain: 0.0,
            decay: 0.0,
            stages: vec![0.0; stage_count].into_boxed_slice(),
        };
        filter.compute_weights();
        filter
    }

    /// Change the cutoff, keeping the accumulated stage state
    pub fn set_cutoff(&mut self, normalized_cutoff: f32) {
        self.cutoff = normalized_cutoff;
        self.compute_weights();
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn decay(&self) -> f32 {
        self.decay
    }

    fn compute_weights(&mut self) {
        let decay = (-2.0 * core::f32::consts::PI * self.cutoff).exp();
        self.decay = decay;
        self.gain = 1.0 - decay;
    }
}

impl SignalFilter for LowPassFilter {
    fn reset(&mut self) {
        self.stages.fill(0.0);
    }

    fn process(&mut self, sample: f32, _timestamp_ns: i64) -> f32 {
        let mut y = sample;
        for stage in self.stages.iter_mut() {
            y = self.gain * y + self.decay * *stage;
            *stage = y;
        }
        y
    }
}
