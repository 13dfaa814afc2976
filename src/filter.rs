//! Common interface for the single-channel signal filters

/// A single-channel filter advanced one timestamped sample at a time
///
/// Implemented by [`LowPassFilter`](crate::LowPassFilter),
/// [`ZeroCrossingDetector`](crate::ZeroCrossingDetector) and
/// [`ThresholdEstimator`](crate::ThresholdEstimator). Filters that do not
/// depend on sample timing accept the timestamp and ignore it.
///
/// # Example
/// ```
/// use pedometer_dsp::{LowPassFilter, SignalFilter, ThresholdEstimator};
///
/// fn run(filter: &mut dyn SignalFilter, input: &[f32]) -> f32 {
///     let mut out = 0.0;
///     for (i, &value) in input.iter().enumerate() {
///         out = filter.process(value, i as i64 * 20_000_000);
///     }
///     out
/// }
///
/// let mut estimator = ThresholdEstimator::new();
/// let mut low_pass = LowPassFilter::new(0.0625, 4);
/// assert!((run(&mut estimator, &[2.0; 4]) - 2.0).abs() < 1e-5);
/// assert!(run(&mut low_pass, &[1.0; 4]) < 1.0);
/// ```
pub trait SignalFilter {
    /// Clear all internal history
    fn reset(&mut self);

    /// Process one sample and return the filter output
    fn process(&mut self, sample: f32, timestamp_ns: i64) -> f32;
}
