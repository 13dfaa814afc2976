//! Step detection pipeline and session statistics

use nalgebra::Vector3;

use crate::calibration::{bias_correct, rebias_offset, scalar_magnitude};
use crate::error::Result;
use crate::filter::SignalFilter;
use crate::low_pass::LowPassFilter;
use crate::sensor::AccelerationListener;
use crate::sink::{LogSink, NullSink};
use crate::state::PedometerSnapshot;
use crate::threshold::ThresholdEstimator;
use crate::types::{FrameState, PedometerSettings, Sample};
use crate::zero_crossing::ZeroCrossingDetector;

/// Samples per batch; one batch per display update
pub const SAMPLES_PER_BATCH: u32 = 8;

/// Batches per step-rate window
pub const BATCHES_PER_WINDOW: u32 = 16;

/// Low-pass corner kept in place by [`StepDetectionManager::sample_rate`]
const TARGET_CORNER_HZ: f32 = 4.0;

const NANOS_PER_SECOND: f64 = 1e9;
const NANOS_PER_MINUTE: f64 = 60.0 * NANOS_PER_SECOND;

/// Step detection manager
///
/// Owns the filter chain and all per-session statistics. Each call to
/// [`process`](Self::process) runs one sample through:
///
/// 1. Z-axis gravity bias and magnitude extraction
/// 2. The cascaded low-pass filter (always fed; used only when enabled)
/// 3. The zero-crossing detector, giving the peak strength
/// 4. The dynamic threshold, updated on every nonzero peak
/// 5. The step decision: `peak > threshold_percent / 100 * threshold`
/// 6. The attached log sink, if any
/// 7. Batch accounting for run time, sample rate and step rate
///
/// The manager performs no I/O of its own and never fails. All mutation goes
/// through `&mut self`; hosts reading statistics from another thread must
/// serialize access themselves.
///
/// # Example
/// ```
/// use pedometer_dsp::{Sample, StepDetectionManager};
///
/// let mut manager = StepDetectionManager::new();
///
/// for i in 0..64 {
///     // replace with sensor data in m/s², gravity removed
///     let z = if (i / 8) % 2 == 0 { -0.7 } else { 0.3 };
///     let sample = Sample::new(0.0, 0.0, z, 1_000_000_000 + i * 20_000_000);
///
///     if manager.process(sample) {
///         println!("steps: {}, rate: {:.1} Hz", manager.steps(), manager.sample_rate());
///     }
/// }
/// assert_eq!(manager.steps(), 4);
/// ```
#[derive(Debug)]
pub struct StepDetectionManager<S = NullSink> {
    settings: PedometerSettings,
    low_pass: LowPassFilter,
    zero_crossing: ZeroCrossingDetector,
    threshold_estimator: ThresholdEstimator,
    /// Values of the most recent sample
    frame: FrameState,
    sink: Option<S>,

    steps: u32,
    run_time_ns: u64,
    offset: f32,
    last_peak: f32,
    /// Current dynamic threshold, carried forward between peaks
    dynamic_threshold: f32,
    /// Steps per minute over the last closed window
    step_rate: f32,

    /// Samples since the last batch, mod [`SAMPLES_PER_BATCH`]
    sample_counter: u32,
    last_batch_ns: Option<i64>,
    batch_length_ns: i64,

    block_steps: u32,
    block_index: u32,
    window_start_ns: Option<i64>,
    window_end_ns: i64,
}

impl StepDetectionManager<NullSink> {
    /// Create a manager with default settings and no log sink
    pub fn new() -> Self {
        Self::with_settings(PedometerSettings::default())
    }

    /// Create a manager with the given settings and no log sink
    pub fn with_settings(settings: PedometerSettings) -> Self {
        Self::build(settings, None)
    }

    /// Resume a session from persisted values
    ///
    /// Filters and batch statistics start fresh; only the snapshot fields are
    /// carried over.
    pub fn restore(snapshot: PedometerSnapshot) -> Result<Self> {
        let mut manager = Self::new();
        manager.apply_snapshot(snapshot)?;
        Ok(manager)
    }
}

impl Default for StepDetectionManager<NullSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LogSink> StepDetectionManager<S> {
    /// Create a manager that emits every processed sample to `sink`
    ///
    /// # Example
    /// ```
    /// use pedometer_dsp::{PedometerSettings, RecordBuffer, Sample, StepDetectionManager};
    ///
    /// let mut manager =
    ///     StepDetectionManager::with_sink(PedometerSettings::default(), RecordBuffer::new());
    /// manager.process(Sample::new(0.0, 0.0, 0.0, 0));
    ///
    /// let buffer = manager.detach_sink().unwrap();
    /// assert_eq!(buffer.records().len(), 1);
    /// ```
    pub fn with_sink(settings: PedometerSettings, sink: S) -> Self {
        Self::build(settings, Some(sink))
    }

    fn build(mut settings: PedometerSettings, sink: Option<S>) -> Self {
        settings.threshold_percent = clamp_percent(settings.threshold_percent);
        settings.cutoff = checked_cutoff(settings.cutoff);

        Self {
            settings,
            low_pass: LowPassFilter::new(settings.cutoff, settings.stage_count),
            zero_crossing: ZeroCrossingDetector::new(),
            threshold_estimator: ThresholdEstimator::new(),
            frame: FrameState::default(),
            sink,
            steps: 0,
            run_time_ns: 0,
            offset: 0.0,
            last_peak: 0.0,
            dynamic_threshold: 0.0,
            step_rate: 0.0,
            sample_counter: 0,
            last_batch_ns: None,
            batch_length_ns: 0,
            block_steps: 0,
            block_index: 0,
            window_start_ns: None,
            window_end_ns: 0,
        }
    }

    /// Process one accelerometer sample
    ///
    /// # Arguments
    /// * `sample` - Linear acceleration in m/s² with its nanosecond timestamp
    ///
    /// # Returns
    /// `true` once every [`SAMPLES_PER_BATCH`] samples, when run time and
    /// statistics have been updated and a display refresh is due
    pub fn process(&mut self, sample: Sample) -> bool {
        self.process_axes(sample.axes(), sample.timestamp_ns)
    }

    /// Process one sample given as an axis vector
    pub fn process_axes(&mut self, axes: Vector3<f32>, timestamp_ns: i64) -> bool {
        let biased = bias_correct(axes);
        let scalar = scalar_magnitude(biased);

        let low_passed = self.low_pass.process(scalar, timestamp_ns);
        let filtered = if self.settings.low_pass_enabled {
            low_passed
        } else {
            scalar
        };

        let peak = self.zero_crossing.process(filtered, timestamp_ns);
        if peak != 0.0 {
            self.dynamic_threshold = self.threshold_estimator.process(peak, timestamp_ns);
        }

        let trigger = f32::from(self.settings.threshold_percent) / 100.0 * self.dynamic_threshold;
        if peak > trigger {
            self.last_peak = peak;
            self.steps = self.steps.saturating_add(1);
            self.block_steps = self.block_steps.saturating_add(1);
            log::debug!(
                "Step {} at {} ns: peak {:.3} > trigger {:.3}",
                self.steps,
                timestamp_ns,
                peak,
                trigger
            );
        }

        self.frame = FrameState {
            axes: biased,
            scalar,
            filtered,
            peak,
            threshold: self.dynamic_threshold,
            timestamp_ns,
        };
        log::trace!("{:?}", self.frame);

        self.write_log_record();

        self.sample_counter = (self.sample_counter + 1) % SAMPLES_PER_BATCH;
        if self.sample_counter != 0 {
            return false;
        }
        self.complete_batch(timestamp_ns);
        true
    }

    /// Reset the step count and run time and re-zero the calibration
    ///
    /// The offset absorbs the current scalar reading, and the dynamic
    /// threshold starts again from an empty history.
    pub fn reset(&mut self) {
        self.steps = 0;
        self.run_time_ns = 0;
        self.offset = rebias_offset(self.offset, self.frame.scalar);
        self.threshold_estimator.reset();
        self.dynamic_threshold = 0.0;
        log::info!("Pedometer reset, calibration offset now {:.4}", self.offset);
    }

    /// Sample rate over the most recent batch in Hz
    ///
    /// Also retunes the low-pass cutoff to keep its corner near 4 Hz at the
    /// measured rate. Returns 0 until two batches have completed.
    pub fn sample_rate(&mut self) -> f32 {
        if self.batch_length_ns <= 0 {
            return 0.0;
        }
        let rate =
            (f64::from(SAMPLES_PER_BATCH) * NANOS_PER_SECOND / self.batch_length_ns as f64) as f32;
        self.low_pass.set_cutoff(TARGET_CORNER_HZ / rate);
        rate
    }

    /// Attach a log sink, returning the one it replaces
    pub fn attach_sink(&mut self, sink: S) -> Option<S> {
        log::info!("Sample log attached");
        self.sink.replace(sink)
    }

    /// Detach and return the log sink
    pub fn detach_sink(&mut self) -> Option<S> {
        let sink = self.sink.take();
        if sink.is_some() {
            log::info!("Sample log detached");
        }
        sink
    }

    pub fn sink(&self) -> Option<&S> {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> Option<&mut S> {
        self.sink.as_mut()
    }

    /// Persistable values of this session
    pub fn snapshot(&self) -> PedometerSnapshot {
        PedometerSnapshot {
            run_time_ns: self.run_time_ns,
            offset: self.offset,
            threshold_percent: self.settings.threshold_percent,
            steps: self.steps,
            low_pass_enabled: self.settings.low_pass_enabled,
        }
    }

    /// Load persisted values into this manager
    pub fn apply_snapshot(&mut self, snapshot: PedometerSnapshot) -> Result<()> {
        snapshot.validate()?;
        self.run_time_ns = snapshot.run_time_ns;
        self.offset = snapshot.offset;
        self.settings.threshold_percent = snapshot.threshold_percent;
        self.steps = snapshot.steps;
        self.settings.low_pass_enabled = snapshot.low_pass_enabled;
        log::info!(
            "Restored session: {} steps, {} ns run time",
            snapshot.steps,
            snapshot.run_time_ns
        );
        Ok(())
    }

    /// Update settings
    ///
    /// A new cutoff keeps the filter state. The stage count is fixed at
    /// construction; a different count is ignored with a warning.
    pub fn set_settings(&mut self, mut settings: PedometerSettings) {
        let stage_count = self.low_pass.stage_count();
        if settings.stage_count != stage_count {
            log::warn!(
                "Low-pass stage count is fixed at {}, ignoring {}",
                stage_count,
                settings.stage_count
            );
            settings.stage_count = stage_count;
        }

        settings.cutoff = checked_cutoff(settings.cutoff);
        if settings.cutoff != self.settings.cutoff {
            self.low_pass.set_cutoff(settings.cutoff);
        }

        settings.threshold_percent = clamp_percent(settings.threshold_percent);
        self.settings = settings;
    }

    pub fn settings(&self) -> PedometerSettings {
        self.settings
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn set_steps(&mut self, steps: u32) {
        self.steps = steps;
    }

    /// Accumulated run time in nanoseconds
    pub fn run_time_ns(&self) -> u64 {
        self.run_time_ns
    }

    pub fn set_run_time_ns(&mut self, run_time_ns: u64) {
        self.run_time_ns = run_time_ns;
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f32) {
        self.offset = offset;
    }

    pub fn threshold_percent(&self) -> u8 {
        self.settings.threshold_percent
    }

    /// Set the step trigger percentage; values above 100 are clamped
    pub fn set_threshold_percent(&mut self, percent: u8) {
        self.settings.threshold_percent = clamp_percent(percent);
    }

    pub fn low_pass_enabled(&self) -> bool {
        self.settings.low_pass_enabled
    }

    pub fn set_low_pass_enabled(&mut self, enabled: bool) {
        self.settings.low_pass_enabled = enabled;
    }

    /// Peak strength of the most recent step
    pub fn last_peak(&self) -> f32 {
        self.last_peak
    }

    /// Steps per minute over the last completed window
    pub fn step_rate(&self) -> f32 {
        self.step_rate
    }

    /// Scalar magnitude of the most recent sample
    pub fn scalar_acceleration(&self) -> f32 {
        self.frame.scalar
    }

    /// Scalar magnitude of the most recent sample with the offset applied
    pub fn calibrated_scalar(&self) -> f32 {
        self.frame.scalar + self.offset
    }

    pub fn dynamic_threshold(&self) -> f32 {
        self.dynamic_threshold
    }

    /// Steps counted in the current step-rate window
    pub fn block_steps(&self) -> u32 {
        self.block_steps
    }

    pub fn frame(&self) -> &FrameState {
        &self.frame
    }

    pub fn low_pass_filter(&self) -> &LowPassFilter {
        &self.low_pass
    }

    pub fn threshold_estimator(&self) -> &ThresholdEstimator {
        &self.threshold_estimator
    }

    fn write_log_record(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.append_value(self.frame.scalar);
            sink.append_value(self.frame.filtered);
            sink.append_value(self.frame.peak);
            sink.append_value(self.frame.threshold);
            sink.append_timestamp(self.frame.timestamp_ns);
            sink.end_record();
        }
    }

    /// Fold the finished batch into run time and the step-rate window
    fn complete_batch(&mut self, timestamp_ns: i64) {
        self.batch_length_ns = match self.last_batch_ns {
            Some(previous) => timestamp_ns.saturating_sub(previous).max(0),
            None => 0,
        };
        self.last_batch_ns = Some(timestamp_ns);
        self.run_time_ns = self.run_time_ns.saturating_add(self.batch_length_ns as u64);

        self.block_index += 1;
        if self.block_index == BATCHES_PER_WINDOW {
            self.close_window(timestamp_ns);
        }
    }

    fn close_window(&mut self, timestamp_ns: i64) {
        self.window_end_ns = timestamp_ns;
        self.step_rate = match self.window_start_ns {
            Some(start) if self.window_end_ns > start => {
                let minutes = self.window_end_ns.saturating_sub(start) as f64 / NANOS_PER_MINUTE;
                (f64::from(self.block_steps) / minutes) as f32
            }
            _ => 0.0,
        };
        log::debug!(
            "Step-rate window closed: {} steps, {:.1} steps/min",
            self.block_steps,
            self.step_rate
        );

        self.window_start_ns = Some(timestamp_ns);
        self.block_steps = 0;
        self.block_index = 0;
    }
}

impl<S: LogSink> AccelerationListener for StepDetectionManager<S> {
    fn on_acceleration(&mut self, sample: Sample) -> bool {
        self.process(sample)
    }
}

fn clamp_percent(percent: u8) -> u8 {
    if percent > 100 {
        log::warn!("Threshold percent {} clamped to 100", percent);
        100
    } else {
        percent
    }
}

/// Cutoff to use for `cutoff`, falling back to the default when it is not
/// a positive finite fraction
fn checked_cutoff(cutoff: f32) -> f32 {
    if cutoff.is_finite() && cutoff > 0.0 {
        cutoff
    } else {
        let fallback = PedometerSettings::default().cutoff;
        log::warn!("Invalid low-pass cutoff {}, using {}", cutoff, fallback);
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::BIAS_MARGIN;
    use crate::sink::RecordBuffer;

    const START_NS: i64 = 1_000_000_000;

    /// Sample whose scalar magnitude is `scalar` (Z axis only)
    fn vertical(scalar: f32, timestamp_ns: i64) -> Sample {
        Sample::new(0.0, 0.0, scalar - BIAS_MARGIN, timestamp_ns)
    }

    /// Square wave: 8 samples at -0.5 then 8 at +0.5, 10 ms apart
    fn square_wave(index: i64) -> Sample {
        let scalar = if (index / 8) % 2 == 0 { -0.5 } else { 0.5 };
        vertical(scalar, START_NS + index * 10_000_000)
    }

    #[test]
    fn test_new_manager() {
        let manager = StepDetectionManager::new();
        assert_eq!(manager.steps(), 0);
        assert_eq!(manager.run_time_ns(), 0);
        assert_eq!(manager.threshold_percent(), 70);
        assert!(!manager.low_pass_enabled());
        assert_eq!(manager.low_pass_filter().stage_count(), 4);
        assert_eq!(manager.low_pass_filter().cutoff(), 0.0625);
        assert!(manager.sink().is_none());
    }

    #[test]
    fn test_single_crossing_counts_one_step() {
        let mut manager = StepDetectionManager::new();
        let scalars = [-0.5, -0.5, -0.5, -0.5, -0.5, -0.5, 0.5, 0.5];

        let mut ready = Vec::new();
        for (i, &scalar) in scalars.iter().enumerate() {
            ready.push(manager.process(vertical(scalar, START_NS + i as i64 * 200_000_000)));
        }

        assert_eq!(ready, [false, false, false, false, false, false, false, true]);
        assert_eq!(manager.steps(), 1);
        assert!((manager.last_peak() - 5.0).abs() < 1e-3);
        assert!((manager.dynamic_threshold() - 0.533 * 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_threshold_carries_forward() {
        let mut manager = StepDetectionManager::new();
        manager.process(vertical(-1.0, START_NS));
        manager.process(vertical(1.0, START_NS + 100_000_000));
        let threshold = manager.dynamic_threshold();
        assert!(threshold > 0.0);

        manager.process(vertical(2.0, START_NS + 200_000_000));
        assert_eq!(manager.frame().peak, 0.0);
        assert_eq!(manager.dynamic_threshold(), threshold);
        assert_eq!(manager.frame().threshold, threshold);
    }

    #[test]
    fn test_weak_peak_rejected() {
        let mut manager = StepDetectionManager::new();
        // Strong crossing: 2.0 over 0.1 s
        manager.process(vertical(-1.0, START_NS));
        manager.process(vertical(1.0, START_NS + 100_000_000));
        assert_eq!(manager.steps(), 1);

        // Weak crossing: 0.02 over 0.1 s
        manager.process(vertical(-0.01, START_NS + 200_000_000));
        manager.process(vertical(0.01, START_NS + 300_000_000));
        assert_eq!(manager.steps(), 1);
        assert!(manager.frame().peak > 0.0);
        assert!((manager.last_peak() - 20.0).abs() < 1e-2);
    }

    #[test]
    fn test_zero_percent_counts_every_peak() {
        let settings = PedometerSettings {
            threshold_percent: 0,
            ..Default::default()
        };
        let mut manager = StepDetectionManager::with_settings(settings);
        manager.process(vertical(-1.0, START_NS));
        manager.process(vertical(1.0, START_NS + 100_000_000));
        manager.process(vertical(-0.01, START_NS + 200_000_000));
        manager.process(vertical(0.01, START_NS + 300_000_000));
        assert_eq!(manager.steps(), 2);
    }

    #[test]
    fn test_batch_cadence() {
        let mut manager = StepDetectionManager::new();
        for i in 0..64 {
            let ready = manager.process(square_wave(i));
            assert_eq!(ready, i % 8 == 7, "sample {}", i);
        }
    }

    #[test]
    fn test_run_time_accumulates() {
        let mut manager = StepDetectionManager::new();
        for i in 0..8 {
            manager.process(square_wave(i));
        }
        // First batch has no reference point
        assert_eq!(manager.run_time_ns(), 0);

        for i in 8..24 {
            manager.process(square_wave(i));
        }
        assert_eq!(manager.run_time_ns(), 160_000_000);
    }

    #[test]
    fn test_sample_rate_retunes_low_pass() {
        let mut manager = StepDetectionManager::new();
        assert_eq!(manager.sample_rate(), 0.0);
        assert_eq!(manager.low_pass_filter().cutoff(), 0.0625);

        for i in 0..16 {
            manager.process(square_wave(i));
        }
        let rate = manager.sample_rate();
        assert!((rate - 100.0).abs() < 1e-3);
        assert!((manager.low_pass_filter().cutoff() - 0.04).abs() < 1e-6);
    }

    #[test]
    fn test_step_rate_window() {
        let mut manager = StepDetectionManager::new();
        let window = i64::from(SAMPLES_PER_BATCH * BATCHES_PER_WINDOW);

        for i in 0..window {
            manager.process(square_wave(i));
        }
        // First window has no start reference
        assert_eq!(manager.step_rate(), 0.0);
        assert_eq!(manager.block_steps(), 0);

        for i in window..2 * window {
            manager.process(square_wave(i));
        }
        // 8 steps over 1.28 s
        assert!((manager.step_rate() - 375.0).abs() < 1e-2);
        assert_eq!(manager.steps(), 16);
    }

    #[test]
    fn test_low_pass_disabled_uses_scalar() {
        let mut manager = StepDetectionManager::new();
        for i in 0..10 {
            manager.process(square_wave(i));
            assert_eq!(manager.frame().filtered, manager.frame().scalar);
        }
    }

    #[test]
    fn test_low_pass_state_stays_warm() {
        let mut manager = StepDetectionManager::new();
        let mut reference = LowPassFilter::new(0.0625, 4);

        for i in 0..12 {
            let sample = square_wave(i);
            manager.process(sample);
            reference.process(manager.frame().scalar, sample.timestamp_ns);
        }

        manager.set_low_pass_enabled(true);
        let sample = square_wave(12);
        manager.process(sample);
        let expected = reference.process(manager.frame().scalar, sample.timestamp_ns);
        assert_eq!(manager.frame().filtered, expected);
        assert_ne!(manager.frame().filtered, manager.frame().scalar);
    }

    #[test]
    fn test_reset() {
        let mut manager = StepDetectionManager::new();
        for i in 0..40 {
            manager.process(square_wave(i));
        }
        assert!(manager.steps() > 0);
        assert!(manager.run_time_ns() > 0);

        let scalar = manager.scalar_acceleration();
        manager.reset();
        assert_eq!(manager.steps(), 0);
        assert_eq!(manager.run_time_ns(), 0);
        assert_eq!(manager.dynamic_threshold(), 0.0);
        assert!((manager.offset() + scalar).abs() < 1e-6);
        assert!(manager.calibrated_scalar().abs() < 1e-6);
        assert_eq!(manager.threshold_estimator().history(), &[0.0; 4]);
    }

    #[test]
    fn test_threshold_after_reset_uses_first_weight() {
        let mut manager = StepDetectionManager::new();
        for i in 0..40 {
            manager.process(square_wave(i));
        }
        manager.reset();

        // Index 40 is the next upward crossing
        manager.process(square_wave(40));
        let peak = manager.frame().peak;
        assert!((peak - 100.0).abs() < 1e-2);
        assert!((manager.dynamic_threshold() - 0.533 * peak).abs() < 1e-3);
        assert_eq!(manager.steps(), 1);
    }

    #[test]
    fn test_sink_receives_every_sample() {
        let mut manager =
            StepDetectionManager::with_sink(PedometerSettings::default(), RecordBuffer::new());
        let mut frames = Vec::new();
        for i in 0..20 {
            manager.process(square_wave(i));
            frames.push(manager.frame().record());
        }

        let buffer = manager.detach_sink().unwrap();
        assert_eq!(buffer.records(), frames.as_slice());
        assert!(manager.sink().is_none());

        // Detached: nothing more is recorded anywhere
        manager.process(square_wave(20));
        assert!(manager.detach_sink().is_none());
    }

    #[test]
    fn test_attach_replaces_sink() {
        let mut manager =
            StepDetectionManager::with_sink(PedometerSettings::default(), RecordBuffer::new());
        manager.process(square_wave(0));

        let previous = manager.attach_sink(RecordBuffer::new()).unwrap();
        assert_eq!(previous.records().len(), 1);
        manager.process(square_wave(1));
        assert_eq!(manager.sink().unwrap().records().len(), 1);
    }

    #[test]
    fn test_threshold_percent_clamped() {
        let mut manager = StepDetectionManager::new();
        manager.set_threshold_percent(250);
        assert_eq!(manager.threshold_percent(), 100);
        manager.set_threshold_percent(55);
        assert_eq!(manager.threshold_percent(), 55);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut manager = StepDetectionManager::new();
        manager.set_steps(321);
        manager.set_run_time_ns(5_000_000_000);
        manager.set_offset(-0.125);
        manager.set_threshold_percent(80);
        manager.set_low_pass_enabled(true);

        let restored = StepDetectionManager::restore(manager.snapshot()).unwrap();
        assert_eq!(restored.steps(), 321);
        assert_eq!(restored.run_time_ns(), 5_000_000_000);
        assert_eq!(restored.offset(), -0.125);
        assert_eq!(restored.threshold_percent(), 80);
        assert!(restored.low_pass_enabled());
    }

    #[test]
    fn test_restore_rejects_bad_threshold() {
        let snapshot = PedometerSnapshot {
            threshold_percent: 120,
            ..Default::default()
        };
        assert!(StepDetectionManager::restore(snapshot).is_err());
    }

    #[test]
    fn test_set_settings() {
        let mut manager = StepDetectionManager::new();
        manager.set_settings(PedometerSettings {
            cutoff: 0.1,
            ..Default::default()
        });
        assert_eq!(manager.low_pass_filter().cutoff(), 0.1);
        assert_eq!(manager.low_pass_filter().stage_count(), 4);

        manager.set_settings(PedometerSettings::default());
        assert_eq!(manager.low_pass_filter().cutoff(), 0.0625);
    }

    #[test]
    fn test_stage_count_fixed_after_construction() {
        let settings = PedometerSettings {
            stage_count: 2,
            ..Default::default()
        };
        let mut manager = StepDetectionManager::with_settings(settings);
        assert_eq!(manager.low_pass_filter().stage_count(), 2);

        manager.set_settings(PedometerSettings {
            stage_count: 9,
            cutoff: 0.1,
            ..Default::default()
        });
        assert_eq!(manager.low_pass_filter().stage_count(), 2);
        assert_eq!(manager.settings().stage_count, 2);
        // Other fields still apply
        assert_eq!(manager.low_pass_filter().cutoff(), 0.1);
    }

    #[test]
    fn test_invalid_cutoff_falls_back_to_default() {
        let settings = PedometerSettings {
            cutoff: f32::NAN,
            low_pass_enabled: true,
            ..Default::default()
        };
        let mut manager = StepDetectionManager::with_settings(settings);
        assert_eq!(manager.low_pass_filter().cutoff(), 0.0625);
        assert_eq!(manager.settings().cutoff, 0.0625);

        for i in 0..24 {
            manager.process(square_wave(i));
            assert!(manager.frame().filtered.is_finite(), "sample {}", i);
        }

        manager.set_settings(PedometerSettings {
            cutoff: 0.1,
            ..Default::default()
        });
        manager.set_settings(PedometerSettings {
            cutoff: -0.5,
            ..Default::default()
        });
        assert_eq!(manager.low_pass_filter().cutoff(), 0.0625);
        assert_eq!(manager.settings().cutoff, 0.0625);
    }

    #[test]
    fn test_wide_timestamp_gap_between_batches() {
        let mut manager = StepDetectionManager::new();
        for i in 0..8 {
            manager.process(vertical(-0.5, i64::MIN + i));
        }
        for i in 0..8 {
            manager.process(vertical(0.5, 1 + i));
        }

        // Batch length saturates instead of overflowing
        assert_eq!(manager.run_time_ns(), i64::MAX as u64);
        assert_eq!(manager.steps(), 1);
        assert!(manager.last_peak().is_finite());
    }

    #[test]
    fn test_zero_length_window_reports_no_rate() {
        let mut manager = StepDetectionManager::new();
        let window = i64::from(SAMPLES_PER_BATCH * BATCHES_PER_WINDOW);

        for i in 0..2 * window {
            manager.process(square_wave(i));
        }
        assert!((manager.step_rate() - 375.0).abs() < 1e-2);

        // A whole window of samples sharing the previous close timestamp
        let frozen_ns = square_wave(2 * window - 1).timestamp_ns;
        for i in 2 * window..3 * window {
            let sample = square_wave(i);
            manager.process(Sample::new(sample.x, sample.y, sample.z, frozen_ns));
        }
        assert_eq!(manager.step_rate(), 0.0);
        assert_eq!(manager.run_time_ns(), (2 * window - 8) as u64 * 10_000_000);
    }
}
