//! Core types and settings for the pedometer pipeline

use nalgebra::Vector3;

use crate::error::{PedometerError, Result};

/// Raw accelerometer sample
///
/// Acceleration along the three device axes in m/s² with gravity already
/// removed by the sensor (linear acceleration), tagged with the sensor's
/// nanosecond timestamp. Samples are consumed by value and never retained.
///
/// # Example
/// ```
/// use pedometer_dsp::Sample;
///
/// let sample = Sample::new(0.1, -0.2, 0.3, 20_000_000);
/// assert_eq!(sample.axes().z, 0.3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Sensor timestamp in nanoseconds
    pub timestamp_ns: i64,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ns: i64) -> Self {
        Self { x, y, z, timestamp_ns }
    }

    /// Build a sample from an axis vector
    pub fn from_axes(axes: Vector3<f32>, timestamp_ns: i64) -> Self {
        Self::new(axes.x, axes.y, axes.z, timestamp_ns)
    }

    /// The three axes as a vector
    pub fn axes(&self) -> Vector3<f32> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Intermediate values of the most recently processed sample
///
/// Overwritten on every call to
/// [`StepDetectionManager::process`](crate::StepDetectionManager::process).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Axes after the gravity bias has been applied to Z
    pub axes: Vector3<f32>,
    /// Acceleration magnitude with 1 g removed
    pub scalar: f32,
    /// Value handed to the zero-crossing detector (low-pass output when enabled)
    pub filtered: f32,
    /// Gradient at an upward zero crossing, 0 otherwise
    pub peak: f32,
    /// Dynamic threshold after this sample
    pub threshold: f32,
    pub timestamp_ns: i64,
}

impl FrameState {
    /// The five values emitted to a log sink for this sample
    pub fn record(&self) -> SampleRecord {
        SampleRecord {
            scalar: self.scalar,
            filtered: self.filtered,
            peak: self.peak,
            threshold: self.threshold,
            timestamp_ns: self.timestamp_ns,
        }
    }
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            axes: Vector3::zeros(),
            scalar: 0.0,
            filtered: 0.0,
            peak: 0.0,
            threshold: 0.0,
            timestamp_ns: 0,
        }
    }
}

/// One logged row: scalar, filtered, peak, threshold, timestamp
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleRecord {
    pub scalar: f32,
    pub filtered: f32,
    pub peak: f32,
    pub threshold: f32,
    pub timestamp_ns: i64,
}

/// Step detection settings
///
/// Configuration for [`StepDetectionManager`](crate::StepDetectionManager).
/// The defaults are the values the detector was tuned with.
///
/// # Example
/// ```
/// use pedometer_dsp::PedometerSettings;
///
/// let settings = PedometerSettings {
///     threshold_percent: 60,     // more sensitive trigger
///     low_pass_enabled: true,
///     ..Default::default()
/// };
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedometerSettings {
    /// Fraction of the dynamic threshold a peak must exceed, in percent (0-100)
    pub threshold_percent: u8,
    /// Whether the low-pass output drives detection
    ///
    /// The filter is fed either way so its state stays warm.
    pub low_pass_enabled: bool,
    /// Initial low-pass cutoff as a fraction of the sample rate
    ///
    /// Replaced by `4 Hz / sample rate` whenever the host queries
    /// [`sample_rate`](crate::StepDetectionManager::sample_rate).
    pub cutoff: f32,
    /// Number of cascaded single-pole stages
    pub stage_count: usize,
}

impl PedometerSettings {
    /// Check the settings are inside their documented domain
    pub fn validate(&self) -> Result<()> {
        if self.threshold_percent > 100 {
            return Err(PedometerError::InvalidThreshold(self.threshold_percent));
        }
        if !self.cutoff.is_finite() || self.cutoff <= 0.0 {
            return Err(PedometerError::InvalidCutoff(self.cutoff));
        }
        Ok(())
    }
}

impl Default for PedometerSettings {
    fn default() -> Self {
        Self {
            threshold_percent: 70,
            low_pass_enabled: false,
            cutoff: 0.0625,
            stage_count: 4,
        }
    }
}
