//! Long-lived pedometer values that survive a restart

use crate::error::{PedometerError, Result};

/// Values a host persists between sessions
///
/// Produced by [`StepDetectionManager::snapshot`](crate::StepDetectionManager::snapshot)
/// and consumed by [`StepDetectionManager::restore`](crate::StepDetectionManager::restore).
/// The storage format is up to the host; with the `serde` feature the
/// snapshot serializes with any serde format.
///
/// # Example
/// ```
/// use pedometer_dsp::{PedometerSnapshot, StepDetectionManager};
///
/// let snapshot = PedometerSnapshot {
///     run_time_ns: 90_000_000_000,
///     offset: -0.2,
///     threshold_percent: 65,
///     steps: 1200,
///     low_pass_enabled: true,
/// };
/// let manager = StepDetectionManager::restore(snapshot).unwrap();
/// assert_eq!(manager.steps(), 1200);
/// assert_eq!(manager.snapshot(), snapshot);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PedometerSnapshot {
    /// Accumulated run time in nanoseconds
    pub run_time_ns: u64,
    /// Calibration offset
    pub offset: f32,
    /// Step trigger as a percentage of the dynamic threshold
    pub threshold_percent: u8,
    pub steps: u32,
    pub low_pass_enabled: bool,
}

impl PedometerSnapshot {
    /// Reject snapshots with values outside their domain
    pub fn validate(&self) -> Result<()> {
        if self.threshold_percent > 100 {
            return Err(PedometerError::InvalidThreshold(self.threshold_percent));
        }
        Ok(())
    }
}

impl Default for PedometerSnapshot {
    fn default() -> Self {
        Self {
            run_time_ns: 0,
            offset: 0.0,
            threshold_percent: 70,
            steps: 0,
            low_pass_enabled: false,
        }
    }
}
