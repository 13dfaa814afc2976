//! Sensor input interface

use crate::types::Sample;

/// Consumer of accelerometer samples pushed by a sensor driver
///
/// Drivers call [`on_acceleration`](Self::on_acceleration) once per sample
/// with non-decreasing timestamps. The return value tells the driver whether
/// derived statistics changed enough to refresh a display.
pub trait AccelerationListener {
    fn on_acceleration(&mut self, sample: Sample) -> bool;
}

/// Feed recorded samples to a listener in order
///
/// Returns the number of samples that signalled an update.
///
/// # Example
/// ```
/// use pedometer_dsp::{replay, Sample, StepDetectionManager};
///
/// let mut manager = StepDetectionManager::new();
/// let samples = (0..32).map(|i| Sample::new(0.0, 0.0, 0.0, i * 20_000_000));
/// assert_eq!(replay(&mut manager, samples), 4);
/// ```
pub fn replay<L, I>(listener: &mut L, samples: I) -> usize
where
    L: AccelerationListener + ?Sized,
    I: IntoIterator<Item = Sample>,
{
    samples
        .into_iter()
        .filter(|&sample| listener.on_acceleration(sample))
        .count()
}
