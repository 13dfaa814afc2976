//! Gravity bias correction and scalar magnitude extraction

use nalgebra::Vector3;

/// Gravity bias applied to the Z axis before taking the magnitude (m/s²)
pub const GRAVITY: f32 = 9.8;

/// Extra Z bias added before the magnitude but not removed after it
///
/// Slightly desensitises detection against spurious steps at rest.
pub const BIAS_MARGIN: f32 = 0.2;

/// Adds gravity plus the bias margin back onto the Z axis
///
/// Linear-acceleration sensors report values with gravity removed; biasing Z
/// restores a dominant vertical component so the magnitude is well defined
/// around rest.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use pedometer_dsp::calibration::bias_correct;
///
/// let biased = bias_correct(Vector3::new(0.0, 0.0, 0.0));
/// assert!((biased.z - 10.0).abs() < 1e-6);
/// ```
pub fn bias_correct(raw: Vector3<f32>) -> Vector3<f32> {
    Vector3::new(raw.x, raw.y, raw.z + (GRAVITY + BIAS_MARGIN))
}

/// Euclidean norm of bias-corrected axes with 1 g removed
///
/// Only [`GRAVITY`] is subtracted, so a device at rest reads about
/// [`BIAS_MARGIN`].
pub fn scalar_magnitude(biased: Vector3<f32>) -> f32 {
    biased.norm() - GRAVITY
}

/// Offset that makes `scalar` read as zero on top of the current offset
pub fn rebias_offset(offset: f32, scalar: f32) -> f32 {
    offset - scalar
}
