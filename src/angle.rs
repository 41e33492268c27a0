//! Ray and angle utilities used by the geometry tables and back-projection.

use crate::error::{CliffError, Result};
use nalgebra::Vector3;

/// Rays shorter than this are treated as degenerate.
const MIN_RAY_LENGTH: f64 = 1e-12;

/// Euclidean length of a vector starting at the origin.
#[inline]
pub fn length_of(vec: &Vector3<f64>) -> f64 {
    (vec.x * vec.x + vec.y * vec.y + vec.z * vec.z).sqrt()
}

/// Computes the unsigned angle between two rays in radians, `acos(a·b / |a||b|)`.
///
/// Returns a value in [0, π]. A zero-length ray has no direction, so it is
/// reported as a configuration error instead of silently yielding 0.
pub fn angle_between_rays(ray1: &Vector3<f64>, ray2: &Vector3<f64>) -> Result<f64> {
    let n1 = length_of(ray1);
    let n2 = length_of(ray2);
    if !(n1 > MIN_RAY_LENGTH && n2 > MIN_RAY_LENGTH) {
        return Err(CliffError::config(format!(
            "angle between rays is undefined for zero-length ray (|r1|={n1:e}, |r2|={n2:e})"
        )));
    }
    let cos = (ray1.dot(ray2) / (n1 * n2)).clamp(-1.0, 1.0);
    Ok(cos.acos())
}

/// Converts degrees to radians in f64.
#[inline]
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * std::f64::consts::PI / 180.0
}
