//! Camera ray model used to turn depth pixels into viewing rays.
//!
//! The detector only needs a pixel→ray capability plus the principal point,
//! so the camera is modelled as the [`CameraRayModel`] trait. [`PinholeCamera`]
//! is the built-in implementation (intrinsics + radial-tangential
//! distortion); tests plug in synthetic models directly.

mod pinhole;

pub use pinhole::{CameraInfo, PinholeCamera, RadialTangentialDistortion, UndistortConfig};

use crate::error::{CliffError, Result};
use nalgebra::Vector3;

/// Pixel→ray projection capability.
///
/// Rays are expressed in the camera optical frame: `x` right, `y` down,
/// `z` forward along the optical axis. They need not be normalized.
pub trait CameraRayModel {
    /// Ray from the optical centre through `pixel` (`[u, v]` image coordinates).
    ///
    /// Returns `None` when the model is not initialized or the pixel cannot be
    /// mapped.
    fn project_pixel_to_ray(&self, pixel: [f64; 2]) -> Option<Vector3<f64>>;

    /// Principal point `[cx, cy]` in pixels, `None` when not initialized.
    fn principal_point(&self) -> Option<[f64; 2]>;

    /// Resolution `[width, height]` the model was calibrated for, if known.
    fn resolution(&self) -> Option<[usize; 2]> {
        None
    }
}

impl<T: CameraRayModel + ?Sized> CameraRayModel for &T {
    fn project_pixel_to_ray(&self, pixel: [f64; 2]) -> Option<Vector3<f64>> {
        (**self).project_pixel_to_ray(pixel)
    }

    fn principal_point(&self) -> Option<[f64; 2]> {
        (**self).principal_point()
    }

    fn resolution(&self) -> Option<[usize; 2]> {
        (**self).resolution()
    }
}

/// Ray through `pixel`, failing with [`CliffError::InvalidModel`] when the
/// camera cannot provide one.
pub fn ray_for<M: CameraRayModel + ?Sized>(model: &M, pixel: [f64; 2]) -> Result<Vector3<f64>> {
    let ray = model.project_pixel_to_ray(pixel).ok_or_else(|| {
        CliffError::model(format!(
            "camera model cannot project pixel ({:.1}, {:.1})",
            pixel[0], pixel[1]
        ))
    })?;
    if ray.iter().all(|c| c.is_finite()) {
        Ok(ray)
    } else {
        Err(CliffError::model(format!(
            "non-finite ray for pixel ({:.1}, {:.1})",
            pixel[0], pixel[1]
        )))
    }
}

/// Principal point of `model`, failing with [`CliffError::InvalidModel`].
pub fn principal_point_of<M: CameraRayModel + ?Sized>(model: &M) -> Result<[f64; 2]> {
    match model.principal_point() {
        Some(pp) if pp[0].is_finite() && pp[1].is_finite() => Ok(pp),
        _ => Err(CliffError::model("camera model is not initialized")),
    }
}
