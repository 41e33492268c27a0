//! Pinhole camera with radial-tangential (plumb-bob) distortion.

use super::CameraRayModel;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Calibration message accompanying a depth frame.
///
/// `k` is the row-major 3×3 intrinsics matrix `[fx 0 cx; 0 fy cy; 0 0 1]`,
/// `d` holds plumb-bob coefficients `[k1, k2, p1, p2, k3]` (missing entries
/// are zero).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraInfo {
    pub width: usize,
    pub height: usize,
    pub k: [f64; 9],
    #[serde(default)]
    pub d: Vec<f64>,
}

/// Brown-Conrady radial-tangential distortion coefficients.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RadialTangentialDistortion {
    pub k1: f64,
    pub k2: f64,
    pub p1: f64,
    pub p2: f64,
    pub k3: f64,
}

impl RadialTangentialDistortion {
    /// Coefficients from a plumb-bob vector, zero-filling missing entries.
    pub fn from_plumb_bob(d: &[f64]) -> Self {
        let at = |i: usize| d.get(i).copied().unwrap_or(0.0);
        Self {
            k1: at(0),
            k2: at(1),
            p1: at(2),
            p2: at(3),
            k3: at(4),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.k1 == 0.0 && self.k2 == 0.0 && self.p1 == 0.0 && self.p2 == 0.0 && self.k3 == 0.0
    }

    /// Apply distortion to normalized coordinates.
    pub fn distort_normalized(&self, xy: [f64; 2]) -> [f64; 2] {
        let (x, y) = (xy[0], xy[1]);
        let r2 = x * x + y * y;
        let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2;
        let x_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
        let y_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
        [x * radial + x_tan, y * radial + y_tan]
    }

    /// Invert the distortion by fixed-point iteration.
    pub fn undistort_normalized(&self, xy: [f64; 2], cfg: UndistortConfig) -> Option<[f64; 2]> {
        let (mut x, mut y) = (xy[0], xy[1]);
        for _ in 0..cfg.max_iters.max(1) {
            let r2 = x * x + y * y;
            let radial = 1.0 + self.k1 * r2 + self.k2 * r2 * r2 + self.k3 * r2 * r2 * r2;
            if !radial.is_finite() || radial.abs() < 1e-12 {
                return None;
            }
            let dx_tan = 2.0 * self.p1 * x * y + self.p2 * (r2 + 2.0 * x * x);
            let dy_tan = self.p1 * (r2 + 2.0 * y * y) + 2.0 * self.p2 * x * y;
            let x_next = (xy[0] - dx_tan) / radial;
            let y_next = (xy[1] - dy_tan) / radial;
            if !x_next.is_finite() || !y_next.is_finite() {
                return None;
            }
            let step = ((x_next - x).powi(2) + (y_next - y).powi(2)).sqrt();
            x = x_next;
            y = y_next;
            if step <= cfg.eps.max(0.0) {
                break;
            }
        }
        Some([x, y])
    }
}

/// Distortion inversion settings used by iterative undistortion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UndistortConfig {
    pub max_iters: usize,
    pub eps: f64,
}

impl Default for UndistortConfig {
    fn default() -> Self {
        Self {
            max_iters: 15,
            eps: 1e-12,
        }
    }
}

/// Pinhole intrinsics plus distortion; the default value is uninitialized.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct PinholeCamera {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
    pub width: usize,
    pub height: usize,
    #[serde(default)]
    pub distortion: RadialTangentialDistortion,
    #[serde(default)]
    pub undistort: UndistortConfig,
}

impl PinholeCamera {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, width: usize, height: usize) -> Self {
        Self {
            fx,
            fy,
            cx,
            cy,
            width,
            height,
            distortion: RadialTangentialDistortion::default(),
            undistort: UndistortConfig::default(),
        }
    }

    pub fn with_distortion(mut self, distortion: RadialTangentialDistortion) -> Self {
        self.distortion = distortion;
        self
    }

    pub fn from_camera_info(info: &CameraInfo) -> Self {
        let k = &info.k;
        Self::new(k[0], k[4], k[2], k[5], info.width, info.height)
            .with_distortion(RadialTangentialDistortion::from_plumb_bob(&info.d))
    }

    /// `true` when focal lengths are finite and non-zero.
    pub fn is_valid(&self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// Undistort a raw pixel into rectified normalized coordinates.
    pub fn rectify_normalized(&self, pixel: [f64; 2]) -> Option<[f64; 2]> {
        if !self.is_valid() {
            return None;
        }
        let xd = [(pixel[0] - self.cx) / self.fx, (pixel[1] - self.cy) / self.fy];
        if self.distortion.is_identity() {
            return Some(xd);
        }
        self.distortion.undistort_normalized(xd, self.undistort)
    }
}

impl CameraRayModel for PinholeCamera {
    fn project_pixel_to_ray(&self, pixel: [f64; 2]) -> Option<Vector3<f64>> {
        let [x, y] = self.rectify_normalized(pixel)?;
        Some(Vector3::new(x, y, 1.0))
    }

    fn principal_point(&self) -> Option<[f64; 2]> {
        self.is_valid().then_some([self.cx, self.cy])
    }

    fn resolution(&self) -> Option<[usize; 2]> {
        (self.width > 0 && self.height > 0).then_some([self.width, self.height])
    }
}
