//! Parameter types configuring the cliff detector.
//!
//! Ranges and distances are in meters, the tilt angle in degrees and every
//! block/step size in pixels. Defaults suit a small robot with a forward
//! depth camera mounted around 40 cm above the floor.

use crate::error::{CliffError, Result};
use serde::{Deserialize, Serialize};

/// How per-row angular offsets from the optical axis are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAngleModel {
    /// Angle of the actual ray through each row (perspective spacing).
    #[default]
    Projective,
    /// Linear interpolation across the vertical field of view of the used rows.
    Linear,
}

/// Detector-wide parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliffParams {
    /// Minimum sensor range; closer samples are ignored (meters).
    pub range_min: f32,
    /// Maximum sensor range; farther samples are ignored (meters).
    pub range_max: f32,
    /// Height of the optical centre above the floor (meters).
    pub sensor_mount_height: f32,
    /// Downward pitch of the optical axis (degrees).
    pub sensor_tilt_angle: f32,
    /// Number of rows, counted from the image bottom, that are scanned.
    pub used_depth_height: usize,
    /// Side of the square block voted jointly (pixels).
    pub block_size: usize,
    /// Cliff samples needed before a block counts as a cliff.
    pub block_points_thresh: usize,
    /// Row sampling step inside a block.
    pub depth_img_step_row: usize,
    /// Column sampling step inside a block.
    pub depth_img_step_col: usize,
    /// Extra distance beyond the expected floor before a sample votes cliff (meters).
    pub ground_margin: f32,
    /// Produce an annotated depth copy alongside the polygon.
    pub publish_depth_enable: bool,
    /// Rebuild geometry tables on every frame (intrinsics may change).
    pub cam_model_update: bool,
    pub row_angle_model: RowAngleModel,
}

impl Default for CliffParams {
    fn default() -> Self {
        Self {
            range_min: 0.5,
            range_max: 5.0,
            sensor_mount_height: 0.4,
            sensor_tilt_angle: 0.0,
            used_depth_height: 320,
            block_size: 8,
            block_points_thresh: 50,
            depth_img_step_row: 1,
            depth_img_step_col: 1,
            ground_margin: 0.05,
            publish_depth_enable: false,
            cam_model_update: false,
            row_angle_model: RowAngleModel::Projective,
        }
    }
}

impl CliffParams {
    /// Rejects parameter combinations that would produce undefined geometry.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("range_min", self.range_min),
            ("range_max", self.range_max),
            ("sensor_mount_height", self.sensor_mount_height),
            ("sensor_tilt_angle", self.sensor_tilt_angle),
            ("ground_margin", self.ground_margin),
        ];
        if let Some((name, v)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CliffError::config(format!("{name} must be finite, got {v}")));
        }
        if self.range_min < 0.0 {
            return Err(CliffError::config(format!(
                "range_min must be non-negative, got {}",
                self.range_min
            )));
        }
        if self.range_min >= self.range_max {
            return Err(CliffError::config(format!(
                "range_min ({}) must be below range_max ({})",
                self.range_min, self.range_max
            )));
        }
        if self.sensor_mount_height <= 0.0 {
            return Err(CliffError::config(format!(
                "sensor_mount_height must be positive, got {}",
                self.sensor_mount_height
            )));
        }
        if self.sensor_tilt_angle.abs() >= 90.0 {
            return Err(CliffError::config(format!(
                "sensor_tilt_angle must lie in (-90, 90) degrees, got {}",
                self.sensor_tilt_angle
            )));
        }
        if self.ground_margin < 0.0 {
            return Err(CliffError::config(format!(
                "ground_margin must be non-negative, got {}",
                self.ground_margin
            )));
        }
        if self.used_depth_height == 0 {
            return Err(CliffError::config("used_depth_height must be at least 1"));
        }
        if self.block_size == 0 {
            return Err(CliffError::config("block_size must be at least 1"));
        }
        if self.depth_img_step_row == 0 || self.depth_img_step_col == 0 {
            return Err(CliffError::config(format!(
                "depth image steps must be at least 1, got row={} col={}",
                self.depth_img_step_row, self.depth_img_step_col
            )));
        }
        Ok(())
    }

    /// [`validate`](Self::validate) plus the checks that need the image height.
    pub fn validate_for_height(&self, image_height: usize) -> Result<()> {
        self.validate()?;
        if self.used_depth_height > image_height {
            return Err(CliffError::config(format!(
                "used_depth_height ({}) exceeds image height ({image_height})",
                self.used_depth_height
            )));
        }
        if self.block_size > self.used_depth_height {
            return Err(CliffError::config(format!(
                "block_size ({}) exceeds used_depth_height ({})",
                self.block_size, self.used_depth_height
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn range_min_mm(&self) -> f32 {
        self.range_min * 1000.0
    }

    #[inline]
    pub fn range_max_mm(&self) -> f32 {
        self.range_max * 1000.0
    }

    #[inline]
    pub fn ground_margin_mm(&self) -> f64 {
        f64::from(self.ground_margin) * 1000.0
    }
}
