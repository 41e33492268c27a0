//! Per-row geometry tables derived from the camera model and sensor mount.
//!
//! For each of the `used_depth_height` rows nearest the image bottom three
//! parallel tables are kept:
//!
//! - `delta_angle`: signed angle between the row's central ray and the optical
//!   axis (radians, positive below the axis);
//! - `dist_to_ground`: expected range to the floor along that ray, in
//!   millimetres, or [`NO_GROUND`] when the ray never meets the floor;
//! - `tilt_compensation`: factor turning a z-depth sample of that row into a
//!   range along the same ray.
//!
//! Depth sensors report z-depth, and for a flat floor the z-depth of every
//! pixel in a row is the same (`Z = h / (y_n cos t + sin t)`). Scaling it by
//! `1 / cos δ` gives `h / sin(δ + t)`, which is exactly the tabulated
//! distance, so a flat floor compares equal regardless of column.
//!
//! The tables depend only on the parameters and the intrinsics; rebuilding
//! with unchanged inputs yields identical values.

use super::params::{CliffParams, RowAngleModel};
use crate::angle::{angle_between_rays, deg_to_rad};
use crate::camera::{principal_point_of, ray_for, CameraRayModel};
use crate::error::Result;
use nalgebra::Vector3;
use serde::Serialize;

/// Expected distance for rows whose ray does not reach the floor.
pub const NO_GROUND: u32 = u32::MAX;

/// Below this `sin(δ + t)` the floor is treated as unreachable. Shared with
/// the floor intersection in `polygon`.
pub(crate) const MIN_GROUND_SIN: f64 = 1e-6;

/// Vertical field of view of the used region relative to the optical axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerticalFov {
    /// Angle of the top used row (negative above the axis).
    pub min_angle: f64,
    /// Angle of the bottom image row (positive below the axis).
    pub max_angle: f64,
}

impl VerticalFov {
    #[inline]
    pub fn span(&self) -> f64 {
        self.max_angle - self.min_angle
    }
}

/// Cached per-row tables for the used rows of a given image height.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeometryTables {
    pub image_height: usize,
    /// Image row of table index 0.
    pub first_row: usize,
    pub fov: VerticalFov,
    pub delta_angle: Vec<f64>,
    pub dist_to_ground: Vec<u32>,
    pub tilt_compensation: Vec<f64>,
}

impl GeometryTables {
    /// Build all three tables for a frame of `image_height` rows.
    ///
    /// Fails with `InvalidConfiguration` for unusable parameters and with
    /// `InvalidModel` when the camera cannot produce rays.
    pub fn build<M: CameraRayModel + ?Sized>(
        params: &CliffParams,
        model: &M,
        image_height: usize,
    ) -> Result<Self> {
        params.validate_for_height(image_height)?;
        let [cx, cy] = principal_point_of(model)?;
        let first_row = image_height - params.used_depth_height;

        let fov = field_of_view(
            model,
            [cx, first_row as f64],
            [cx, cy],
            [cx, (image_height - 1) as f64],
        )?;
        let delta_angle = calc_delta_angle_for_rows(model, params, first_row, fov)?;
        let dist_to_ground = calc_ground_distances_for_rows(&delta_angle, params);
        let tilt_compensation = calc_tilt_compensation_factors_for_rows(&delta_angle);

        Ok(Self {
            image_height,
            first_row,
            fov,
            delta_angle,
            dist_to_ground,
            tilt_compensation,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.delta_angle.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.delta_angle.is_empty()
    }

    /// Table index of an image row, `None` outside the used region.
    #[inline]
    pub fn index_of_row(&self, row: usize) -> Option<usize> {
        row.checked_sub(self.first_row).filter(|&i| i < self.len())
    }

    /// Number of used rows whose ray never meets the floor.
    pub fn rows_without_ground(&self) -> usize {
        self.dist_to_ground
            .iter()
            .filter(|&&d| d == NO_GROUND)
            .count()
    }
}

/// Signed vertical angles of the top and bottom rays relative to the centre ray.
///
/// A pixel above the centre row yields a negative angle, one below it a
/// positive angle.
pub fn field_of_view<M: CameraRayModel + ?Sized>(
    model: &M,
    pixel_top: [f64; 2],
    pixel_center: [f64; 2],
    pixel_bottom: [f64; 2],
) -> Result<VerticalFov> {
    let center_ray = ray_for(model, pixel_center)?;
    let min_angle = signed_row_angle(model, &center_ray, pixel_center[1], pixel_top)?;
    let max_angle = signed_row_angle(model, &center_ray, pixel_center[1], pixel_bottom)?;
    Ok(VerticalFov {
        min_angle,
        max_angle,
    })
}

fn signed_row_angle<M: CameraRayModel + ?Sized>(
    model: &M,
    center_ray: &Vector3<f64>,
    center_row: f64,
    pixel: [f64; 2],
) -> Result<f64> {
    let ray = ray_for(model, pixel)?;
    let angle = angle_between_rays(center_ray, &ray)?;
    Ok(if pixel[1] < center_row { -angle } else { angle })
}

/// Angular offset from the optical axis for every used row.
pub fn calc_delta_angle_for_rows<M: CameraRayModel + ?Sized>(
    model: &M,
    params: &CliffParams,
    first_row: usize,
    fov: VerticalFov,
) -> Result<Vec<f64>> {
    let used = params.used_depth_height;
    match params.row_angle_model {
        RowAngleModel::Linear => {
            let denom = used.saturating_sub(1).max(1) as f64;
            Ok((0..used)
                .map(|i| fov.min_angle + fov.span() * i as f64 / denom)
                .collect())
        }
        RowAngleModel::Projective => {
            let [cx, cy] = principal_point_of(model)?;
            let center_ray = ray_for(model, [cx, cy])?;
            (first_row..first_row + used)
                .map(|row| signed_row_angle(model, &center_ray, cy, [cx, row as f64]))
                .collect()
        }
    }
}

/// Expected range to the floor along each row's ray, in millimetres.
pub fn calc_ground_distances_for_rows(delta_angle: &[f64], params: &CliffParams) -> Vec<u32> {
    let tilt = deg_to_rad(f64::from(params.sensor_tilt_angle));
    let height_mm = f64::from(params.sensor_mount_height) * 1000.0;
    delta_angle
        .iter()
        .map(|&delta| {
            let s = (delta + tilt).sin();
            if s <= MIN_GROUND_SIN {
                return NO_GROUND;
            }
            let mm = (height_mm / s).round();
            if mm >= f64::from(NO_GROUND - 1) {
                NO_GROUND - 1
            } else {
                mm as u32
            }
        })
        .collect()
}

/// Factors mapping a row's z-depth sample onto the range along its ray.
pub fn calc_tilt_compensation_factors_for_rows(delta_angle: &[f64]) -> Vec<f64> {
    delta_angle
        .iter()
        .map(|&delta| {
            let c = delta.cos();
            // Rays at ±90° cannot be seen by a pinhole camera.
            if c > f64::EPSILON {
                1.0 / c
            } else {
                0.0
            }
        })
        .collect()
}
