//! Conversion of cliff blocks into ground-frame boundary points.
//!
//! For every block column the cliff block nearest the horizon is taken, its
//! centre pixel is back-projected and intersected with the floor plane given
//! the mount height and tilt. Columns without a cliff block contribute no
//! point, so the polyline may be shorter than the number of columns.

use super::blocks::BlockGrid;
use super::geometry::MIN_GROUND_SIN;
use super::params::CliffParams;
use crate::angle::deg_to_rad;
use crate::camera::{ray_for, CameraRayModel};
use crate::error::Result;
use crate::types::{CliffPolygon, FrameHeader, GroundPoint};

/// Floor intersection of the ray through `pixel`, `None` if the ray misses the floor.
///
/// The camera frame is `x` right, `y` down, `z` forward, pitched down by the
/// tilt angle. A camera point `(X, Y, Z)` lies `Y cos t + Z sin t` below the
/// optical centre and `Z cos t − Y sin t` ahead of it. A ray misses the floor
/// under the same `sin(δ + t)` cutoff the geometry tables use.
pub fn ground_point_for_pixel<M: CameraRayModel + ?Sized>(
    model: &M,
    pixel: [f64; 2],
    params: &CliffParams,
) -> Result<Option<GroundPoint>> {
    let ray = ray_for(model, pixel)?;
    if ray.z <= MIN_GROUND_SIN {
        return Ok(None);
    }
    let x_n = ray.x / ray.z;
    let y_n = ray.y / ray.z;
    let (sin_t, cos_t) = deg_to_rad(f64::from(params.sensor_tilt_angle)).sin_cos();
    let drop_per_z = y_n * cos_t + sin_t;
    // drop_per_z * cos(δ) == sin(δ + t) with δ = atan(y_n).
    if drop_per_z / (1.0 + y_n * y_n).sqrt() <= MIN_GROUND_SIN {
        return Ok(None);
    }
    let z = f64::from(params.sensor_mount_height) / drop_per_z;
    let forward = z * cos_t - z * y_n * sin_t;
    let lateral = -z * x_n;
    Ok(Some(GroundPoint {
        x: lateral as f32,
        y: forward as f32,
    }))
}

/// Assemble the left-to-right boundary polyline from classified blocks.
pub fn build_cliff_polygon<M: CameraRayModel + ?Sized>(
    grid: &BlockGrid,
    model: &M,
    params: &CliffParams,
    header: &FrameHeader,
) -> Result<CliffPolygon> {
    let mut points = Vec::new();
    for col in 0..grid.cols {
        let Some(row) = grid.topmost_cliff_in_column(col) else {
            continue;
        };
        if let Some(point) = ground_point_for_pixel(model, grid.block_center(row, col), params)? {
            points.push(point);
        }
    }
    Ok(CliffPolygon {
        header: header.clone(),
        points,
    })
}
