//! Synthetic depth frames of a flat floor, optionally with a drop-off.
use cliff_detector::PinholeCamera;

pub const WIDTH: usize = 160;
pub const HEIGHT: usize = 120;

/// 160×120 pinhole camera with a 100 px focal length and no distortion.
pub fn test_camera() -> PinholeCamera {
    PinholeCamera::new(100.0, 100.0, 79.5, 59.5, WIDTH, HEIGHT)
}

fn normalized_row(cam: &PinholeCamera, row: usize) -> f64 {
    (row as f64 - cam.cy) / cam.fy
}

/// z-depth (mm) of the floor seen by `row`, `None` when the row misses the floor.
pub fn floor_z_mm(cam: &PinholeCamera, row: usize, height_m: f64, tilt_deg: f64) -> Option<f64> {
    let y_n = normalized_row(cam, row);
    let (sin_t, cos_t) = tilt_deg.to_radians().sin_cos();
    let denom = y_n * cos_t + sin_t;
    (denom > 1e-9).then(|| 1000.0 * height_m / denom)
}

/// Forward ground distance (m) of the floor point seen at `row` in the centre column.
pub fn floor_forward_m(cam: &PinholeCamera, row: f64, height_m: f64, tilt_deg: f64) -> f64 {
    let y_n = (row - cam.cy) / cam.fy;
    let (sin_t, cos_t) = tilt_deg.to_radians().sin_cos();
    let z = height_m / (y_n * cos_t + sin_t);
    z * cos_t - z * y_n * sin_t
}

/// Frame where rows at or below `step_row` read `extra_m` deeper along their
/// ray than the floor. Pass `HEIGHT` as `step_row` for a flat floor.
pub fn step_frame(
    cam: &PinholeCamera,
    height_m: f64,
    tilt_deg: f64,
    step_row: usize,
    extra_m: f64,
) -> Vec<u16> {
    let mut data = vec![0u16; WIDTH * HEIGHT];
    for row in 0..HEIGHT {
        let Some(z) = floor_z_mm(cam, row, height_m, tilt_deg) else {
            continue;
        };
        let y_n = normalized_row(cam, row);
        let cos_delta = 1.0 / (1.0 + y_n * y_n).sqrt();
        let z = if row >= step_row {
            z + 1000.0 * extra_m * cos_delta
        } else {
            z
        };
        let value = if z.is_finite() && z < f64::from(u16::MAX) {
            z.floor() as u16
        } else {
            0
        };
        data[row * WIDTH..(row + 1) * WIDTH].fill(value);
    }
    data
}

pub fn flat_frame(cam: &PinholeCamera, height_m: f64, tilt_deg: f64) -> Vec<u16> {
    step_frame(cam, height_m, tilt_deg, HEIGHT, 0.0)
}
