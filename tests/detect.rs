mod common;

use cliff_detector::camera::CameraRayModel;
use cliff_detector::image::ImageView;
use cliff_detector::{
    CliffDetector, CliffError, CliffParams, DepthFrame, DepthImage, FrameHeader, PinholeCamera,
    RowAngleModel,
};
use common::synthetic_depth::{
    flat_frame, floor_forward_m, step_frame, test_camera, HEIGHT, WIDTH,
};
use nalgebra::Vector3;

const MOUNT_HEIGHT: f64 = 0.3;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario_params() -> CliffParams {
    CliffParams {
        range_min: 0.3,
        range_max: 5.0,
        sensor_mount_height: MOUNT_HEIGHT as f32,
        sensor_tilt_angle: 0.0,
        used_depth_height: 50,
        block_size: 10,
        block_points_thresh: 30,
        depth_img_step_row: 1,
        depth_img_step_col: 1,
        ground_margin: 0.05,
        ..Default::default()
    }
}

fn frame(data: &[u16]) -> DepthFrame<'_> {
    DepthFrame {
        header: FrameHeader::new("camera_depth_optical_frame", 42.25),
        image: DepthImage::new(WIDTH, HEIGHT, data),
    }
}

#[test]
fn flat_floor_yields_empty_polygon() {
    init_logger();
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    let polygon = detector.detect_cliff(&frame(&data), &cam).unwrap();
    assert!(polygon.is_empty(), "unexpected points: {:?}", polygon.points);
    assert_eq!(polygon.header.frame_id, "camera_depth_optical_frame");
    assert_eq!(polygon.header.stamp_sec, 42.25);
}

#[test]
fn step_in_lower_third_gives_one_point_per_column() {
    init_logger();
    let cam = test_camera();
    // Used rows are 70..120; the lower third starts around row 103.
    let step_row = 103usize;
    let data = step_frame(&cam, MOUNT_HEIGHT, 0.0, step_row, 0.2);
    let params = scenario_params();
    let block = params.block_size as f64;
    let mut detector = CliffDetector::new(params).unwrap();
    let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    let polygon = report.polygon;

    assert_eq!(polygon.len(), WIDTH / 10);
    let near = floor_forward_m(&cam, step_row as f64 + block, MOUNT_HEIGHT, 0.0);
    let far = floor_forward_m(&cam, step_row as f64 - block, MOUNT_HEIGHT, 0.0);
    for p in &polygon.points {
        let y = f64::from(p.y);
        assert!(y > near && y < far, "y={y} outside ({near}, {far})");
    }
    assert!(polygon.points.windows(2).all(|w| w[0].x > w[1].x));
    // Only block rows 3 and 4 (rows 100..120) are cliffs.
    assert_eq!(report.trace.blocks.cliff_blocks, 2 * (WIDTH / 10));
    assert!(report.trace.blocks.cliff_block_coords.iter().all(|rc| rc[0] >= 3));
}

#[test]
fn tilted_sensor_flat_and_step() {
    init_logger();
    let cam = test_camera();
    let tilt = 20.0;
    let params = CliffParams {
        sensor_mount_height: 0.4,
        sensor_tilt_angle: tilt as f32,
        used_depth_height: HEIGHT,
        ..scenario_params()
    };
    let mut detector = CliffDetector::new(params).unwrap();

    let flat = flat_frame(&cam, 0.4, tilt);
    let report = detector.detect_with_diagnostics(&frame(&flat), &cam).unwrap();
    assert!(report.polygon.is_empty());
    assert!(report.trace.rows_without_ground > 0);

    let step = step_frame(&cam, 0.4, tilt, 90, 0.2);
    let polygon = detector.detect_cliff(&frame(&step), &cam).unwrap();
    assert_eq!(polygon.len(), WIDTH / 10);
    let near = floor_forward_m(&cam, 100.0, 0.4, tilt);
    let far = floor_forward_m(&cam, 80.0, 0.4, tilt);
    for p in &polygon.points {
        let y = f64::from(p.y);
        assert!(y > near && y < far, "y={y} outside ({near}, {far})");
    }
}

// Samples past range_max are invalid and cast no vote, so lower rows reading
// far beyond the range do not by themselves mark a boundary.
#[test]
fn readings_beyond_max_range_are_invalid_samples() {
    let cam = test_camera();
    let mut data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    for v in data[100 * WIDTH..].iter_mut() {
        *v = 9000; // beyond range_max
    }
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(report.polygon.is_empty());
    assert_eq!(
        report.trace.blocks.valid_points,
        3 * (WIDTH as u64 / 10) * 100
    );
}

#[test]
fn raising_threshold_never_adds_points() {
    let cam = test_camera();
    let mut data = step_frame(&cam, MOUNT_HEIGHT, 0.0, 95, 0.2);
    for (i, v) in data.iter_mut().enumerate() {
        if (i / 3) % 5 == 0 {
            *v = 0;
        }
    }
    let mut last = usize::MAX;
    for thresh in [1, 10, 40, 60, 80, 100, 120] {
        let mut detector = CliffDetector::new(CliffParams {
            block_points_thresh: thresh,
            ..scenario_params()
        })
        .unwrap();
        let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
        let cliffs = report.trace.blocks.cliff_blocks;
        assert!(cliffs <= last, "thresh {thresh}: {cliffs} > {last}");
        last = cliffs;
    }
    assert_eq!(last, 0);
}

#[test]
fn linear_row_model_keeps_flat_floor_clear() {
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(CliffParams {
        row_angle_model: RowAngleModel::Linear,
        ..scenario_params()
    })
    .unwrap();
    assert!(detector.detect_cliff(&frame(&data), &cam).unwrap().is_empty());
}

#[test]
fn geometry_setters_invalidate_tables() {
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    assert!(detector.tables().is_none());

    let first = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(first.trace.tables_rebuilt);
    assert!(detector.tables().is_some());
    let tables = detector.tables().cloned().unwrap();

    let second = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(!second.trace.tables_rebuilt);

    detector.set_block_size(5);
    detector.set_block_points_thresh(10);
    detector.set_ground_margin(0.08);
    assert!(detector.tables().is_some());

    detector.set_sensor_mount_height(0.3);
    assert!(detector.tables().is_none());
    let third = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(third.trace.tables_rebuilt);
    assert_eq!(detector.tables().unwrap(), &tables);
    assert_eq!(third.trace.blocks.block_size, 5);

    detector.set_sensor_tilt_angle(0.0);
    detector.set_used_depth_height(50);
    detector.set_min_range(0.3);
    detector.set_max_range(5.0);
    assert_eq!(detector.sensor_mount_height(), 0.3);
    assert_eq!(detector.sensor_tilt_angle(), 0.0);
}

#[test]
fn parameters_configured_requests_one_rebuild() {
    init_logger();
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    assert!(!detector.parameters_configured());
    detector.detect_cliff(&frame(&data), &cam).unwrap();

    detector.set_parameters_configured(true);
    assert!(detector.parameters_configured());
    let rebuilt = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(rebuilt.trace.tables_rebuilt);
    assert!(!detector.parameters_configured());

    let cached = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(!cached.trace.tables_rebuilt);

    detector.set_parameters_configured(true);
    detector.set_parameters_configured(false);
    let withdrawn = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(!withdrawn.trace.tables_rebuilt);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn huge_threshold_keeps_empty_frame_clear() {
    let cam = test_camera();
    let data = vec![0u16; WIDTH * HEIGHT];
    for thresh in [100, 1usize << 32] {
        let mut detector = CliffDetector::new(CliffParams {
            block_points_thresh: thresh,
            ..scenario_params()
        })
        .unwrap();
        let polygon = detector.detect_cliff(&frame(&data), &cam).unwrap();
        assert!(polygon.is_empty(), "thresh {thresh}");
    }
}

#[test]
fn cam_model_update_rebuilds_every_frame() {
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    detector.set_cam_model_update(true);
    for _ in 0..3 {
        let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
        assert!(report.trace.tables_rebuilt);
    }
}

#[test]
fn publish_depth_marks_cliff_blocks() {
    let cam = test_camera();
    let data = step_frame(&cam, MOUNT_HEIGHT, 0.0, 100, 0.2);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();

    let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    assert!(report.annotated_depth.is_none());

    detector.set_publish_depth_enable(true);
    assert!(detector.publish_depth_enable());
    let report = detector.detect_with_diagnostics(&frame(&data), &cam).unwrap();
    let annotated = report.annotated_depth.unwrap();
    assert_eq!((annotated.width(), annotated.height()), (WIDTH, HEIGHT));
    assert!(annotated.row(105).iter().all(|&v| v == u16::MAX));
    assert_eq!(annotated.row(80), &data[80 * WIDTH..81 * WIDTH]);
}

#[test]
fn uninitialized_camera_is_invalid_model() {
    let data = vec![1000u16; WIDTH * HEIGHT];
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    let err = detector
        .detect_cliff(&frame(&data), &PinholeCamera::default())
        .unwrap_err();
    assert!(matches!(err, CliffError::InvalidModel(_)), "{err}");
}

#[test]
fn resolution_mismatch_is_malformed_frame() {
    let data = vec![1000u16; WIDTH * HEIGHT];
    let cam = PinholeCamera::new(100.0, 100.0, 79.5, 59.5, 320, 240);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    let err = detector.detect_cliff(&frame(&data), &cam).unwrap_err();
    assert!(matches!(err, CliffError::MalformedFrame(_)), "{err}");

    let short = vec![1000u16; WIDTH * HEIGHT - 1];
    let err = detector
        .detect_cliff(&frame(&short), &test_camera())
        .unwrap_err();
    assert!(matches!(err, CliffError::MalformedFrame(_)), "{err}");
}

#[test]
fn invalid_configuration_surfaces_at_first_use() {
    let cam = test_camera();
    let data = flat_frame(&cam, MOUNT_HEIGHT, 0.0);
    let mut detector = CliffDetector::new(scenario_params()).unwrap();

    detector.set_min_range(6.0);
    let err = detector.detect_cliff(&frame(&data), &cam).unwrap_err();
    assert!(matches!(err, CliffError::InvalidConfiguration(_)), "{err}");

    detector.set_min_range(0.3);
    detector.set_used_depth_height(HEIGHT + 1);
    let err = detector.detect_cliff(&frame(&data), &cam).unwrap_err();
    assert!(matches!(err, CliffError::InvalidConfiguration(_)), "{err}");

    detector.set_used_depth_height(50);
    detector.set_block_size(0);
    let err = detector.detect_cliff(&frame(&data), &cam).unwrap_err();
    assert!(matches!(err, CliffError::InvalidConfiguration(_)), "{err}");

    detector.set_block_size(10);
    assert!(detector.detect_cliff(&frame(&data), &cam).is_ok());
}

#[test]
fn invalid_params_are_rejected_atomically() {
    let bad = CliffParams {
        range_min: 5.0,
        range_max: 1.0,
        ..scenario_params()
    };
    assert!(CliffDetector::new(bad.clone()).is_err());

    let mut detector = CliffDetector::new(scenario_params()).unwrap();
    assert!(detector.set_params(bad).is_err());
    assert_eq!(detector.params(), &scenario_params());
}

/// Camera model with no notion of resolution, exercising the trait seam.
struct AxisAlignedModel {
    focal: f64,
    center: [f64; 2],
}

impl CameraRayModel for AxisAlignedModel {
    fn project_pixel_to_ray(&self, pixel: [f64; 2]) -> Option<Vector3<f64>> {
        Some(Vector3::new(
            (pixel[0] - self.center[0]) / self.focal,
            (pixel[1] - self.center[1]) / self.focal,
            1.0,
        ))
    }

    fn principal_point(&self) -> Option<[f64; 2]> {
        Some(self.center)
    }
}

#[test]
fn custom_ray_model_matches_pinhole() {
    let cam = test_camera();
    let model = AxisAlignedModel {
        focal: 100.0,
        center: [79.5, 59.5],
    };
    let data = step_frame(&cam, MOUNT_HEIGHT, 0.0, 103, 0.2);
    let mut with_pinhole = CliffDetector::new(scenario_params()).unwrap();
    let mut with_custom = CliffDetector::new(scenario_params()).unwrap();
    let a = with_pinhole.detect_cliff(&frame(&data), &cam).unwrap();
    let b = with_custom.detect_cliff(&frame(&data), &model).unwrap();
    assert_eq!(a, b);
}
