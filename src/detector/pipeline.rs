//! Detector pipeline driving cliff detection end-to-end.
//!
//! The [`CliffDetector`] takes one depth frame plus the camera model it was
//! captured with and returns the drop-off boundary as a ground-frame polyline.
//! Internally it (re)builds the per-row geometry tables when they are stale,
//! votes blocks of the used rows, and back-projects the topmost cliff block of
//! every column onto the floor.
//!
//! Typical usage:
//! ```no_run
//! use cliff_detector::{CliffDetector, CliffParams, DepthFrame, DepthImage, FrameHeader, PinholeCamera};
//!
//! # fn example(depth: &[u16]) -> cliff_detector::Result<()> {
//! let camera = PinholeCamera::new(570.0, 570.0, 319.5, 239.5, 640, 480);
//! let mut detector = CliffDetector::new(CliffParams::default())?;
//! let frame = DepthFrame {
//!     header: FrameHeader::new("camera_depth_optical_frame", 0.0),
//!     image: DepthImage::new(640, 480, depth),
//! };
//! let polygon = detector.detect_cliff(&frame, &camera)?;
//! println!("cliff points: {}", polygon.len());
//! # Ok(())
//! # }
//! ```
//!
//! A detector instance is not meant for concurrent use; serialize calls or
//! keep one instance per thread.
use super::blocks::{classify_blocks, BlockGrid};
use super::geometry::GeometryTables;
use super::params::CliffParams;
use super::polygon::build_cliff_polygon;
use crate::camera::CameraRayModel;
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{
    BlockStage, CliffReport, DetectionTrace, InputDescriptor, StageTiming, TimingBreakdown,
};
use crate::error::{CliffError, Result};
use crate::image::{DepthFrame, DepthImageBuf};
use crate::types::CliffPolygon;
use log::{debug, warn};
use std::time::Instant;

/// Value written over cliff blocks in the annotated depth copy.
const ANNOTATION_VALUE: u16 = u16::MAX;

/// Cliff detector holding the configuration and cached geometry tables.
pub struct CliffDetector {
    params: CliffParams,
    tables: Option<GeometryTables>,
    /// Pending request to recompute the tables on the next frame.
    params_update: bool,
}

impl CliffDetector {
    /// Create a detector, rejecting invalid parameter combinations up front.
    pub fn new(params: CliffParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            tables: None,
            params_update: false,
        })
    }

    pub fn params(&self) -> &CliffParams {
        &self.params
    }

    /// Replace all parameters atomically. On error the previous ones stay.
    pub fn set_params(&mut self, params: CliffParams) -> Result<()> {
        params.validate()?;
        self.params = params;
        self.invalidate_tables();
        Ok(())
    }

    /// Geometry tables from the last rebuild, if still current.
    pub fn tables(&self) -> Option<&GeometryTables> {
        self.tables.as_ref()
    }

    /// Detect cliffs in `frame`, returning the boundary polyline.
    pub fn detect_cliff<M: CameraRayModel + ?Sized>(
        &mut self,
        frame: &DepthFrame<'_>,
        camera: &M,
    ) -> Result<CliffPolygon> {
        self.detect_with_diagnostics(frame, camera)
            .map(|report| report.polygon)
    }

    /// Detect cliffs and return the polyline together with a stage trace.
    pub fn detect_with_diagnostics<M: CameraRayModel + ?Sized>(
        &mut self,
        frame: &DepthFrame<'_>,
        camera: &M,
    ) -> Result<CliffReport> {
        let total_start = Instant::now();
        let image = &frame.image;
        image.validate()?;
        if let Some([w, h]) = camera.resolution() {
            if w != image.w || h != image.h {
                return Err(CliffError::frame(format!(
                    "frame is {}x{} but camera model expects {w}x{h}",
                    image.w, image.h
                )));
            }
        }
        debug!(
            "CliffDetector::detect start frame={} w={} h={} used_rows={}",
            frame.header.frame_id, image.w, image.h, self.params.used_depth_height
        );

        let geom_start = Instant::now();
        let stale = match &self.tables {
            Some(tables) => {
                self.params_update
                    || self.params.cam_model_update
                    || tables.image_height != image.h
            }
            None => true,
        };
        let tables = match self.tables.take() {
            Some(tables) if !stale => tables,
            _ => {
                let tables = GeometryTables::build(&self.params, camera, image.h)?;
                self.params_update = false;
                debug!(
                    "CliffDetector::detect rebuilt geometry tables rows={} first_row={} fov=[{:.4}, {:.4}]",
                    tables.len(),
                    tables.first_row,
                    tables.fov.min_angle,
                    tables.fov.max_angle
                );
                let horizon_rows = tables.rows_without_ground();
                if horizon_rows > 0 {
                    warn!(
                        "{horizon_rows} of {} used rows never reach the floor and will be ignored",
                        tables.len()
                    );
                }
                tables
            }
        };
        let geometry_ms = elapsed_ms(geom_start);

        let result = run_stages(&self.params, &tables, frame, camera);
        let fov = tables.fov;
        let rows_without_ground = tables.rows_without_ground();
        self.tables = Some(tables);
        let (polygon, grid, mut timings) = result?;

        let annotated_depth = self
            .params
            .publish_depth_enable
            .then(|| annotate_depth(frame, &grid));

        timings.stages.insert(0, StageTiming::new("geometry", geometry_ms));
        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "CliffDetector::detect done cliff_blocks={} points={} total_ms={:.3}",
            grid.cliff_blocks(),
            polygon.len(),
            timings.total_ms
        );

        Ok(CliffReport {
            polygon,
            trace: DetectionTrace {
                input: InputDescriptor {
                    width: image.w,
                    height: image.h,
                    used_depth_height: self.params.used_depth_height,
                },
                timings,
                tables_rebuilt: stale,
                fov,
                rows_without_ground,
                blocks: BlockStage::from_grid(&grid),
            },
            annotated_depth,
        })
    }

    // --- configuration surface -------------------------------------------

    pub fn set_min_range(&mut self, rmin: f32) {
        self.params.range_min = rmin;
        self.invalidate_tables();
    }

    pub fn set_max_range(&mut self, rmax: f32) {
        self.params.range_max = rmax;
        self.invalidate_tables();
    }

    pub fn set_sensor_mount_height(&mut self, height: f32) {
        self.params.sensor_mount_height = height;
        self.invalidate_tables();
    }

    pub fn sensor_mount_height(&self) -> f32 {
        self.params.sensor_mount_height
    }

    /// Tilt of the optical axis below horizontal, in degrees.
    pub fn set_sensor_tilt_angle(&mut self, angle: f32) {
        self.params.sensor_tilt_angle = angle;
        self.invalidate_tables();
    }

    pub fn sensor_tilt_angle(&self) -> f32 {
        self.params.sensor_tilt_angle
    }

    pub fn set_used_depth_height(&mut self, height: usize) {
        self.params.used_depth_height = height;
        self.invalidate_tables();
    }

    pub fn set_block_size(&mut self, size: usize) {
        self.params.block_size = size;
    }

    pub fn set_block_points_thresh(&mut self, thresh: usize) {
        self.params.block_points_thresh = thresh;
    }

    pub fn set_depth_img_step_row(&mut self, step: usize) {
        self.params.depth_img_step_row = step;
    }

    pub fn set_depth_img_step_col(&mut self, step: usize) {
        self.params.depth_img_step_col = step;
    }

    pub fn set_ground_margin(&mut self, margin: f32) {
        self.params.ground_margin = margin;
    }

    pub fn set_publish_depth_enable(&mut self, enable: bool) {
        self.params.publish_depth_enable = enable;
    }

    pub fn publish_depth_enable(&self) -> bool {
        self.params.publish_depth_enable
    }

    /// When set, tables are rebuilt on every frame.
    pub fn set_cam_model_update(&mut self, update: bool) {
        self.params.cam_model_update = update;
    }

    /// Setting the flag marks the sensor parameters as changed; the tables are
    /// recomputed on the next frame and the flag is cleared again.
    pub fn set_parameters_configured(&mut self, update: bool) {
        self.params_update = update;
    }

    /// `true` while a requested table rebuild has not happened yet.
    pub fn parameters_configured(&self) -> bool {
        self.params_update
    }

    fn invalidate_tables(&mut self) {
        self.tables = None;
    }
}

fn run_stages<M: CameraRayModel + ?Sized>(
    params: &CliffParams,
    tables: &GeometryTables,
    frame: &DepthFrame<'_>,
    camera: &M,
) -> Result<(CliffPolygon, BlockGrid, TimingBreakdown)> {
    let mut timings = TimingBreakdown::default();

    let classify_start = Instant::now();
    let grid = classify_blocks(&frame.image, tables, params)?;
    timings.push("classify", elapsed_ms(classify_start));

    let polygon_start = Instant::now();
    let polygon = build_cliff_polygon(&grid, camera, params, &frame.header)?;
    timings.push("polygon", elapsed_ms(polygon_start));

    Ok((polygon, grid, timings))
}

fn annotate_depth(frame: &DepthFrame<'_>, grid: &BlockGrid) -> DepthImageBuf {
    let mut out = DepthImageBuf::from_view(&frame.image);
    for (r, c) in grid.cliff_block_coords() {
        let [x0, y0] = grid.block_origin(r, c);
        out.fill_rect(x0, y0, grid.block_size, grid.block_size, ANNOTATION_VALUE);
    }
    out
}
