#![doc = include_str!("../README.md")]

pub mod angle;
pub mod camera;
pub mod config;
pub mod detector;
pub mod diagnostics;
pub mod error;
pub mod image;
pub mod types;

// --- High-level re-exports -------------------------------------------------

// Main entry points: detector + results.
pub use crate::detector::{CliffDetector, CliffParams, RowAngleModel};
pub use crate::error::{CliffError, Result};
pub use crate::types::{CliffPolygon, FrameHeader, GroundPoint};

// Inputs.
pub use crate::camera::{CameraInfo, CameraRayModel, PinholeCamera};
pub use crate::image::{DepthFrame, DepthImage, DepthImageBuf};

// High-level diagnostics returned by the detector.
pub use crate::diagnostics::{CliffReport, DetectionTrace};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use cliff_detector::prelude::*;
///
/// # fn main() -> cliff_detector::Result<()> {
/// let (w, h) = (640usize, 480usize);
/// let depth = vec![0u16; w * h];
/// let camera = PinholeCamera::new(570.0, 570.0, 319.5, 239.5, w, h);
///
/// let mut det = CliffDetector::new(CliffParams {
///     sensor_mount_height: 0.3,
///     ..Default::default()
/// })?;
///
/// let frame = DepthFrame {
///     header: FrameHeader::new("depth_optical", 0.0),
///     image: DepthImage::new(w, h, &depth),
/// };
/// let polygon = det.detect_cliff(&frame, &camera)?;
/// println!("cliff points={}", polygon.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::camera::{CameraRayModel, PinholeCamera};
    pub use crate::image::{DepthFrame, DepthImage};
    pub use crate::{CliffDetector, CliffParams, CliffPolygon, FrameHeader};
}
