//! Cliff detector turning one depth frame into a drop-off boundary.
//!
//! Overview
//! - Builds per-row geometry tables (angle from the optical axis, expected
//!   floor distance, tilt compensation) from the camera model and the sensor
//!   mount. Tables are cached and rebuilt only when the mount, range or used
//!   rows change, when the frame height changes, or on every frame when the
//!   camera model is flagged as updating.
//! - Tiles the rows nearest the image bottom into square blocks and lets the
//!   sampled pixels of each block vote "cliff" or "ground" against their
//!   row's expected floor distance plus a margin.
//! - Back-projects the topmost cliff block of every block column onto the
//!   floor plane, producing a left-to-right polyline in the robot frame.
//!
//! Modules
//! - [`params`] – configuration types used by the detector and CLI.
//! - [`geometry`] – per-row table construction.
//! - [`blocks`] – block voting classifier.
//! - [`polygon`] – ground-frame back-projection and polyline assembly.
//! - `pipeline` – the [`CliffDetector`] orchestrating the stages.

pub mod blocks;
pub mod geometry;
pub mod params;
mod pipeline;
pub mod polygon;

pub use blocks::{classify_blocks, BlockGrid, BlockVote};
pub use geometry::{GeometryTables, VerticalFov, NO_GROUND};
pub use params::{CliffParams, RowAngleModel};
pub use pipeline::CliffDetector;
pub use polygon::{build_cliff_polygon, ground_point_for_pixel};
