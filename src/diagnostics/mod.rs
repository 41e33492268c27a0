//! Diagnostics data model exposed by the detector and the CLI.
//!
//! `CliffReport` is returned by
//! [`CliffDetector::detect_with_diagnostics`](crate::CliffDetector), bundling
//! the polygon with a `DetectionTrace` of the stages the call executed.

pub mod report;
pub mod timing;

pub use report::{BlockStage, CliffReport, DetectionTrace, InputDescriptor};
pub use timing::{StageTiming, TimingBreakdown};
