use crate::detector::blocks::BlockGrid;
use crate::detector::geometry::VerticalFov;
use crate::diagnostics::TimingBreakdown;
use crate::image::DepthImageBuf;
use crate::types::CliffPolygon;
use serde::Serialize;

/// Result produced by [`CliffDetector::detect_with_diagnostics`](crate::CliffDetector).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CliffReport {
    pub polygon: CliffPolygon,
    pub trace: DetectionTrace,
    /// Depth copy with cliff blocks highlighted, present when republishing is enabled.
    #[serde(skip)]
    pub annotated_depth: Option<DepthImageBuf>,
}

/// Trace describing what a single detection call did.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionTrace {
    pub input: InputDescriptor,
    pub timings: TimingBreakdown,
    pub tables_rebuilt: bool,
    pub fov: VerticalFov,
    /// Used rows whose ray never reaches the floor.
    pub rows_without_ground: usize,
    pub blocks: BlockStage,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDescriptor {
    pub width: usize,
    pub height: usize,
    pub used_depth_height: usize,
}

/// Summary of the block voting stage.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStage {
    pub block_size: usize,
    pub rows: usize,
    pub cols: usize,
    pub cliff_blocks: usize,
    pub valid_points: u64,
    pub cliff_points: u64,
    /// `[block_row, block_col]` of each cliff block.
    pub cliff_block_coords: Vec<[usize; 2]>,
}

impl BlockStage {
    pub fn from_grid(grid: &BlockGrid) -> Self {
        Self {
            block_size: grid.block_size,
            rows: grid.rows,
            cols: grid.cols,
            cliff_blocks: grid.cliff_blocks(),
            valid_points: grid.total_valid_points(),
            cliff_points: grid.total_cliff_points(),
            cliff_block_coords: grid.cliff_block_coords().map(|(r, c)| [r, c]).collect(),
        }
    }
}
