//! Block voting over the used rows of a depth frame.
//!
//! The used region is tiled with `block_size × block_size` blocks starting at
//! its top row; partial blocks at the right and bottom edges are skipped.
//! Inside each block every `depth_img_step_row`-th row and
//! `depth_img_step_col`-th column is sampled. A valid sample (non-zero and
//! within `[range_min, range_max]`) is scaled by its row's tilt compensation
//! factor and votes "cliff" when it lies beyond the expected floor distance
//! plus the ground margin, "ground" otherwise. Samples of rows that cannot see
//! the floor do not vote.

use super::geometry::{GeometryTables, NO_GROUND};
use super::params::CliffParams;
use crate::error::{CliffError, Result};
use crate::image::{DepthImage, ImageView};
use serde::Serialize;

/// Vote tally of a single block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockVote {
    pub cliff_points: u32,
    pub ground_points: u32,
    pub is_cliff: bool,
}

impl BlockVote {
    #[inline]
    pub fn valid_points(&self) -> u32 {
        self.cliff_points + self.ground_points
    }
}

/// Row-major grid of block votes covering the used region.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockGrid {
    pub block_size: usize,
    /// Image row where block row 0 starts.
    pub first_row: usize,
    pub rows: usize,
    pub cols: usize,
    pub votes: Vec<BlockVote>,
}

impl BlockGrid {
    #[inline]
    pub fn vote(&self, block_row: usize, block_col: usize) -> &BlockVote {
        &self.votes[block_row * self.cols + block_col]
    }

    /// Top-left pixel `[x, y]` of a block.
    #[inline]
    pub fn block_origin(&self, block_row: usize, block_col: usize) -> [usize; 2] {
        [
            block_col * self.block_size,
            self.first_row + block_row * self.block_size,
        ]
    }

    /// Centre pixel `[u, v]` of a block.
    pub fn block_center(&self, block_row: usize, block_col: usize) -> [f64; 2] {
        let [x0, y0] = self.block_origin(block_row, block_col);
        let half = (self.block_size as f64 - 1.0) * 0.5;
        [x0 as f64 + half, y0 as f64 + half]
    }

    pub fn cliff_blocks(&self) -> usize {
        self.votes.iter().filter(|v| v.is_cliff).count()
    }

    /// Cliff block nearest the horizon (smallest block row) in a column.
    pub fn topmost_cliff_in_column(&self, block_col: usize) -> Option<usize> {
        (0..self.rows).find(|&r| self.vote(r, block_col).is_cliff)
    }

    /// `(block_row, block_col)` of every cliff block, row-major.
    pub fn cliff_block_coords(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.votes
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_cliff)
            .map(move |(i, _)| (i / self.cols, i % self.cols))
    }

    pub fn total_valid_points(&self) -> u64 {
        self.votes.iter().map(|v| u64::from(v.valid_points())).sum()
    }

    pub fn total_cliff_points(&self) -> u64 {
        self.votes.iter().map(|v| u64::from(v.cliff_points)).sum()
    }
}

/// Classify every block of the used region of `depth`.
pub fn classify_blocks(
    depth: &DepthImage<'_>,
    tables: &GeometryTables,
    params: &CliffParams,
) -> Result<BlockGrid> {
    depth.validate()?;
    if depth.h != tables.image_height || tables.len() != params.used_depth_height {
        return Err(CliffError::frame(format!(
            "frame height {} with {} used rows does not match tables built for height {} ({} rows)",
            depth.h,
            params.used_depth_height,
            tables.image_height,
            tables.len()
        )));
    }
    params.validate_for_height(depth.h)?;

    let bs = params.block_size;
    let rows = tables.len() / bs;
    let cols = depth.w / bs;
    let min_mm = params.range_min_mm();
    let max_mm = params.range_max_mm();
    let margin_mm = params.ground_margin_mm();
    // A block without any cliff sample is never a cliff, even at threshold 0.
    let threshold = u32::try_from(params.block_points_thresh.max(1)).unwrap_or(u32::MAX);

    let mut votes = Vec::with_capacity(rows * cols);
    for br in 0..rows {
        let y0 = tables.first_row + br * bs;
        for bc in 0..cols {
            let x0 = bc * bs;
            let mut vote = BlockVote::default();
            for y in (y0..y0 + bs).step_by(params.depth_img_step_row) {
                let i = y - tables.first_row;
                let expected = tables.dist_to_ground[i];
                if expected == NO_GROUND {
                    continue;
                }
                let bound = f64::from(expected) + margin_mm;
                let factor = tables.tilt_compensation[i];
                let row = &depth.row(y)[x0..x0 + bs];
                for &raw in row.iter().step_by(params.depth_img_step_col) {
                    if raw == 0 {
                        continue;
                    }
                    let mm = f32::from(raw);
                    if mm < min_mm || mm > max_mm {
                        continue;
                    }
                    if f64::from(raw) * factor > bound {
                        vote.cliff_points += 1;
                    } else {
                        vote.ground_points += 1;
                    }
                }
            }
            vote.is_cliff = vote.cliff_points >= threshold;
            votes.push(vote);
        }
    }

    Ok(BlockGrid {
        block_size: bs,
        first_row: tables.first_row,
        rows,
        cols,
        votes,
    })
}
