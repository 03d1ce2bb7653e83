//! Marching stage: classify each 2x2 grid cell block and stamp the
//! matching contour tile onto the working image.
//!
//! The configuration code packs the block's four corners into four bits
//! in the order top-left, top-right, bottom-right, bottom-left. This
//! exact order is what the tile table is rendered against; permuting it
//! draws the wrong contours.

use image::RgbImage;

use crate::partition;
use crate::shared::{SharedGrid, SharedImage};
use crate::types::PipelineError;

/// The 16 pre-rendered contour tiles, indexed 0-15 by configuration
/// code.
///
/// Validated on construction: exactly [`TileSet::COUNT`] tiles, all
/// square with the same edge length. Immutable afterward and shared by
/// all workers without synchronization.
pub struct TileSet {
    tiles: Vec<RgbImage>,
    tile_size: u32,
}

impl TileSet {
    /// Number of marching-squares configurations, and therefore tiles.
    pub const COUNT: usize = 16;

    /// Build a tile table from 16 `tile_size x tile_size` images.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::TileCount`] when not exactly 16 tiles
    /// are supplied, or [`PipelineError::TileSize`] when a tile is not
    /// `tile_size x tile_size`.
    pub fn new(tiles: Vec<RgbImage>, tile_size: u32) -> Result<Self, PipelineError> {
        if tiles.len() != Self::COUNT {
            return Err(PipelineError::TileCount {
                actual: tiles.len(),
            });
        }
        for (index, tile) in tiles.iter().enumerate() {
            if tile.width() != tile_size || tile.height() != tile_size {
                return Err(PipelineError::TileSize {
                    index,
                    expected: tile_size,
                    width: tile.width(),
                    height: tile.height(),
                });
            }
        }
        Ok(Self {
            tiles,
            tile_size,
        })
    }

    /// Edge length shared by every tile.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// The tile for a configuration code. Codes are 4-bit by
    /// construction, so every caller-producible value is present.
    #[must_use]
    pub fn tile(&self, code: u8) -> &RgbImage {
        &self.tiles[usize::from(code) % Self::COUNT]
    }
}

/// The 4-bit configuration code of the cell block whose top-left grid
/// corner is `(i, j)`.
#[must_use]
pub fn configuration_code(grid: &SharedGrid, i: usize, j: usize) -> u8 {
    8 * grid.get(i, j)
        + 4 * grid.get(i, j + 1)
        + 2 * grid.get(i + 1, j + 1)
        + grid.get(i + 1, j)
}

/// Copy a tile into the working image with its top-left corner at
/// `(x0, y0)`, per-pixel and per-channel.
fn stamp_tile(working: &SharedImage, tile: &RgbImage, x0: u32, y0: u32) {
    for ty in 0..tile.height() {
        for tx in 0..tile.width() {
            working.set_pixel(x0 + tx, y0 + ty, tile.get_pixel(tx, ty).0);
        }
    }
}

/// March worker `id`'s cell blocks: all `p` rows crossed with the
/// worker's disjoint column sub-range.
///
/// Only reads the (fully populated) grid and writes image regions no
/// other worker touches, so the phase needs no synchronization beyond
/// the barrier that precedes it.
#[allow(clippy::cast_possible_truncation)]
pub fn stamp(
    grid: &SharedGrid,
    working: &SharedImage,
    tiles: &TileSet,
    id: usize,
    workers: usize,
) {
    let p = grid.rows() - 1;
    let q = grid.cols() - 1;
    let step = tiles.tile_size();
    let cols = partition::span(id, workers, q);

    for i in 0..p {
        for j in cols.clone() {
            let code = configuration_code(grid, i, j);
            stamp_tile(working, tiles.tile(code), j as u32 * step, i as u32 * step);
        }
    }
}
