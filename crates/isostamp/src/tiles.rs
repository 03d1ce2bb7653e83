//! Contour tile loader: the 16 pre-rendered tiles from a directory.
//!
//! Tiles are named by configuration code, `0.<ext>` through `15.<ext>`,
//! with any of the supported image extensions. A missing or undecodable
//! tile is fatal at startup, before any worker launches.

use std::path::{Path, PathBuf};

use isostamp_pipeline::{PipelineError, TileSet};

/// Extensions tried for each tile index, in order.
const EXTENSIONS: [&str; 5] = ["ppm", "pnm", "png", "bmp", "jpg"];

/// Errors while loading the contour tile table from disk.
#[derive(Debug, thiserror::Error)]
pub enum TileLoadError {
    /// No file with a supported extension exists for a tile index.
    #[error("missing contour tile {index} in {}", dir.display())]
    Missing {
        /// Configuration code of the missing tile.
        index: usize,
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// A tile file exists but could not be decoded.
    #[error("failed to decode contour tile {}", path.display())]
    Decode {
        /// Path of the undecodable tile.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// The decoded tiles do not form a valid table (wrong dimensions).
    #[error(transparent)]
    Invalid(#[from] PipelineError),
}

/// Load the 16 contour tiles from `dir`, validated against the grid
/// step.
///
/// # Errors
///
/// Returns [`TileLoadError::Missing`] or [`TileLoadError::Decode`] per
/// tile, or [`TileLoadError::Invalid`] when a tile is not
/// `tile_size x tile_size`.
pub fn load(dir: &Path, tile_size: u32) -> Result<TileSet, TileLoadError> {
    let mut tiles = Vec::with_capacity(TileSet::COUNT);
    for index in 0..TileSet::COUNT {
        let path = EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{index}.{ext}")))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| TileLoadError::Missing {
                index,
                dir: dir.to_path_buf(),
            })?;
        let tile = image::open(&path).map_err(|source| TileLoadError::Decode {
            path: path.clone(),
            source,
        })?;
        tiles.push(tile.to_rgb8());
    }
    Ok(TileSet::new(tiles, tile_size)?)
}
