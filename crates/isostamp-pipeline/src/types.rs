//! Shared types for the contour stamping pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can reference raster data
/// without depending on `image` directly.
pub use image::RgbImage;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Dimensions of an existing image.
    #[must_use]
    pub fn of(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
        }
    }
}

/// Configuration for the contour stamping pipeline.
///
/// Constructed once at startup and passed by reference into the
/// coordinator and every worker context; never mutated after
/// construction. All parameters have defaults matching the fixed
/// constants of the batch tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Grid step size in pixels. One contour tile covers a
    /// `step x step` pixel block, so tile dimensions must equal this.
    pub step: u32,

    /// Luminance threshold for grid classification. A sampled point
    /// whose channel average is at or below this value is inside the
    /// contour (grid value 1).
    pub threshold: u8,

    /// Rescale activation threshold for the width axis. Rescaling also
    /// targets this width.
    pub rescale_width: u32,

    /// Rescale activation threshold for the height axis. Rescaling also
    /// targets this height.
    pub rescale_height: u32,
}

impl PipelineConfig {
    /// Default grid step size in pixels.
    pub const DEFAULT_STEP: u32 = 8;

    /// Default luminance threshold.
    pub const DEFAULT_THRESHOLD: u8 = 200;

    /// Default rescale width threshold/target.
    pub const DEFAULT_RESCALE_WIDTH: u32 = 2048;

    /// Default rescale height threshold/target.
    pub const DEFAULT_RESCALE_HEIGHT: u32 = 2048;

    /// Whether a source image of the given dimensions is rescaled
    /// before sampling. Both axes must strictly exceed their
    /// thresholds.
    #[must_use]
    pub const fn rescale_active(&self, source: Dimensions) -> bool {
        source.width > self.rescale_width && source.height > self.rescale_height
    }

    /// The fixed working resolution used when rescaling is active.
    #[must_use]
    pub const fn rescale_dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.rescale_width,
            height: self.rescale_height,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            threshold: Self::DEFAULT_THRESHOLD,
            rescale_width: Self::DEFAULT_RESCALE_WIDTH,
            rescale_height: Self::DEFAULT_RESCALE_HEIGHT,
        }
    }
}

/// Errors that can occur while preparing or running the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input image has a zero width or height.
    #[error("input image has zero width or height")]
    EmptyImage,

    /// The configured grid step is zero.
    #[error("grid step must be at least 1")]
    ZeroStep,

    /// The contour tile table does not hold exactly 16 tiles.
    #[error("expected 16 contour tiles, got {actual}")]
    TileCount {
        /// Number of tiles actually supplied.
        actual: usize,
    },

    /// A contour tile's dimensions differ from the tile size.
    #[error("contour tile {index} is {width}x{height}, expected {expected}x{expected}")]
    TileSize {
        /// Index of the offending tile (0-15).
        index: usize,
        /// Required edge length.
        expected: u32,
        /// Actual tile width.
        width: u32,
        /// Actual tile height.
        height: u32,
    },

    /// The configured step does not match the tile table's tile size.
    #[error("grid step {step} does not match contour tile size {tile_size}")]
    StepMismatch {
        /// Configured grid step.
        step: u32,
        /// Edge length of the loaded tiles.
        tile_size: u32,
    },

    /// Spawning a worker thread failed.
    #[error("failed to spawn worker {index}")]
    WorkerSpawn {
        /// Id of the worker that could not be spawned.
        index: usize,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked before completing its phases.
    #[error("worker {index} panicked")]
    WorkerPanicked {
        /// Id of the worker whose join failed.
        index: usize,
    },
}

impl PipelineError {
    /// Whether this error came from the worker pool rather than input
    /// validation. Callers use this to pick a distinct exit status for
    /// mid-run failures.
    #[must_use]
    pub const fn is_worker_failure(&self) -> bool {
        matches!(
            self,
            Self::WorkerSpawn { .. } | Self::WorkerPanicked { .. }
        )
    }
}
