//! isostamp-pipeline: parallel marching-squares contour stamping
//! (sans-IO).
//!
//! Samples a raster image onto a coarse binary grid, classifies each
//! 2x2 grid cell into one of 16 configurations, and stamps the
//! pre-rendered contour tile for that configuration back onto the
//! image. Inputs above a size threshold are first bicubically upscaled
//! to a fixed working resolution.
//!
//! All three phases (optional rescale, grid sampling, and
//! marching/stamping) run on a fixed pool of worker threads over
//! statically partitioned index ranges, synchronized by a reusable
//! barrier between phases. The internal coordinator module owns the
//! phase discipline; [`shared`] documents the lock-free sharing
//! contract.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! [`RgbImage`] buffers and returns structured data. File formats,
//! tile loading, and the command line live in the `isostamp` binary
//! crate.

pub mod bicubic;
mod coordinator;
pub mod diagnostics;
pub mod grid;
pub mod march;
pub mod partition;
pub mod rescale;
pub mod shared;
pub mod types;

use std::num::NonZeroUsize;
use std::sync::Barrier;
use std::time::Instant;

pub use diagnostics::{PipelineDiagnostics, RunSummary, WorkerTimings};
pub use march::TileSet;
pub use types::{Dimensions, PipelineConfig, PipelineError, RgbImage};

use shared::{SharedGrid, SharedImage};

/// Run the full contour stamping pipeline.
///
/// Equivalent to [`process_with_diagnostics`] with the diagnostics
/// discarded.
///
/// # Errors
///
/// See [`process_with_diagnostics`].
pub fn process(
    source: &RgbImage,
    tiles: &TileSet,
    config: &PipelineConfig,
    workers: NonZeroUsize,
) -> Result<RgbImage, PipelineError> {
    process_with_diagnostics(source, tiles, config, workers).map(|(image, _)| image)
}

/// Run the full contour stamping pipeline, collecting per-phase
/// timings.
///
/// # Pipeline phases
///
/// 1. Validate the configuration, input dimensions, and tile table.
/// 2. Allocate the shared working image (a copy of the source, or a
///    blank buffer at the rescale resolution when both source axes
///    exceed the thresholds) and the classification grid.
/// 3. Launch the worker pool; every worker runs rescale (if active),
///    grid sampling, and marching, separated by two barrier waits.
/// 4. Join the pool and extract the stamped working image.
///
/// The output has the source dimensions when rescaling is inactive,
/// and exactly the configured rescale resolution otherwise.
///
/// # Errors
///
/// Returns [`PipelineError::ZeroStep`] for a zero grid step,
/// [`PipelineError::EmptyImage`] for a zero-sized input,
/// [`PipelineError::StepMismatch`] when the tile table's tile size is
/// not the configured step, and [`PipelineError::WorkerSpawn`] /
/// [`PipelineError::WorkerPanicked`] for worker pool failures.
pub fn process_with_diagnostics(
    source: &RgbImage,
    tiles: &TileSet,
    config: &PipelineConfig,
    workers: NonZeroUsize,
) -> Result<(RgbImage, PipelineDiagnostics), PipelineError> {
    let started = Instant::now();

    // 1. Validation, before any allocation or thread work.
    if config.step == 0 {
        return Err(PipelineError::ZeroStep);
    }
    if source.width() == 0 || source.height() == 0 {
        return Err(PipelineError::EmptyImage);
    }
    if tiles.tile_size() != config.step {
        return Err(PipelineError::StepMismatch {
            step: config.step,
            tile_size: tiles.tile_size(),
        });
    }

    // 2. Shared arenas. When rescaling, the working image starts blank
    // and the rescale phase fills it; otherwise the source is the
    // working image.
    let source_dimensions = Dimensions::of(source);
    let rescaling = config.rescale_active(source_dimensions);
    let working = if rescaling {
        let target = config.rescale_dimensions();
        SharedImage::blank(target.width, target.height)
    } else {
        SharedImage::from_image(source)
    };

    let p = (working.height() / config.step) as usize;
    let q = (working.width() / config.step) as usize;
    let grid = SharedGrid::new(p + 1, q + 1);

    // 3. Worker pool. The barrier participant count must equal the
    // worker count exactly.
    let worker_count = workers.get();
    let barrier = Barrier::new(worker_count);
    let contexts: Vec<_> = (0..worker_count)
        .map(|id| coordinator::WorkerContext {
            id,
            workers: worker_count,
            config,
            source: rescaling.then_some(source),
            working: &working,
            grid: &grid,
            tiles,
            barrier: &barrier,
        })
        .collect();
    let worker_timings = coordinator::run(&contexts)?;

    // 4. Output extraction.
    let output = working.to_image();
    let diagnostics = PipelineDiagnostics {
        workers: worker_timings,
        total_duration: started.elapsed(),
        summary: RunSummary {
            source: source_dimensions,
            working: working.dimensions(),
            grid_rows: p + 1,
            grid_cols: q + 1,
            step: config.step,
            threshold: config.threshold,
            worker_count,
            rescale_applied: rescaling,
        },
    };
    Ok((output, diagnostics))
}
