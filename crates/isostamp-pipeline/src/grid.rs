//! Grid sampling stage: classify coarse sample points of the working
//! image as inside/outside the contour.
//!
//! For a working image of `width x height` and step `s`, the grid holds
//! `(p + 1) x (q + 1)` binary cells with `p = height / s` rows and
//! `q = width / s` columns. Interior cell `(i, j)` samples the pixel at
//! `(x = j*s, y = i*s)`; the extra right-edge column samples at
//! `x = width - 1` and the extra bottom-edge row at `y = height - 1`,
//! so the marching stage always has a complete 2x2 neighborhood.
//!
//! Partitioning per worker:
//! - interior pass: all `p` rows, a disjoint sub-range of columns;
//! - right-edge pass: a disjoint sub-range of rows;
//! - bottom-edge pass: the same disjoint sub-range of columns.
//!
//! The passes use different partition axes, so one worker's writes span
//! both axes but never overlap another worker's cells. The single
//! corner cell `grid[p][q]` would be racy under either axis; worker 0
//! alone pins it to 0.

use crate::partition;
use crate::shared::{SharedGrid, SharedImage};
use crate::types::PipelineConfig;

/// Classify one sampled pixel: 1 when the channel average is at or
/// below the luminance threshold, else 0.
fn classify(rgb: [u8; 3], threshold: u8) -> u8 {
    let average = (u16::from(rgb[0]) + u16::from(rgb[1]) + u16::from(rgb[2])) / 3;
    u8::from(average <= u16::from(threshold))
}

/// Populate worker `id`'s cells of the classification grid.
///
/// Every cell is written exactly once across the pool; the grid is
/// complete once all workers have finished this phase.
#[allow(clippy::cast_possible_truncation)]
pub fn sample(
    working: &SharedImage,
    grid: &SharedGrid,
    config: &PipelineConfig,
    id: usize,
    workers: usize,
) {
    let p = grid.rows() - 1;
    let q = grid.cols() - 1;
    let step = config.step as usize;
    let threshold = config.threshold;

    let row_span = partition::span(id, workers, p);
    let col_span = partition::span(id, workers, q);

    // Interior cells: all rows, this worker's columns.
    for i in 0..p {
        for j in col_span.clone() {
            let rgb = working.pixel((j * step) as u32, (i * step) as u32);
            grid.set(i, j, classify(rgb, threshold));
        }
    }

    // The bottom-right corner would be written twice under either edge
    // partition; exactly one worker pins it instead.
    if id == 0 {
        grid.set(p, q, 0);
    }

    // Right-edge column: this worker's rows, sampled at the last pixel
    // column.
    for i in row_span {
        let rgb = working.pixel(working.width() - 1, (i * step) as u32);
        grid.set(i, q, classify(rgb, threshold));
    }

    // Bottom-edge row: this worker's columns, sampled at the last pixel
    // row.
    for j in col_span {
        let rgb = working.pixel((j * step) as u32, working.height() - 1);
        grid.set(p, j, classify(rgb, threshold));
    }
}
