//! End-to-end contour stamping scenarios exercising the public
//! pipeline API.

#![allow(clippy::unwrap_used)]

use std::num::NonZeroUsize;

use image::{Rgb, RgbImage};
use isostamp_pipeline::{PipelineConfig, TileSet, process, process_with_diagnostics};

/// Tile table where tile 0 is blank white and tile `k > 0` is solid
/// `[k*16; 3]`, so stamped codes are readable from the output pixels.
fn coded_tiles(tile_size: u32) -> TileSet {
    let tiles = (0..TileSet::COUNT)
        .map(|k| {
            let value = if k == 0 { 255 } else { (k * 16) as u8 };
            RgbImage::from_pixel(tile_size, tile_size, Rgb([value; 3]))
        })
        .collect();
    TileSet::new(tiles, tile_size).unwrap()
}

fn workers(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).unwrap()
}

#[test]
fn all_white_image_is_unchanged_by_the_blank_tile() {
    // Every sample point averages 255 > 200, the grid is all zero, and
    // each cell block stamps configuration 0 (the blank white tile),
    // so the output equals the input tile-for-tile.
    let source = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
    let output = process(
        &source,
        &coded_tiles(8),
        &PipelineConfig::default(),
        workers(2),
    )
    .unwrap();
    assert_eq!(output, source);
}

#[test]
fn dark_corner_stamps_the_top_left_configuration() {
    // Only the top-left 8x8 block is dark, so only grid point (0, 0)
    // classifies as 1 and only cell block (0, 0) gets a non-zero code:
    // 8 (top-left corner bit).
    let source = RgbImage::from_fn(16, 16, |x, y| {
        if x < 8 && y < 8 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });
    let output = process(
        &source,
        &coded_tiles(8),
        &PipelineConfig::default(),
        workers(1),
    )
    .unwrap();

    // Block (0, 0) carries tile 8's color...
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(output.get_pixel(x, y).0, [128, 128, 128]);
        }
    }
    // ...and every other block carries the blank tile.
    for y in 0..16 {
        for x in 0..16 {
            if x >= 8 || y >= 8 {
                assert_eq!(output.get_pixel(x, y).0, [255, 255, 255]);
            }
        }
    }
}

#[test]
fn output_is_identical_for_every_worker_count() {
    // Partitioning must not affect results: same image, same tiles,
    // 1 through 6 workers, bit-identical outputs.
    let source = RgbImage::from_fn(48, 40, |x, y| {
        let value = ((x * 7 + y * 13) % 256) as u8;
        Rgb([value, value.wrapping_mul(3), value.wrapping_add(40)])
    });
    let tiles = coded_tiles(8);
    let config = PipelineConfig::default();

    let reference = process(&source, &tiles, &config, workers(1)).unwrap();
    for n in 2..=6 {
        let output = process(&source, &tiles, &config, workers(n)).unwrap();
        assert_eq!(output, reference, "output differs with {n} workers");
    }
}

#[test]
fn above_threshold_input_is_rescaled_to_the_working_resolution() {
    // Shrunken thresholds keep the test cheap: a 20x20 source exceeds
    // 16x16 on both axes, so the pipeline upscales-to-fixed-resolution
    // and the output is written at exactly that resolution.
    let config = PipelineConfig {
        step: 8,
        rescale_width: 16,
        rescale_height: 16,
        ..PipelineConfig::default()
    };
    let source = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
    let (output, diagnostics) = process_with_diagnostics(
        &source,
        &coded_tiles(8),
        &config,
        workers(2),
    )
    .unwrap();

    assert!(diagnostics.summary.rescale_applied);
    assert_eq!(output.width(), 16);
    assert_eq!(output.height(), 16);
    assert_eq!(
        (output.width(), output.height()),
        (
            diagnostics.summary.working.width,
            diagnostics.summary.working.height,
        ),
    );
    // Uniform white survives bicubic rescale, so the blank tile leaves
    // every pixel white.
    assert!(output.pixels().all(|px| px.0 == [255, 255, 255]));

    // Workers report a rescale phase.
    assert!(diagnostics.workers.iter().all(|w| w.rescale.is_some()));
}

#[test]
fn one_axis_above_threshold_does_not_rescale() {
    let config = PipelineConfig {
        step: 8,
        rescale_width: 16,
        rescale_height: 16,
        ..PipelineConfig::default()
    };
    // Width exceeds, height does not.
    let source = RgbImage::from_pixel(24, 16, Rgb([255, 255, 255]));
    let (output, diagnostics) =
        process_with_diagnostics(&source, &coded_tiles(8), &config, workers(1)).unwrap();
    assert!(!diagnostics.summary.rescale_applied);
    assert_eq!((output.width(), output.height()), (24, 16));
}

#[test]
fn rescaled_path_is_deterministic_across_worker_counts() {
    let config = PipelineConfig {
        step: 4,
        rescale_width: 12,
        rescale_height: 12,
        ..PipelineConfig::default()
    };
    let source = RgbImage::from_fn(30, 30, |x, y| {
        Rgb([(x * 8) as u8, (y * 8) as u8, ((x + y) * 4) as u8])
    });
    let tiles = coded_tiles(4);

    let reference = process(&source, &tiles, &config, workers(1)).unwrap();
    for n in 2..=4 {
        let output = process(&source, &tiles, &config, workers(n)).unwrap();
        assert_eq!(output, reference, "rescaled output differs with {n} workers");
    }
}

#[test]
fn truncated_remainder_pixels_are_left_untouched() {
    // 19x19 with step 8: p = q = 2, stamped region covers 16x16; the
    // 3-pixel fringe is never written.
    let source = RgbImage::from_pixel(19, 19, Rgb([7, 7, 7]));
    let output = process(
        &source,
        &coded_tiles(8),
        &PipelineConfig::default(),
        workers(2),
    )
    .unwrap();
    assert_eq!(output.width(), 19);
    // Dark image: interior grid is 1s, blocks stamp non-zero codes.
    assert_ne!(output.get_pixel(0, 0).0, [7, 7, 7]);
    // Fringe pixels keep the source value.
    assert_eq!(output.get_pixel(18, 18).0, [7, 7, 7]);
    assert_eq!(output.get_pixel(16, 2).0, [7, 7, 7]);
}
