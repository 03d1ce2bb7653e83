//! isostamp: parallel marching-squares contour stamping.
//!
//! Reads a raster image, samples it onto a coarse binary grid across a
//! fixed pool of worker threads, stamps the matching contour tile over
//! each 2x2 grid cell, and writes the contoured image back out.
//!
//! # Usage
//!
//! ```text
//! isostamp <INPUT> <OUTPUT> <THREADS> [--tiles DIR] [--step N]
//!          [--threshold N] [--json]
//! ```
//!
//! Exit status: 0 on success, 1 for usage/input errors, 2 for worker
//! pool failures.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod tiles;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use isostamp_pipeline::PipelineConfig;

/// Parallel marching-squares contour stamping.
///
/// Samples the input image on a coarse grid, classifies each grid cell
/// against a luminance threshold, and stamps one of 16 pre-rendered
/// contour tiles per cell. Large inputs are bicubically upscaled to a
/// fixed working resolution first.
#[derive(Parser, Debug)]
#[command(name = "isostamp", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, PPM).
    input: PathBuf,

    /// Path for the contoured output image (format from extension).
    output: PathBuf,

    /// Number of worker threads.
    #[arg(value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    threads: usize,

    /// Directory holding the 16 contour tiles, named 0.<ext> - 15.<ext>.
    #[arg(long, default_value = "contours")]
    tiles: PathBuf,

    /// Grid step size in pixels; contour tiles must be step x step.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_STEP)]
    step: u32,

    /// Luminance threshold: sample points whose channel average is at
    /// or below this value are inside the contour.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Print diagnostics as JSON on stdout instead of a report on
    /// stderr.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    // Usage errors exit 1 with the usage message on stderr;
    // --help/--version print to stdout and exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
            let _ = err.print();
            return code;
        }
    };
    run(&cli)
}

fn run(cli: &Cli) -> ExitCode {
    let Some(threads) = NonZeroUsize::new(cli.threads) else {
        // The value parser's lower bound already rejects 0.
        eprintln!("thread count must be at least 1");
        return ExitCode::FAILURE;
    };

    let config = PipelineConfig {
        step: cli.step,
        threshold: cli.threshold,
        ..PipelineConfig::default()
    };

    let tiles = match tiles::load(&cli.tiles, cli.step) {
        Ok(tiles) => tiles,
        Err(err) => {
            eprintln!("Error loading contour tiles: {err}");
            return ExitCode::FAILURE;
        }
    };

    let source = match image::open(&cli.input) {
        Ok(img) => img.to_rgb8(),
        Err(err) => {
            eprintln!("Error reading {}: {err}", cli.input.display());
            return ExitCode::FAILURE;
        }
    };

    let (output, diagnostics) =
        match isostamp_pipeline::process_with_diagnostics(&source, &tiles, &config, threads) {
            Ok(result) => result,
            Err(err) => {
                eprintln!("Pipeline error: {err}");
                // Worker pool failures get a distinct exit status.
                return if err.is_worker_failure() {
                    ExitCode::from(2)
                } else {
                    ExitCode::FAILURE
                };
            }
        };

    if let Err(err) = output.save(&cli.output) {
        eprintln!("Error writing {}: {err}", cli.output.display());
        return ExitCode::FAILURE;
    }

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("Error serializing diagnostics: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        eprintln!("{}", diagnostics.report());
    }

    ExitCode::SUCCESS
}
