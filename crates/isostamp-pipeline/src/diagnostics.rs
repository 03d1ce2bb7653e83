//! Run diagnostics: per-worker, per-phase wall-clock timings and a run
//! summary.
//!
//! Collected on every call to
//! [`process_with_diagnostics`](crate::process_with_diagnostics); each
//! worker measures its own phases and hands the timings back through
//! its join handle, so collection adds no synchronization to the
//! pipeline itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::fmt::Write as _;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Dimensions;

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Serde support for `Option<Duration>` as optional fractional seconds.
mod opt_duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize an optional `Duration` as optional fractional seconds.
    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        duration.map(|d| d.as_secs_f64()).serialize(serializer)
    }

    /// Deserialize an optional `Duration` from optional fractional
    /// seconds.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        secs.map(|s| {
            Duration::try_from_secs_f64(s).map_err(|_| {
                serde::de::Error::custom(
                    "duration seconds must be finite, non-negative, and representable",
                )
            })
        })
        .transpose()
    }
}

/// Wall-clock phase durations measured by a single worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerTimings {
    /// Worker id, `0..worker_count`.
    pub id: usize,
    /// Rescale phase duration; `None` when rescaling was inactive.
    #[serde(with = "opt_duration_serde")]
    pub rescale: Option<Duration>,
    /// Grid sampling phase duration.
    #[serde(with = "duration_serde")]
    pub sample: Duration,
    /// Marching/stamping phase duration.
    #[serde(with = "duration_serde")]
    pub march: Duration,
}

/// High-level facts about one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Source image dimensions.
    pub source: Dimensions,
    /// Working (and output) image dimensions.
    pub working: Dimensions,
    /// Grid rows, `p + 1`.
    pub grid_rows: usize,
    /// Grid columns, `q + 1`.
    pub grid_cols: usize,
    /// Grid step size in pixels.
    pub step: u32,
    /// Luminance threshold used for classification.
    pub threshold: u8,
    /// Number of worker threads.
    pub worker_count: usize,
    /// Whether the bicubic rescale phase ran.
    pub rescale_applied: bool,
}

/// Diagnostics from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Per-worker phase timings, ordered by worker id.
    pub workers: Vec<WorkerTimings>,
    /// Total wall-clock duration including buffer allocation and
    /// output extraction.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Run summary.
    pub summary: RunSummary,
}

/// Format a duration as milliseconds with three decimals.
fn ms(duration: Duration) -> String {
    format!("{:.3}ms", duration.as_secs_f64() * 1000.0)
}

impl PipelineDiagnostics {
    /// Render a human-readable report of this run.
    #[must_use]
    pub fn report(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "contour stamping {}x{} -> {}x{} (rescale: {})",
            s.source.width,
            s.source.height,
            s.working.width,
            s.working.height,
            if s.rescale_applied { "yes" } else { "no" },
        );
        let _ = writeln!(
            out,
            "grid {}x{} points, step {}, threshold {}",
            s.grid_rows, s.grid_cols, s.step, s.threshold,
        );
        let _ = writeln!(out, "{} worker(s)", s.worker_count);
        let _ = writeln!(
            out,
            "{:>4} {:>12} {:>12} {:>12}",
            "id", "rescale", "sample", "march",
        );
        for worker in &self.workers {
            let rescale = worker.rescale.map_or_else(|| "-".to_owned(), ms);
            let _ = writeln!(
                out,
                "{:>4} {:>12} {:>12} {:>12}",
                worker.id,
                rescale,
                ms(worker.sample),
                ms(worker.march),
            );
        }
        let _ = write!(out, "total {}", ms(self.total_duration));
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_diagnostics() -> PipelineDiagnostics {
        PipelineDiagnostics {
            workers: vec![
                WorkerTimings {
                    id: 0,
                    rescale: Some(Duration::from_micros(1500)),
                    sample: Duration::from_micros(300),
                    march: Duration::from_micros(450),
                },
                WorkerTimings {
                    id: 1,
                    rescale: None,
                    sample: Duration::from_micros(310),
                    march: Duration::from_micros(440),
                },
            ],
            total_duration: Duration::from_millis(3),
            summary: RunSummary {
                source: Dimensions {
                    width: 64,
                    height: 64,
                },
                working: Dimensions {
                    width: 64,
                    height: 64,
                },
                grid_rows: 9,
                grid_cols: 9,
                step: 8,
                threshold: 200,
                worker_count: 2,
                rescale_applied: false,
            },
        }
    }

    #[test]
    fn report_mentions_dimensions_and_workers() {
        let report = sample_diagnostics().report();
        assert!(report.contains("64x64"));
        assert!(report.contains("2 worker(s)"));
        assert!(report.contains("total 3.000ms"));
    }

    #[test]
    fn serde_round_trip() {
        let diagnostics = sample_diagnostics();
        let json = serde_json::to_string(&diagnostics).unwrap();
        let back: PipelineDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.workers.len(), 2);
        assert_eq!(back.workers[0].rescale, Some(Duration::from_micros(1500)));
        assert_eq!(back.workers[1].rescale, None);
        assert_eq!(back.total_duration, Duration::from_millis(3));
        assert_eq!(back.summary.grid_rows, 9);
    }
}
