//! Deterministic worker index partitioning.
//!
//! Every parallel phase divides one index space (destination rows, grid
//! rows, or grid columns) across the fixed worker pool. Ranges are
//! computed from `(id, workers, len)` alone so a worker never needs to
//! coordinate with its peers: the union of all ranges tiles `[0, len)`
//! exactly, with no gaps and no overlaps. Disjointness of these ranges
//! is what makes the phases' unsynchronized writes safe.

use std::ops::Range;

/// The half-open index range `[start, end)` owned by worker `id` out of
/// `workers` over a space of `len` indices.
///
/// Bounds are computed by floating-point division and truncation, with
/// the upper bound clamped to `len`; the last worker absorbs any
/// remainder.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn span(id: usize, workers: usize, len: usize) -> Range<usize> {
    debug_assert!(workers > 0, "partitioning requires at least one worker");
    debug_assert!(id < workers, "worker id out of range");

    let start = (id as f64 * len as f64 / workers as f64) as usize;
    let end = ((id + 1) as f64 * len as f64 / workers as f64).min(len as f64) as usize;
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    /// For any worker count, the ranges tile `[0, len)` exactly:
    /// no gaps, no overlaps.
    #[test]
    fn spans_tile_the_space_exactly() {
        for len in [0, 1, 2, 7, 64, 255, 256, 2048] {
            for workers in 1..=len.max(1) {
                let mut next = 0;
                for id in 0..workers {
                    let range = span(id, workers, len);
                    assert_eq!(
                        range.start, next,
                        "gap or overlap at worker {id}/{workers} over {len}",
                    );
                    assert!(range.end >= range.start);
                    next = range.end;
                }
                assert_eq!(next, len, "ranges do not cover [0, {len})");
            }
        }
    }

    #[test]
    fn single_worker_owns_everything() {
        assert_eq!(span(0, 1, 100), 0..100);
    }

    #[test]
    fn last_worker_absorbs_remainder() {
        // 10 indices over 3 workers: 0..3, 3..6, 6..10.
        assert_eq!(span(0, 3, 10), 0..3);
        assert_eq!(span(1, 3, 10), 3..6);
        assert_eq!(span(2, 3, 10), 6..10);
    }

    #[test]
    fn more_workers_than_indices_leaves_some_idle() {
        let ranges: Vec<_> = (0..8).map(|id| span(id, 8, 3)).collect();
        let covered: usize = ranges.iter().map(|r| r.end - r.start).sum();
        assert_eq!(covered, 3);
        assert!(ranges.iter().any(Range::is_empty));
    }
}
