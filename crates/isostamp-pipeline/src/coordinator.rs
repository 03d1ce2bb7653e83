//! Worker coordinator: the fixed thread pool, the phase barrier, and
//! the launch/abort gate.
//!
//! The coordinator spawns exactly `P` workers, each of which runs the
//! full phase sequence in one function body:
//!
//! ```text
//! CREATED -> RESCALING -> BARRIER_1 -> SAMPLING -> BARRIER_2
//!         -> MARCHING -> DONE
//! ```
//!
//! The shared [`Barrier`] has exactly `P` participants; its two waits
//! are the only suspension points in a worker. No worker enters
//! sampling before every worker finishes rescaling, and none enters
//! marching before the grid is fully populated; this is the invariant
//! the whole design rests on.
//!
//! Workers do not start the phase sequence until every spawn has
//! succeeded: they first block on a launch gate the coordinator
//! releases once the pool is complete. A failed spawn releases the gate
//! in abort mode instead, so the partial pool exits without ever
//! touching the phase barrier (which would deadlock at fewer than `P`
//! participants).

use std::sync::{Barrier, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

use image::RgbImage;

use crate::diagnostics::WorkerTimings;
use crate::march::TileSet;
use crate::shared::{SharedGrid, SharedImage};
use crate::types::{PipelineConfig, PipelineError};
use crate::{grid, march, rescale};

/// Everything one worker needs, fixed before launch.
pub(crate) struct WorkerContext<'a> {
    /// Worker id, `0..workers`.
    pub id: usize,
    /// Total worker count `P`.
    pub workers: usize,
    /// Immutable run configuration.
    pub config: &'a PipelineConfig,
    /// Source image; `Some` exactly when the rescale phase is active.
    pub source: Option<&'a RgbImage>,
    /// Shared working image arena.
    pub working: &'a SharedImage,
    /// Shared classification grid arena.
    pub grid: &'a SharedGrid,
    /// Immutable contour tile table.
    pub tiles: &'a TileSet,
    /// Phase barrier with exactly `workers` participants.
    pub barrier: &'a Barrier,
}

/// Outcome of waiting on the launch gate.
enum Launch {
    Pending,
    Go,
    Abort,
}

/// One-shot gate separating thread creation from phase execution.
struct LaunchGate {
    state: Mutex<Launch>,
    ready: Condvar,
}

impl LaunchGate {
    fn new() -> Self {
        Self {
            state: Mutex::new(Launch::Pending),
            ready: Condvar::new(),
        }
    }

    /// Release all waiting workers, either into the phase sequence or
    /// straight to exit.
    fn release(&self, go: bool) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = if go { Launch::Go } else { Launch::Abort };
        drop(state);
        self.ready.notify_all();
    }

    /// Block until released; `true` means run the phases.
    fn wait(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while matches!(*state, Launch::Pending) {
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        matches!(*state, Launch::Go)
    }
}

/// Run one worker's full phase sequence, timing each phase.
fn worker_phases(ctx: &WorkerContext<'_>) -> WorkerTimings {
    let rescale = ctx.source.map(|source| {
        let started = Instant::now();
        rescale::rescale_rows(source, ctx.working, ctx.id, ctx.workers);
        started.elapsed()
    });

    ctx.barrier.wait();

    let started = Instant::now();
    grid::sample(ctx.working, ctx.grid, ctx.config, ctx.id, ctx.workers);
    let sample = started.elapsed();

    ctx.barrier.wait();

    let started = Instant::now();
    march::stamp(ctx.grid, ctx.working, ctx.tiles, ctx.id, ctx.workers);
    let march = started.elapsed();

    WorkerTimings {
        id: ctx.id,
        rescale,
        sample,
        march,
    }
}

/// Launch all workers, sequence the three phases, and join the pool.
///
/// Returns each worker's phase timings, ordered by id.
///
/// # Errors
///
/// Returns [`PipelineError::WorkerSpawn`] when thread creation fails
/// (the already-spawned workers are released through the abort gate and
/// joined), or [`PipelineError::WorkerPanicked`] when a worker's join
/// reports a panic.
pub(crate) fn run(contexts: &[WorkerContext<'_>]) -> Result<Vec<WorkerTimings>, PipelineError> {
    let gate = LaunchGate::new();
    let gate = &gate;

    thread::scope(|s| {
        let mut handles = Vec::with_capacity(contexts.len());
        let mut spawn_failure = None;
        for ctx in contexts {
            let builder = thread::Builder::new().name(format!("isostamp-worker-{}", ctx.id));
            match builder.spawn_scoped(s, move || {
                if gate.wait() {
                    Some(worker_phases(ctx))
                } else {
                    None
                }
            }) {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    spawn_failure = Some(PipelineError::WorkerSpawn {
                        index: ctx.id,
                        source,
                    });
                    break;
                }
            }
        }

        gate.release(spawn_failure.is_none());
        if let Some(err) = spawn_failure {
            // The partial pool saw the abort and returns without phase
            // work; the scope joins it on exit.
            return Err(err);
        }

        // Join everything before surfacing any panic so the scope has
        // no unjoined threads left to re-raise from.
        let joined: Vec<_> = handles.into_iter().map(|handle| handle.join()).collect();
        let mut timings = Vec::with_capacity(joined.len());
        for (index, outcome) in joined.into_iter().enumerate() {
            match outcome {
                Ok(Some(worker_timings)) => timings.push(worker_timings),
                // Gate released in go mode, so a worker never reports
                // an aborted launch here.
                Ok(None) => {}
                Err(_) => return Err(PipelineError::WorkerPanicked { index }),
            }
        }
        Ok(timings)
    })
}
