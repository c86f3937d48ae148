//! Fork/join orchestration of one blur run.

use crate::barrier::{Barrier, BarrierPoisoned};
use crate::error::EngineError;
use crate::filter::{BoxBlur, RowFilter};
use crate::frames::FrameBuffers;
use crate::worker::{run_worker, RunContext};
use boxblur_core::{partition_rows, BlurConfig, PixelGrid};
use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a completed run.
#[derive(Debug)]
pub struct BlurOutcome {
    /// The frame produced by the last round.
    pub grid: PixelGrid,
    /// Wall time of the threaded section only.
    pub elapsed: Duration,
}

/// Runs a [`RowFilter`] for a fixed number of rounds on a fixed pool of threads.
pub struct BlurEngine<F = BoxBlur> {
    workers: usize,
    rounds: u32,
    filter: F,
}

impl BlurEngine<BoxBlur> {
    pub fn new(workers: usize, rounds: u32) -> Result<Self, EngineError> {
        Self::with_filter(workers, rounds, BoxBlur)
    }

    pub fn from_config(config: &BlurConfig) -> Result<Self, EngineError> {
        Self::new(config.workers, config.rounds)
    }
}

impl<F: RowFilter> BlurEngine<F> {
    pub fn with_filter(workers: usize, rounds: u32, filter: F) -> Result<Self, EngineError> {
        if workers == 0 {
            return Err(EngineError::InvalidConfig(
                "worker count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            workers,
            rounds,
            filter,
        })
    }

    /// Filter `image` `rounds` times and return the final frame.
    pub fn run(&self, image: PixelGrid) -> Result<BlurOutcome, EngineError> {
        let spans = partition_rows(image.height(), self.workers);
        log::info!(
            "Blurring {}x{} image: {} rounds on {} workers ({} to {} rows each)",
            image.width(),
            image.height(),
            self.rounds,
            self.workers,
            spans.iter().map(|s| s.len()).min().unwrap_or(0),
            spans.iter().map(|s| s.len()).max().unwrap_or(0),
        );

        let ctx = RunContext {
            frames: FrameBuffers::new(image),
            barrier: Barrier::new(self.workers),
            spans,
            rounds: self.rounds,
            filter: &self.filter,
        };

        let start = Instant::now();
        self.run_workers(&ctx)?;
        let elapsed = start.elapsed();

        Ok(BlurOutcome {
            grid: ctx.frames.into_destination(),
            elapsed,
        })
    }

    fn run_workers(&self, ctx: &RunContext<'_, F>) -> Result<(), EngineError> {
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.workers);
            let mut spawn_error = None;

            for rank in 0..self.workers {
                let spawned = thread::Builder::new()
                    .name(format!("blur-worker-{rank}"))
                    .spawn_scoped(scope, move || run_worker(rank, ctx));
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(source) => {
                        log::error!("Failed to spawn worker {rank}: {source}");
                        // The started workers would wait for this rank forever.
                        ctx.barrier.poison();
                        spawn_error = Some(EngineError::Spawn { rank, source });
                        break;
                    }
                }
            }

            let mut failure = None;
            for (rank, handle) in handles.into_iter().enumerate() {
                let Err(payload) = handle.join() else {
                    continue;
                };
                if payload.is::<BarrierPoisoned>() {
                    continue;
                }
                let message = panic_message(payload.as_ref());
                log::error!("Worker {rank} panicked: {message}");
                if failure.is_none() {
                    failure = Some(EngineError::WorkerPanicked { rank, message });
                }
            }

            match spawn_error.or(failure) {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

/// Blur `image` `rounds` times on `workers` threads with the box blur.
pub fn run(image: PixelGrid, workers: usize, rounds: u32) -> Result<BlurOutcome, EngineError> {
    BlurEngine::new(workers, rounds)?.run(image)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
