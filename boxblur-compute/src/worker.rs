//! Per-thread control loop.
//!
//! Every round has three checkpoints:
//! 1. compute: blur the worker's own rows from the source into the destination;
//! 2. completion barrier: the destination is complete;
//! 3. swap: rank 0 flips the roles, then everyone passes the barrier again.
//!
//! One swap checkpoint also runs before the first round and the loop ends with one
//! more. The loaded image starts in the destination role, so the opening swap makes
//! it the first source and the closing swap leaves the newest frame in the
//! destination role.

use crate::barrier::Barrier;
use crate::filter::RowFilter;
use crate::frames::FrameBuffers;
use boxblur_core::RowSpan;

/// Rank that owns the role swap.
pub const SWAP_RANK: usize = 0;

/// Everything the workers of one run share. Owned by the engine, borrowed by workers.
pub(crate) struct RunContext<'f, F> {
    pub frames: FrameBuffers,
    pub barrier: Barrier,
    pub spans: Vec<RowSpan>,
    pub rounds: u32,
    pub filter: &'f F,
}

impl<F: RowFilter> RunContext<'_, F> {
    fn swap_checkpoint(&self, rank: usize) {
        if rank == SWAP_RANK {
            self.frames.swap_roles();
        }
        self.barrier.arrive_and_wait();
    }

    fn compute(&self, span: RowSpan) {
        // SAFETY: between the swap barrier and the completion barrier nobody swaps
        // roles, nobody writes the source, and each rank writes only its own span.
        unsafe {
            let source = self.frames.source();
            let out = self.frames.destination_rows(span);
            self.filter.filter_rows(source, span, out);
        }
    }
}

/// Poisons the barrier if the worker unwinds, so its peers stop waiting for it.
struct PoisonOnPanic<'a>(&'a Barrier);

impl Drop for PoisonOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.poison();
        }
    }
}

pub(crate) fn run_worker<F: RowFilter>(rank: usize, ctx: &RunContext<'_, F>) {
    let _guard = PoisonOnPanic(&ctx.barrier);
    let span = ctx.spans[rank];

    ctx.swap_checkpoint(rank);
    for _ in 0..ctx.rounds {
        ctx.compute(span);
        ctx.barrier.arrive_and_wait();
        ctx.swap_checkpoint(rank);
    }
    ctx.swap_checkpoint(rank);

    log::debug!(
        "worker {} finished {} rounds over rows {}..{}",
        rank,
        ctx.rounds,
        span.start,
        span.end
    );
}
