pub mod barrier;
pub mod engine;
pub mod error;
pub mod filter;
pub mod frames;
mod worker;

pub use barrier::{Barrier, BarrierPoisoned, BarrierWaitResult};
pub use engine::{run, BlurEngine, BlurOutcome};
pub use error::EngineError;
pub use filter::{BoxBlur, RowFilter};
pub use frames::FrameBuffers;
pub use worker::SWAP_RANK;

// Re-export core types for convenience
pub use boxblur_core::*;
