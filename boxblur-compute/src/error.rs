//! Engine error types.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn worker {rank}: {source}")]
    Spawn {
        rank: usize,
        #[source]
        source: io::Error,
    },

    #[error("worker {rank} panicked: {message}")]
    WorkerPanicked { rank: usize, message: String },
}
