//! Engine and directory errors

use thiserror::Error;

/// Faults that abort a single analyze/summarize call
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Flagged amount overflowed while aggregating actor {actor_id}")]
    AmountOverflow { actor_id: String },

    #[error("Counter overflowed while computing {0}")]
    CountOverflow(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid risk policy: {0}")]
    Policy(String),

    #[error("Snapshot parse error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// User directory lookup failures. Never fatal to an analysis run.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Directory unavailable: {0}")]
    Unavailable(String),

    #[error("Directory returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Directory transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Directory lookup timed out after {0}ms")]
    Timeout(u64),

    #[error("Directory worker exited without a response")]
    Disconnected,
}
