use std::io;
use thiserror::Error;

/// Main error type for the server
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Forbidden path: {0}")]
    Forbidden(String),

    #[error("Worker pool is shutting down")]
    PoolStopped,

    #[error("Failed to spawn worker: {0}")]
    WorkerSpawn(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
