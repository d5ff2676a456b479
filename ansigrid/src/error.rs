//! Error types for the emulation and registry API.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No persistent instance is registered under this id.
    #[error("no terminal instance with id {id}")]
    NotFound { id: u64 },

    /// A string payload that must be text (an OSC title or color spec)
    /// contained malformed UTF-8.
    #[error("malformed UTF-8 in escape sequence string payload")]
    InvalidUtf8,

    /// Input the engine cannot route to a no-op, e.g. a zero-sized grid.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O failure in the CLI surface.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
