use thiserror::Error;

/// Errors produced while reading chart payloads off the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// The payload is not valid JSON for the expected shape.
    #[error("invalid chart JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
