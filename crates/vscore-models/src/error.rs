//! Model error types.

use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown gate name: {0}")]
    UnknownGate(String),

    #[error("Unknown keyword tier: {0}")]
    UnknownTier(String),

    #[error("Unknown multiplier bucket: {0}")]
    UnknownBucket(String),

    #[error("Unknown quality dimension: {0}")]
    UnknownDimension(String),
}
