//! Scoring error types.

use thiserror::Error;
use vscore_models::VideoId;

pub type ScoringResult<T> = Result<T, ScoringError>;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Video not found: {0}")]
    VideoNotFound(VideoId),

    #[error("Transcript missing for video {0}")]
    TranscriptMissing(VideoId),

    #[error("Context lookup failed: {0}")]
    Context(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("LLM error: {0}")]
    Llm(#[from] vscore_llm::LlmError),

    #[error("Firestore error: {0}")]
    Firestore(#[from] vscore_firestore::FirestoreError),
}

impl ScoringError {
    pub fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// True for errors the caller cannot fix by retrying the same input.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::VideoNotFound(_) | Self::TranscriptMissing(_))
    }
}
