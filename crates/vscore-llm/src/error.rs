//! LLM error types.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM client not configured: {0}")]
    NotConfigured(String),

    #[error("LLM request failed: {0}")]
    RequestFailed(String),

    #[error("LLM returned HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),

    #[error("Unparseable LLM output: {0}")]
    Unparseable(String),

    #[error("All models failed, last error: {0}")]
    AllModelsFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn unparseable(msg: impl Into<String>) -> Self {
        Self::Unparseable(msg.into())
    }

    /// Transport failures and throttling/server statuses are worth another model.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RequestFailed(_) => true,
            LlmError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let throttled = LlmError::HttpStatus { status: 429, message: String::new() };
        let unavailable = LlmError::HttpStatus { status: 503, message: String::new() };
        let bad_request = LlmError::HttpStatus { status: 400, message: String::new() };
        assert!(throttled.is_retryable());
        assert!(unavailable.is_retryable());
        assert!(!bad_request.is_retryable());
        assert!(!LlmError::unparseable("x").is_retryable());
    }
}
