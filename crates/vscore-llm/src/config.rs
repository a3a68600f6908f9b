//! LLM client configuration.

use std::time::Duration;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Models tried in order when a request fails.
pub const DEFAULT_MODELS: [&str; 3] = ["gemini-2.5-flash", "gemini-2.5-flash-lite", "gemini-2.5-pro"];

/// LLM client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key (required for Gemini)
    pub api_key: Option<String>,
    /// Ordered fallback list of model names
    pub models: Vec<String>,
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Requests allowed per minute across all callers sharing the client
    pub requests_per_minute: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            requests_per_minute: 60,
        }
    }
}

impl LlmConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            models: std::env::var("LLM_MODELS")
                .ok()
                .map(|s| parse_model_list(&s))
                .filter(|m| !m.is_empty())
                .unwrap_or(defaults.models),
            base_url: std::env::var("LLM_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("LLM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            requests_per_minute: std::env::var("LLM_REQUESTS_PER_MINUTE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &u32| *n > 0)
                .unwrap_or(60),
        }
    }

    /// Primary model (first in the fallback list).
    pub fn primary_model(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }
}

/// Split a comma-separated model list, dropping blanks.
fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
