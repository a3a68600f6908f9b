//! Gemini REST client.
//!
//! Sends a single prompt to `models/{model}:generateContent` and falls back
//! across the configured model list when a model fails. All requests share a
//! per-minute quota so concurrent scoring runs cannot exceed the provider's
//! rate limit.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{LlmClient, LlmRequest};
use crate::config::LlmConfig;
use crate::error::{LlmError, LlmResult};
use crate::metrics;

/// Shared request limiter.
pub type LlmRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    client: Client,
    models: Vec<String>,
    base_url: String,
    limiter: Arc<LlmRateLimiter>,
}

/// Gemini API request.
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    /// Create a client from configuration.
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| LlmError::not_configured("GEMINI_API_KEY not set"))?;

        if config.models.is_empty() {
            return Err(LlmError::not_configured("no models configured"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::not_configured(format!("failed to build HTTP client: {}", e)))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_minute(per_minute)));

        Ok(Self {
            api_key,
            client,
            models: config.models,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> LlmResult<Self> {
        Self::new(LlmConfig::from_env())
    }

    /// Configured fallback order.
    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// Call one model once.
    async fn call_model(&self, model: &str, request: &LlmRequest) -> LlmResult<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let body = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.json_mode.then(|| "application/json".to_string()),
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::request_failed(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::invalid_response(format!("Failed to decode Gemini response: {}", e)))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::invalid_response("No content in Gemini response"));
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: &LlmRequest) -> LlmResult<String> {
        self.limiter.until_ready().await;

        let mut last_error = None;

        for (idx, model) in self.models.iter().enumerate() {
            debug!(model = %model, prompt_chars = request.prompt.len(), "Calling Gemini");
            let started = Instant::now();

            match self.call_model(model, request).await {
                Ok(text) => {
                    metrics::record_request(model, true, started.elapsed().as_secs_f64());
                    info!(model = %model, response_chars = text.len(), "Gemini call succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    metrics::record_request(model, false, started.elapsed().as_secs_f64());
                    warn!(model = %model, error = %e, "Gemini model failed");
                    if idx + 1 < self.models.len() {
                        metrics::record_fallback(model);
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(LlmError::AllModelsFailed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no models attempted".to_string()),
        ))
    }

    fn model_name(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let result = GeminiClient::new(LlmConfig::default());
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }

    #[test]
    fn test_new_requires_models() {
        let config = LlmConfig {
            api_key: Some("k".into()),
            models: vec![],
            ..LlmConfig::default()
        };
        assert!(matches!(GeminiClient::new(config), Err(LlmError::NotConfigured(_))));
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let config = GenerationConfig {
            response_mime_type: Some("application/json".into()),
            temperature: 0.5,
            max_output_tokens: 100,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["responseMimeType"], "application/json");
        assert_eq!(json["maxOutputTokens"], 100);
    }
}
