//! The LLM client seam.

use async_trait::async_trait;

use crate::error::LlmResult;

/// A single text-completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the provider for a JSON response body.
    pub json_mode: bool,
}

impl LlmRequest {
    /// JSON-mode request with low temperature, the shape every scorer uses.
    pub fn json(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens,
            temperature: 0.2,
            json_mode: true,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text-completion service.
///
/// Implementations must be safe to share across concurrent scoring runs.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete a prompt, returning the raw model text.
    async fn complete(&self, request: &LlmRequest) -> LlmResult<String>;

    /// Name of the primary model, recorded on score records.
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::json::parse_llm_json;

    struct Canned(&'static str);

    #[async_trait]
    impl LlmClient for Canned {
        async fn complete(&self, request: &LlmRequest) -> LlmResult<String> {
            assert!(request.json_mode);
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_json_request_defaults() {
        let request = LlmRequest::json("Score this", 256);
        assert!(request.json_mode);
        assert_eq!(request.max_tokens, 256);
        assert_eq!(request.temperature, 0.2);

        let warmer = request.with_temperature(0.7);
        assert_eq!(warmer.temperature, 0.7);
        assert_eq!(warmer.prompt, "Score this");
    }

    #[test]
    fn test_completion_through_trait_object() {
        let client: Arc<dyn LlmClient> = Arc::new(Canned("```json\n{\"score\": 4}\n```"));
        let request = LlmRequest::json("Score this", 128);

        let text = tokio_test::assert_ok!(tokio_test::block_on(client.complete(&request)));
        let parsed = tokio_test::assert_ok!(parse_llm_json(&text));

        assert_eq!(parsed.value["score"], 4);
        assert_eq!(client.model_name(), "canned");
    }
}
