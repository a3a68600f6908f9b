//! LLM client for the script scoring pipeline.
//!
//! Provides the [`LlmClient`] seam used by every AI-assisted scorer, a Gemini
//! REST implementation with ordered model fallback and a shared per-minute
//! request quota, and a tolerant JSON parser for model output.

pub mod client;
pub mod config;
pub mod error;
pub mod gemini;
pub mod json;
pub mod metrics;

pub use client::{LlmClient, LlmRequest};
pub use config::LlmConfig;
pub use error::{LlmError, LlmResult};
pub use gemini::GeminiClient;
pub use json::{parse_llm_json, parse_llm_json_as, repair_json, strip_code_fences, ParseStage, ParsedJson};
