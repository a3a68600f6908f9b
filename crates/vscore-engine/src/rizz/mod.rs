//! Rizz (presenter charisma) scoring.
//!
//! 60% vocal delivery, 40% copy. Everything is deterministic except the
//! personality-moment count, which takes one model call.

pub mod copy;
pub mod patterns;
pub mod vocal;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use vscore_llm::{parse_llm_json, LlmClient, LlmError, LlmRequest, LlmResult};
use vscore_models::{EmotionSegment, PersonalityMoment, RizzScore};

use crate::prompts::personality_prompt;
use crate::text::{duration_minutes, truncate_chars};

pub use copy::{score_copy, PersonalityCount};
pub use vocal::{score_vocal, VocalParams};

const MAX_TOKENS: u32 = 1000;

/// Scores vocal and copy charisma.
#[derive(Clone)]
pub struct RizzScorer {
    llm: Arc<dyn LlmClient>,
    vocal: VocalParams,
    transcript_chars: usize,
}

impl RizzScorer {
    pub fn new(llm: Arc<dyn LlmClient>, vocal: VocalParams, transcript_chars: usize) -> Self {
        Self {
            llm,
            vocal,
            transcript_chars,
        }
    }

    /// Score a transcript. Never fails: a failed personality call degrades
    /// that one metric.
    pub async fn score(
        &self,
        transcript: &str,
        segments: Option<&[EmotionSegment]>,
        duration_seconds: u32,
    ) -> RizzScore {
        let vocal = score_vocal(segments, transcript, duration_seconds, self.vocal);

        let personality = match self.count_personality(transcript).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Personality density scoring failed");
                None
            }
        };
        let minutes = duration_minutes(duration_seconds, transcript, self.vocal.words_per_minute);
        let copy = score_copy(transcript, minutes, personality);

        let rizz = RizzScore::combine(vocal, copy);
        info!(
            score = rizz.score,
            vocal = rizz.vocal_weighted,
            copy = rizz.copy_weighted,
            vocal_available = rizz.vocal_available,
            "Rizz scored"
        );
        rizz
    }

    async fn count_personality(&self, transcript: &str) -> LlmResult<PersonalityCount> {
        let prompt = personality_prompt(truncate_chars(transcript, self.transcript_chars));
        let reply = self.llm.complete(&LlmRequest::json(prompt, MAX_TOKENS)).await?;
        let parsed = parse_llm_json(&reply)?;
        personality_from_json(&parsed.value)
    }
}

/// Read the personality count. `total_count` wins; without it the listed
/// moments are counted.
pub fn personality_from_json(value: &Value) -> LlmResult<PersonalityCount> {
    let root = value
        .as_object()
        .ok_or_else(|| LlmError::invalid_response("personality reply is not a JSON object"))?;

    let moments: Vec<PersonalityMoment> = root
        .get("moments")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|m| serde_json::from_value(m.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let total = match root.get("total_count") {
        Some(Value::Number(n)) => n.as_f64().map(|f| f.max(0.0).round() as usize),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    match total {
        Some(total) => Ok(PersonalityCount { total, moments }),
        None if root.contains_key("moments") => Ok(PersonalityCount {
            total: moments.len(),
            moments,
        }),
        None => Err(LlmError::invalid_response("personality reply has no count")),
    }
}
