//! Quality dimension scorer.
//!
//! One model call scores six weighted dimensions (100 points). Sub-scores are
//! clamped to their rubric maxima and every total is recomputed locally; the
//! model's own arithmetic is kept only for audit.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};
use vscore_llm::{parse_llm_json, LlmClient, LlmError, LlmRequest, LlmResult};
use vscore_models::{
    ActionItem, DimensionScore, QualityDimension, QualityScore, SubScore, VideoContext,
};

use crate::prompts::{quality_prompt, PreSignals, QualityPromptInput};
use crate::text::{normalize, phrases_found, truncate_chars};

/// Phrasing that reads as machine-written.
pub const LLM_SMELL_PHRASES: [&str; 19] = [
    "here's the reality",
    "let's dive in",
    "here's the thing",
    "is a game-changer",
    "game changer",
    "in today's 2024",
    "in today's 2025",
    "in today's 2026",
    "without further ado",
    "buckle up",
    "in this comprehensive",
    "we'll explore",
    "let's break it down",
    "at the end of the day",
    "it's important to note",
    "it goes without saying",
    "in the world of",
    "when it comes to",
    "look no further",
];

/// Credibility claims with no numbers behind them.
pub const VAGUE_CREDIBILITY_PHRASES: [&str; 9] = [
    "extensive testing",
    "thorough testing",
    "comprehensive testing",
    "in-depth research",
    "extensive research",
    "thorough research",
    "rigorous testing",
    "exhaustive testing",
    "meticulous testing",
];

/// Phrases that name a viewer objection.
pub const OBJECTION_PHRASES: [&str; 8] = [
    "you might be wondering",
    "some people worry",
    "a common concern is",
    "don't worry about",
    "you might think",
    "some might say",
    "a lot of people ask",
    "one concern is",
];

/// Deviation between reported and recomputed totals that gets logged.
pub const TOTAL_DEVIATION_TOLERANCE: f64 = 1.0;

const MAX_TOKENS: u32 = 3000;
const TEMPERATURE: f32 = 0.3;

/// Detect the pre-computed signals included in the prompt.
pub fn detect_signals(transcript: &str) -> PreSignals {
    let normalized = normalize(transcript);
    PreSignals {
        llm_smell: phrases_found(&LLM_SMELL_PHRASES, &normalized),
        vague_credibility: phrases_found(&VAGUE_CREDIBILITY_PHRASES, &normalized),
        objection_naming: phrases_found(&OBJECTION_PHRASES, &normalized),
    }
}

/// Scores script quality with a single model call.
#[derive(Clone)]
pub struct QualityScorer {
    llm: Arc<dyn LlmClient>,
    transcript_chars: usize,
    description_chars: usize,
}

impl QualityScorer {
    pub fn new(llm: Arc<dyn LlmClient>, transcript_chars: usize, description_chars: usize) -> Self {
        Self {
            llm,
            transcript_chars,
            description_chars,
        }
    }

    /// Score a script. Returns `None` when the call fails or the reply
    /// cannot be read.
    pub async fn score(
        &self,
        transcript: &str,
        title: &str,
        description: &str,
        duration_seconds: u32,
        context: &VideoContext,
    ) -> Option<QualityScore> {
        match self
            .try_score(transcript, title, description, duration_seconds, context)
            .await
        {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(error = %e, "Quality scoring failed");
                None
            }
        }
    }

    async fn try_score(
        &self,
        transcript: &str,
        title: &str,
        description: &str,
        duration_seconds: u32,
        context: &VideoContext,
    ) -> LlmResult<QualityScore> {
        let signals = detect_signals(transcript);
        let prompt = quality_prompt(QualityPromptInput {
            title,
            description: truncate_chars(description, self.description_chars),
            keyword: &context.main_keyword,
            silo: &context.silo,
            duration_seconds,
            transcript: truncate_chars(transcript, self.transcript_chars),
            signals: &signals,
        });

        info!(transcript_chars = transcript.chars().count(), "Scoring quality dimensions");
        let request = LlmRequest::json(prompt, MAX_TOKENS).with_temperature(TEMPERATURE);
        let reply = self.llm.complete(&request).await?;
        let parsed = parse_llm_json(&reply)?;
        let score = quality_from_json(&parsed.value)?;

        if let (Some(reported), Some(deviation)) = (score.reported_total, score.reported_deviation()) {
            if deviation > TOTAL_DEVIATION_TOLERANCE {
                warn!(
                    reported,
                    computed = score.total,
                    "Quality total mismatch, using computed value"
                );
            }
        }

        let dimension_totals: Vec<(&str, f64)> = score
            .dimensions
            .iter()
            .map(|d| (d.dimension.as_str(), d.total))
            .collect();
        info!(total = score.total, dimensions = ?dimension_totals, "Quality scored");
        Ok(score)
    }
}

/// Build a quality score from the model's JSON reply.
///
/// A reply with none of the six dimension keys is rejected. A missing
/// dimension scores zero; a missing sub-score scores zero.
pub fn quality_from_json(value: &Value) -> LlmResult<QualityScore> {
    let root = value
        .as_object()
        .ok_or_else(|| LlmError::invalid_response("quality reply is not a JSON object"))?;

    if !QualityDimension::ALL
        .iter()
        .any(|d| root.get(d.as_str()).is_some_and(Value::is_object))
    {
        return Err(LlmError::invalid_response("quality reply has no dimension scores"));
    }

    let dimensions = QualityDimension::ALL
        .iter()
        .map(|dim| match root.get(dim.as_str()).and_then(Value::as_object) {
            Some(obj) => dimension_from_json(*dim, obj),
            None => {
                warn!(dimension = dim.as_str(), "Quality reply missing dimension, scoring zero");
                DimensionScore::from_sub_scores(*dim, zero_sub_scores(*dim), BTreeMap::new())
            }
        })
        .collect();

    let action_items = root
        .get("top_3_action_items")
        .or_else(|| root.get("action_items"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(action_item_from_json).collect())
        .unwrap_or_default();

    let reported_total = root.get("quality_score_total").and_then(as_number);

    Ok(QualityScore::assemble(dimensions, action_items, reported_total))
}

fn dimension_from_json(dimension: QualityDimension, obj: &Map<String, Value>) -> DimensionScore {
    let notes = collect_notes(obj);

    let any_sub = dimension
        .sub_scores()
        .iter()
        .any(|(name, _)| obj.get(*name).and_then(as_number).is_some());

    if !any_sub {
        // Only a bare total came back.
        let total = obj
            .get("total")
            .and_then(as_number)
            .unwrap_or(0.0)
            .clamp(0.0, dimension.max_points());
        return DimensionScore {
            dimension,
            total: vscore_models::round1(total),
            sub_scores: Vec::new(),
            notes,
        };
    }

    let sub_scores = dimension
        .sub_scores()
        .iter()
        .map(|(name, max)| SubScore {
            name: name.to_string(),
            score: obj
                .get(*name)
                .and_then(as_number)
                .unwrap_or(0.0)
                .round()
                .clamp(0.0, *max),
            max: *max,
        })
        .collect();

    DimensionScore::from_sub_scores(dimension, sub_scores, notes)
}

fn zero_sub_scores(dimension: QualityDimension) -> Vec<SubScore> {
    dimension
        .sub_scores()
        .iter()
        .map(|(name, max)| SubScore {
            name: name.to_string(),
            score: 0.0,
            max: *max,
        })
        .collect()
}

/// String lists inside a dimension object, either top-level or nested
/// under `notes`.
fn collect_notes(obj: &Map<String, Value>) -> BTreeMap<String, Vec<String>> {
    let mut notes = BTreeMap::new();
    let nested = obj.get("notes").and_then(Value::as_object);
    let entries = obj.iter().chain(nested.into_iter().flatten());

    for (key, value) in entries {
        let Some(items) = value.as_array() else {
            continue;
        };
        let texts: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        if !texts.is_empty() {
            notes.insert(key.clone(), texts);
        }
    }
    notes
}

fn action_item_from_json(value: &Value) -> Option<ActionItem> {
    let obj = value.as_object()?;
    let action = obj.get("action")?.as_str()?.trim().to_string();
    if action.is_empty() {
        return None;
    }
    let text = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let priority = obj
        .get("priority")
        .and_then(as_number)
        .map(|p| p.clamp(1.0, u8::MAX as f64) as u8)
        .unwrap_or(u8::MAX);

    let detail = match text("specific_detail") {
        d if d.is_empty() => text("detail"),
        d => d,
    };

    Some(ActionItem {
        priority,
        dimension: text("dimension"),
        action,
        detail,
    })
}

/// Numbers as the model sends them: JSON numbers or numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_reply() -> Value {
        json!({
            "specificity_proof_density": {
                "total": 18, "quantified_claims": 4, "feature_benefit_cascade": 3,
                "proof_density": 4, "generic_content_ratio": 3, "llm_smell": 4,
                "examples": ["47 hours of testing"], "deductions": []
            },
            "conversion_architecture": {
                "total": 14, "cta_placement": 4, "frame_control": 3, "frame_control_level": 3,
                "decisiveness": 3, "risk_reversal": 2, "cognitive_leakage": 2,
                "cta_positions_pct": [12, 88]
            },
            "retention_architecture": {
                "total": 13, "hook_specificity": 4, "payoff_timing": 3, "chapter_quality": 2,
                "section_ordering": 2, "reveal_quality": 2
            },
            "authenticity_voice": {
                "total": 10, "personal_anecdote": 3, "personality_moments": 2,
                "natural_language": 2, "llm_voice": 2, "survivability_2030": 1
            },
            "viewer_sophistication": {
                "total": 7, "cognitive_load": 2, "funnel_depth": 2,
                "insider_knowledge": 2, "reddit_skeptic": 1
            },
            "production_standards": {
                "total": 6, "broll_references": 3, "visual_evidence": 1, "screen_hygiene": 2
            },
            "quality_score_total": 68,
            "top_3_action_items": [
                {"priority": 2, "dimension": "Retention Architecture", "action": "Rename chapters", "specific_detail": "Drop 'Introduction'"},
                {"priority": 1, "dimension": "Conversion Architecture", "action": "Add early CTA", "specific_detail": "Mention the link at 0:45"}
            ]
        })
    }

    #[test]
    fn test_detect_signals() {
        let s = detect_signals(
            "Without further ado, let\u{2019}s dive in. After extensive testing, you might be wondering why.",
        );
        assert_eq!(s.llm_smell, vec!["let's dive in", "without further ado"]);
        assert_eq!(s.vague_credibility, vec!["extensive testing"]);
        assert_eq!(s.objection_naming, vec!["you might be wondering"]);
    }

    #[test]
    fn test_parses_full_reply() {
        let score = quality_from_json(&full_reply()).unwrap();

        assert_eq!(score.total, 68.0);
        assert_eq!(score.reported_total, Some(68.0));
        let spec = score.dimension(QualityDimension::SpecificityProofDensity).unwrap();
        assert_eq!(spec.total, 18.0);
        assert_eq!(spec.sub_scores.len(), 5);
        assert_eq!(spec.notes["examples"], vec!["47 hours of testing"]);
        assert!(!spec.notes.contains_key("deductions"));

        let conv = score.dimension(QualityDimension::ConversionArchitecture).unwrap();
        assert_eq!(conv.notes["cta_positions_pct"], vec!["12", "88"]);

        assert_eq!(score.action_items.len(), 2);
        assert_eq!(score.action_items[0].priority, 1);
        assert_eq!(score.action_items[0].detail, "Mention the link at 0:45");
    }

    #[test]
    fn test_total_is_recomputed_from_sub_scores() {
        let mut reply = full_reply();
        reply["quality_score_total"] = json!(91);
        reply["specificity_proof_density"]["total"] = json!(25);

        let score = quality_from_json(&reply).unwrap();
        assert_eq!(score.total, 68.0);
        assert_eq!(score.reported_deviation(), Some(23.0));
    }

    #[test]
    fn test_sub_scores_are_clamped() {
        let mut reply = full_reply();
        reply["production_standards"]["broll_references"] = json!(9);
        reply["production_standards"]["screen_hygiene"] = json!(-2);

        let score = quality_from_json(&reply).unwrap();
        let prod = score.dimension(QualityDimension::ProductionStandards).unwrap();
        assert_eq!(prod.total, 5.0);
        assert!(score.total <= 100.0);
    }

    #[test]
    fn test_sub_scores_round_to_whole_points() {
        let mut reply = full_reply();
        reply["production_standards"]["broll_references"] = json!(3.7);
        reply["production_standards"]["visual_evidence"] = json!(2.4);
        reply["production_standards"]["screen_hygiene"] = json!("1.5");

        let score = quality_from_json(&reply).unwrap();
        let prod = score.dimension(QualityDimension::ProductionStandards).unwrap();
        let points: Vec<f64> = prod.sub_scores.iter().map(|s| s.score).collect();
        assert_eq!(points, vec![4.0, 2.0, 2.0]);
        assert_eq!(prod.total, 8.0);
    }

    #[test]
    fn test_bare_dimension_total_is_clamped() {
        let reply = json!({
            "viewer_sophistication": {"total": "14"},
            "production_standards": {"total": 6.5}
        });
        let score = quality_from_json(&reply).unwrap();
        assert_eq!(score.dimension(QualityDimension::ViewerSophistication).unwrap().total, 10.0);
        assert_eq!(score.dimension(QualityDimension::SpecificityProofDensity).unwrap().total, 0.0);
        assert_eq!(score.total, 16.5);
    }

    #[test]
    fn test_reply_without_dimensions_is_rejected() {
        assert!(quality_from_json(&json!({"quality_score_total": 70})).is_err());
        assert!(quality_from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_action_items_without_action_are_dropped() {
        let mut reply = full_reply();
        reply["top_3_action_items"] = json!([
            {"priority": 1, "dimension": "x", "action": ""},
            {"dimension": "y", "action": "Tighten hook", "detail": "Lead with the price"},
            "not an object"
        ]);
        let score = quality_from_json(&reply).unwrap();
        assert_eq!(score.action_items.len(), 1);
        assert_eq!(score.action_items[0].action, "Tighten hook");
        assert_eq!(score.action_items[0].detail, "Lead with the price");
    }
}
