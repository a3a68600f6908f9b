//! Charisma ("rizz") score models.
//!
//! Vocal delivery contributes 60% and copy 40%. Each half is made of
//! sub-metrics whose raw values are kept next to their scores so a reviewer
//! can see what drove a number.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Weight of the vocal half.
pub const VOCAL_WEIGHT: f64 = 0.6;
/// Weight of the copy half.
pub const COPY_WEIGHT: f64 = 0.4;

/// Vocal delivery breakdown. Every `*_score` field is 0-20.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VocalDetail {
    /// False when no emotion segments were available.
    pub available: bool,
    /// Raw vocal total (0-100).
    pub total_raw: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conviction_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conviction_consistency: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_std_dev: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_conviction_delta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_delta: Option<f64>,

    pub filler_density_score: f64,
    pub filler_count: usize,
    pub fillers_per_min: f64,

    pub pacing_variation_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing_cv: Option<f64>,
}

/// A quoted personality moment found by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PersonalityMoment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub timestamp_hint: String,
}

/// Copy (script) breakdown. Every sub-metric score is 0-25.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CopyDetail {
    /// Raw copy total (0-100).
    pub total_raw: f64,

    pub personality_density: f64,
    /// False when the personality call failed and the neutral score was used.
    pub personality_available: bool,
    pub personality_moments: usize,
    pub personality_per_minute: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_moments: Vec<PersonalityMoment>,

    pub sentence_variation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence_cv: Option<f64>,
    pub sentence_count: usize,

    pub decisive_language: f64,
    pub decisive_count: usize,
    pub hedging_count: usize,
    pub decisive_ratio: f64,

    pub first_person_experience: f64,
    pub first_person_count: usize,
    pub generic_count: usize,
    pub first_person_ratio: f64,
}

/// Final charisma score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RizzScore {
    /// 0-100, equal to `vocal_weighted + copy_weighted`.
    pub score: f64,
    /// 0-60
    pub vocal_weighted: f64,
    /// 0-40
    pub copy_weighted: f64,
    pub vocal: VocalDetail,
    pub copy: CopyDetail,
    pub vocal_available: bool,
}

impl RizzScore {
    /// Combine the two halves, applying the fixed weights and rounding.
    pub fn combine(vocal: VocalDetail, copy: CopyDetail) -> Self {
        let vocal_weighted = crate::round1(vocal.total_raw * VOCAL_WEIGHT);
        let copy_weighted = crate::round1(copy.total_raw * COPY_WEIGHT);
        Self {
            score: crate::round1(vocal_weighted + copy_weighted),
            vocal_weighted,
            copy_weighted,
            vocal_available: vocal.available,
            vocal,
            copy,
        }
    }
}
