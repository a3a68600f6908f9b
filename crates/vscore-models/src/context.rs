//! Read-only context supplied by external collaborators.
//!
//! These types are consumed by the scorers but never owned or persisted by
//! the pipeline itself.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Warehouse facts about a video's keyword targeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoContext {
    /// Content silo (category). Empty when the video has no assignment.
    #[serde(default)]
    pub silo: String,
    /// Target parent keyword. Empty when none is assigned.
    #[serde(default)]
    pub main_keyword: String,
    /// Latest domination percentage for the keyword (0-100).
    #[serde(default)]
    pub domination_score: Option<f64>,
    /// Average domination percentage over the tracked history.
    #[serde(default)]
    pub avg_domination_score: Option<f64>,
}

impl VideoContext {
    pub fn has_silo(&self) -> bool {
        !self.silo.trim().is_empty()
    }

    pub fn has_keyword(&self) -> bool {
        !self.main_keyword.trim().is_empty()
    }
}

/// Approved affiliate brand mapping for a silo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ApprovedBrand {
    pub silo: String,
    pub primary_brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_brand: Option<String>,
}

/// Transcript of another video targeting the same keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SiblingTranscript {
    pub video_title: String,
    pub transcript: String,
}

/// A single emotion reading inside a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionScore {
    pub emotion: String,
    pub score: f64,
}

/// A time-bounded window of vocal emotion readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionSegment {
    /// Segment start (seconds)
    pub start: f64,
    /// Segment end (seconds)
    pub end: f64,
    /// Highest scoring emotions in this window.
    #[serde(default)]
    pub top_emotions: Vec<EmotionScore>,
}

impl EmotionSegment {
    /// Sum of scores for emotions in `names` (exact, case-sensitive match).
    pub fn summed_score(&self, names: &[&str]) -> f64 {
        self.top_emotions
            .iter()
            .filter(|e| names.contains(&e.emotion.as_str()))
            .map(|e| e.score)
            .sum()
    }
}
