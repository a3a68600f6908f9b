//! Quality dimension scoring models.
//!
//! The rubric is 100 points split across six weighted dimensions, each made
//! of named sub-scores. A dimension total is always the sum of its sub-scores
//! and the grand total is always the sum of the dimension totals.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::round1;

/// The six rubric dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QualityDimension {
    SpecificityProofDensity,
    ConversionArchitecture,
    RetentionArchitecture,
    AuthenticityVoice,
    ViewerSophistication,
    ProductionStandards,
}

impl QualityDimension {
    pub const ALL: [QualityDimension; 6] = [
        QualityDimension::SpecificityProofDensity,
        QualityDimension::ConversionArchitecture,
        QualityDimension::RetentionArchitecture,
        QualityDimension::AuthenticityVoice,
        QualityDimension::ViewerSophistication,
        QualityDimension::ProductionStandards,
    ];

    /// Key used in the LLM response and in persisted JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpecificityProofDensity => "specificity_proof_density",
            Self::ConversionArchitecture => "conversion_architecture",
            Self::RetentionArchitecture => "retention_architecture",
            Self::AuthenticityVoice => "authenticity_voice",
            Self::ViewerSophistication => "viewer_sophistication",
            Self::ProductionStandards => "production_standards",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SpecificityProofDensity => "Specificity & Proof Density",
            Self::ConversionArchitecture => "Conversion Architecture",
            Self::RetentionArchitecture => "Retention Architecture",
            Self::AuthenticityVoice => "Authenticity & Natural Voice",
            Self::ViewerSophistication => "Viewer Sophistication Respect",
            Self::ProductionStandards => "Production Standards",
        }
    }

    /// Maximum points for the dimension.
    pub fn max_points(&self) -> f64 {
        match self {
            Self::SpecificityProofDensity => 25.0,
            Self::ConversionArchitecture | Self::RetentionArchitecture => 20.0,
            Self::AuthenticityVoice => 15.0,
            Self::ViewerSophistication | Self::ProductionStandards => 10.0,
        }
    }

    /// Sub-score names and their maximum points. Maxima sum to `max_points`.
    pub fn sub_scores(&self) -> &'static [(&'static str, f64)] {
        match self {
            Self::SpecificityProofDensity => &[
                ("quantified_claims", 5.0),
                ("feature_benefit_cascade", 5.0),
                ("proof_density", 5.0),
                ("generic_content_ratio", 5.0),
                ("llm_smell", 5.0),
            ],
            Self::ConversionArchitecture => &[
                ("cta_placement", 5.0),
                ("frame_control", 5.0),
                ("decisiveness", 4.0),
                ("risk_reversal", 3.0),
                ("cognitive_leakage", 3.0),
            ],
            Self::RetentionArchitecture => &[
                ("hook_specificity", 5.0),
                ("payoff_timing", 4.0),
                ("chapter_quality", 4.0),
                ("section_ordering", 4.0),
                ("reveal_quality", 3.0),
            ],
            Self::AuthenticityVoice => &[
                ("personal_anecdote", 4.0),
                ("personality_moments", 4.0),
                ("natural_language", 3.0),
                ("llm_voice", 2.0),
                ("survivability_2030", 2.0),
            ],
            Self::ViewerSophistication => &[
                ("cognitive_load", 3.0),
                ("funnel_depth", 3.0),
                ("insider_knowledge", 2.0),
                ("reddit_skeptic", 2.0),
            ],
            Self::ProductionStandards => &[
                ("broll_references", 4.0),
                ("visual_evidence", 3.0),
                ("screen_hygiene", 3.0),
            ],
        }
    }
}

impl fmt::Display for QualityDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for QualityDimension {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s || d.display_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ModelError::UnknownDimension(s.to_string()))
    }
}

/// One named sub-score inside a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubScore {
    pub name: String,
    pub score: f64,
    pub max: f64,
}

/// Score for one rubric dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionScore {
    pub dimension: QualityDimension,
    pub total: f64,
    pub sub_scores: Vec<SubScore>,
    /// Free-text lists returned by the model (examples, deductions, flagged phrases).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub notes: BTreeMap<String, Vec<String>>,
}

impl DimensionScore {
    /// Build a dimension whose total is the sum of its sub-scores.
    pub fn from_sub_scores(
        dimension: QualityDimension,
        sub_scores: Vec<SubScore>,
        notes: BTreeMap<String, Vec<String>>,
    ) -> Self {
        let total = round1(sub_scores.iter().map(|s| s.score).sum::<f64>())
            .min(dimension.max_points());
        Self {
            dimension,
            total,
            sub_scores,
            notes,
        }
    }

    /// Sum of sub-scores (equals `total` whenever sub-scores are present).
    pub fn sub_score_sum(&self) -> f64 {
        round1(self.sub_scores.iter().map(|s| s.score).sum())
    }
}

/// Ranked improvement suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActionItem {
    pub priority: u8,
    pub dimension: String,
    pub action: String,
    #[serde(default, alias = "specific_detail")]
    pub detail: String,
}

/// Full quality score: six dimensions, grand total, up to three action items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityScore {
    /// Grand total (0-100), always the sum of dimension totals.
    pub total: f64,
    pub dimensions: Vec<DimensionScore>,
    pub action_items: Vec<ActionItem>,
    /// Total the model reported, kept for audit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_total: Option<f64>,
}

/// Maximum number of action items kept on a quality score.
pub const MAX_ACTION_ITEMS: usize = 3;

impl QualityScore {
    /// Assemble a quality score, recomputing the total from the dimensions.
    pub fn assemble(
        dimensions: Vec<DimensionScore>,
        mut action_items: Vec<ActionItem>,
        reported_total: Option<f64>,
    ) -> Self {
        let total = round1(dimensions.iter().map(|d| d.total).sum::<f64>()).clamp(0.0, 100.0);
        action_items.sort_by_key(|a| a.priority);
        action_items.truncate(MAX_ACTION_ITEMS);
        Self {
            total,
            dimensions,
            action_items,
            reported_total,
        }
    }

    pub fn dimension(&self, dimension: QualityDimension) -> Option<&DimensionScore> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    /// Absolute gap between the model's reported total and the recomputed one.
    pub fn reported_deviation(&self) -> Option<f64> {
        self.reported_total.map(|r| (r - self.total).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_marks(dimension: QualityDimension) -> DimensionScore {
        let subs = dimension
            .sub_scores()
            .iter()
            .map(|(name, max)| SubScore {
                name: name.to_string(),
                score: *max,
                max: *max,
            })
            .collect();
        DimensionScore::from_sub_scores(dimension, subs, BTreeMap::new())
    }

    #[test]
    fn test_sub_score_maxima_sum_to_dimension_max() {
        for d in QualityDimension::ALL {
            let sum: f64 = d.sub_scores().iter().map(|(_, m)| m).sum();
            assert_eq!(sum, d.max_points(), "{}", d.as_str());
        }
    }

    #[test]
    fn test_dimension_maxima_sum_to_100() {
        let sum: f64 = QualityDimension::ALL.iter().map(|d| d.max_points()).sum();
        assert_eq!(sum, 100.0);
    }

    #[test]
    fn test_assemble_recomputes_total() {
        let dims: Vec<_> = QualityDimension::ALL.into_iter().map(full_marks).collect();
        let score = QualityScore::assemble(dims, vec![], Some(87.0));
        assert_eq!(score.total, 100.0);
        assert_eq!(score.reported_deviation(), Some(13.0));
    }

    #[test]
    fn test_action_items_sorted_and_capped() {
        let item = |p: u8| ActionItem {
            priority: p,
            dimension: "Retention Architecture".into(),
            action: format!("fix {}", p),
            detail: String::new(),
        };
        let score = QualityScore::assemble(vec![], vec![item(4), item(2), item(1), item(3)], None);
        let priorities: Vec<_> = score.action_items.iter().map(|a| a.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3]);
    }

    #[test]
    fn test_action_item_accepts_specific_detail_alias() {
        let item: ActionItem = serde_json::from_str(
            r#"{"priority":1,"dimension":"x","action":"y","specific_detail":"z"}"#,
        )
        .unwrap();
        assert_eq!(item.detail, "z");
    }
}
