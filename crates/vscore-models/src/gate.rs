//! Gate check models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The six fixed gate checks, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GateName {
    BrandAlignment,
    SeoTitleCompliance,
    PartnerSafety,
    CrossVideoCoherence,
    FunnelMatch,
    FactualAccuracy,
}

impl GateName {
    /// All gates in evaluation order.
    pub const ALL: [GateName; 6] = [
        GateName::BrandAlignment,
        GateName::SeoTitleCompliance,
        GateName::PartnerSafety,
        GateName::CrossVideoCoherence,
        GateName::FunnelMatch,
        GateName::FactualAccuracy,
    ];

    /// Gates evaluated by the single LLM call.
    pub const AI_ASSISTED: [GateName; 4] = [
        GateName::PartnerSafety,
        GateName::CrossVideoCoherence,
        GateName::FunnelMatch,
        GateName::FactualAccuracy,
    ];

    /// Machine key (also the key used in the LLM response).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BrandAlignment => "brand_alignment",
            Self::SeoTitleCompliance => "seo_title_compliance",
            Self::PartnerSafety => "partner_safety",
            Self::CrossVideoCoherence => "cross_video_coherence",
            Self::FunnelMatch => "funnel_match",
            Self::FactualAccuracy => "factual_accuracy",
        }
    }

    /// Human-readable label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BrandAlignment => "Brand Alignment",
            Self::SeoTitleCompliance => "SEO Title Compliance",
            Self::PartnerSafety => "Partner Safety",
            Self::CrossVideoCoherence => "Cross-Video Coherence",
            Self::FunnelMatch => "Funnel Match",
            Self::FactualAccuracy => "Factual Accuracy",
        }
    }

    pub fn is_ai_assisted(&self) -> bool {
        Self::AI_ASSISTED.contains(self)
    }
}

impl fmt::Display for GateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for GateName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s || g.display_name() == s)
            .ok_or_else(|| ModelError::UnknownGate(s.to_string()))
    }
}

/// Outcome of one gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GateCheckResult {
    pub gate_name: GateName,
    pub passed: bool,
    /// Failure (or warning / skip) reason. Empty on a clean pass.
    #[serde(default)]
    pub failure_reason: String,
    /// Claims needing manual verification (Factual Accuracy only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims_to_verify: Vec<String>,
}

impl GateCheckResult {
    /// Clean pass.
    pub fn pass(gate_name: GateName) -> Self {
        Self {
            gate_name,
            passed: true,
            failure_reason: String::new(),
            claims_to_verify: Vec::new(),
        }
    }

    /// Pass with an attached note (skip or warning).
    pub fn pass_with_note(gate_name: GateName, note: impl Into<String>) -> Self {
        Self {
            failure_reason: note.into(),
            ..Self::pass(gate_name)
        }
    }

    /// Failure with reason.
    pub fn fail(gate_name: GateName, reason: impl Into<String>) -> Self {
        Self {
            gate_name,
            passed: false,
            failure_reason: reason.into(),
            claims_to_verify: Vec::new(),
        }
    }

    /// Attach claims to verify.
    pub fn with_claims(mut self, claims: Vec<String>) -> Self {
        self.claims_to_verify = claims;
        self
    }
}
