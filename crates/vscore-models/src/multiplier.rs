//! Context multiplier models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// Keyword tier derived from silo assignment and brand mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KeywordTier {
    /// Silo with an approved affiliate brand.
    Tier1,
    /// Silo without a brand mapping.
    Tier2,
    /// No silo assigned.
    AiSkeleton,
}

impl KeywordTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tier1 => "tier1",
            Self::Tier2 => "tier2",
            Self::AiSkeleton => "ai_skeleton",
        }
    }
}

impl fmt::Display for KeywordTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeywordTier {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tier1" => Ok(Self::Tier1),
            "tier2" => Ok(Self::Tier2),
            "ai_skeleton" => Ok(Self::AiSkeleton),
            other => Err(ModelError::UnknownTier(other.to_string())),
        }
    }
}

/// The five multiplier buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierBucket {
    Tier1LowDom,
    Tier1HighDom,
    Tier2Proven,
    Tier2Unproven,
    AiSkeleton,
}

impl MultiplierBucket {
    pub const ALL: [MultiplierBucket; 5] = [
        MultiplierBucket::Tier1LowDom,
        MultiplierBucket::Tier1HighDom,
        MultiplierBucket::Tier2Proven,
        MultiplierBucket::Tier2Unproven,
        MultiplierBucket::AiSkeleton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tier1LowDom => "tier1_low_dom",
            Self::Tier1HighDom => "tier1_high_dom",
            Self::Tier2Proven => "tier2_proven",
            Self::Tier2Unproven => "tier2_unproven",
            Self::AiSkeleton => "ai_skeleton",
        }
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Tier1LowDom => 1.5,
            Self::Tier1HighDom => 1.0,
            Self::Tier2Proven => 1.2,
            Self::Tier2Unproven => 0.8,
            Self::AiSkeleton => 0.5,
        }
    }

    /// Minimum quality total expected for content in this bucket.
    pub fn quality_floor(&self) -> u32 {
        match self {
            Self::Tier1LowDom => 80,
            Self::Tier1HighDom | Self::Tier2Proven => 70,
            Self::Tier2Unproven => 60,
            Self::AiSkeleton => 50,
        }
    }

    pub fn tier(&self) -> KeywordTier {
        match self {
            Self::Tier1LowDom | Self::Tier1HighDom => KeywordTier::Tier1,
            Self::Tier2Proven | Self::Tier2Unproven => KeywordTier::Tier2,
            Self::AiSkeleton => KeywordTier::AiSkeleton,
        }
    }
}

impl fmt::Display for MultiplierBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MultiplierBucket {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| ModelError::UnknownBucket(s.to_string()))
    }
}

/// Result of the context multiplier lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextMultiplierResult {
    pub keyword_tier: KeywordTier,
    pub domination_score: Option<f64>,
    #[serde(default)]
    pub avg_domination_score: Option<f64>,
    pub multiplier: f64,
    pub quality_floor: u32,
    pub bucket: MultiplierBucket,
}

impl ContextMultiplierResult {
    /// Build from a bucket; multiplier, floor and tier always follow the bucket.
    pub fn from_bucket(
        bucket: MultiplierBucket,
        domination_score: Option<f64>,
        avg_domination_score: Option<f64>,
    ) -> Self {
        Self {
            keyword_tier: bucket.tier(),
            domination_score,
            avg_domination_score,
            multiplier: bucket.multiplier(),
            quality_floor: bucket.quality_floor(),
            bucket,
        }
    }
}
