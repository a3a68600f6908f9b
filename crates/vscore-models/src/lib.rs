//! Shared data models for the script scoring pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Gate check results
//! - Quality dimension scores and action items
//! - Context multiplier buckets
//! - Rizz (charisma) scores
//! - The append-only score record that aggregates all of the above
//! - Read-only context objects supplied by external collaborators

pub mod context;
pub mod error;
pub mod gate;
pub mod multiplier;
pub mod quality;
pub mod record;
pub mod rizz;
pub mod video;

// Re-export common types
pub use context::{
    ApprovedBrand, EmotionScore, EmotionSegment, SiblingTranscript, VideoContext,
};
pub use error::{ModelError, ModelResult};
pub use gate::{GateCheckResult, GateName};
pub use multiplier::{ContextMultiplierResult, KeywordTier, MultiplierBucket};
pub use quality::{ActionItem, DimensionScore, QualityDimension, QualityScore, SubScore};
pub use record::{latest_per_video, ScoreRecord, ScoreRecordParts};
pub use rizz::{CopyDetail, PersonalityMoment, RizzScore, VocalDetail};
pub use video::VideoId;

/// Round to one decimal place, the precision every persisted score uses.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round1() {
        assert_eq!(round1(72.25), 72.3);
        assert_eq!(round1(0.04), 0.0);
        assert_eq!(round1(59.99), 60.0);
    }
}
