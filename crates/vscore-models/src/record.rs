//! The score record aggregate.
//!
//! A `ScoreRecord` is immutable once assembled. Derived fields are computed
//! exactly once in [`ScoreRecord::assemble`] and have no setters.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gate::GateCheckResult;
use crate::multiplier::ContextMultiplierResult;
use crate::quality::QualityScore;
use crate::rizz::RizzScore;
use crate::video::VideoId;

/// Inputs for assembling a record.
#[derive(Debug, Clone)]
pub struct ScoreRecordParts {
    pub run_id: Uuid,
    pub video_id: VideoId,
    pub scored_at: DateTime<Utc>,
    pub scoring_version: String,
    pub model_used: Option<String>,
    pub transcript_length: usize,
    pub gate_results: Vec<GateCheckResult>,
    pub quality: Option<QualityScore>,
    pub multiplier: ContextMultiplierResult,
    pub rizz: RizzScore,
}

/// One scoring run for one video. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoreRecord {
    pub run_id: Uuid,
    pub video_id: VideoId,
    pub scored_at: DateTime<Utc>,
    pub scoring_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub transcript_length: usize,

    pub gate_results: Vec<GateCheckResult>,
    pub gates_passed: usize,
    pub all_gates_passed: bool,

    pub quality: Option<QualityScore>,
    pub multiplier: ContextMultiplierResult,
    /// `round1(quality.total * multiplier)`, absent without a quality score.
    pub multiplied_score: Option<f64>,
    /// `quality.total >= quality_floor`, absent without a quality score.
    pub passes_quality_floor: Option<bool>,

    pub rizz: RizzScore,
}

impl ScoreRecord {
    pub fn assemble(parts: ScoreRecordParts) -> Self {
        let gates_passed = parts.gate_results.iter().filter(|g| g.passed).count();
        let all_gates_passed =
            gates_passed == parts.gate_results.len() && parts.gate_results.len() == 6;

        let multiplied_score = parts
            .quality
            .as_ref()
            .map(|q| crate::round1(q.total * parts.multiplier.multiplier));
        let passes_quality_floor = parts
            .quality
            .as_ref()
            .map(|q| q.total >= f64::from(parts.multiplier.quality_floor));

        Self {
            run_id: parts.run_id,
            video_id: parts.video_id,
            scored_at: parts.scored_at,
            scoring_version: parts.scoring_version,
            model_used: parts.model_used,
            transcript_length: parts.transcript_length,
            gate_results: parts.gate_results,
            gates_passed,
            all_gates_passed,
            quality: parts.quality,
            multiplier: parts.multiplier,
            multiplied_score,
            passes_quality_floor,
            rizz: parts.rizz,
        }
    }

    /// Gate results that did not pass.
    pub fn failed_gates(&self) -> impl Iterator<Item = &GateCheckResult> {
        self.gate_results.iter().filter(|g| !g.passed)
    }
}

/// Reduce a set of records to the current one per video (max `scored_at`),
/// ordered by `multiplied_score` descending with unscored records last.
pub fn latest_per_video(records: impl IntoIterator<Item = ScoreRecord>) -> Vec<ScoreRecord> {
    let mut latest: HashMap<VideoId, ScoreRecord> = HashMap::new();
    for record in records {
        match latest.get(&record.video_id) {
            Some(existing) if existing.scored_at >= record.scored_at => {}
            _ => {
                latest.insert(record.video_id.clone(), record);
            }
        }
    }

    let mut out: Vec<ScoreRecord> = latest.into_values().collect();
    out.sort_by(|a, b| match (a.multiplied_score, b.multiplied_score) {
        (Some(x), Some(y)) => y
            .partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.video_id.cmp(&b.video_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.video_id.cmp(&b.video_id),
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateName;
    use crate::multiplier::MultiplierBucket;
    use crate::rizz::{CopyDetail, VocalDetail};

    fn parts(quality_total: Option<f64>, failing: usize) -> ScoreRecordParts {
        let gate_results = GateName::ALL
            .iter()
            .enumerate()
            .map(|(i, g)| {
                if i < failing {
                    GateCheckResult::fail(*g, "nope")
                } else {
                    GateCheckResult::pass(*g)
                }
            })
            .collect();
        ScoreRecordParts {
            run_id: Uuid::new_v4(),
            video_id: VideoId::from("vid1"),
            scored_at: Utc::now(),
            scoring_version: "v1".into(),
            model_used: None,
            transcript_length: 100,
            gate_results,
            quality: quality_total.map(|t| QualityScore {
                total: t,
                dimensions: vec![],
                action_items: vec![],
                reported_total: None,
            }),
            multiplier: ContextMultiplierResult::from_bucket(
                MultiplierBucket::Tier1LowDom,
                Some(40.0),
                None,
            ),
            rizz: RizzScore::combine(VocalDetail::default(), CopyDetail::default()),
        }
    }

    #[test]
    fn test_all_gates_passed_matches_count() {
        let record = ScoreRecord::assemble(parts(Some(70.0), 0));
        assert!(record.all_gates_passed);
        assert_eq!(record.gates_passed, 6);

        let record = ScoreRecord::assemble(parts(Some(70.0), 2));
        assert!(!record.all_gates_passed);
        assert_eq!(record.gates_passed, 4);
        assert_eq!(record.failed_gates().count(), 2);
    }

    #[test]
    fn test_multiplied_score_and_floor() {
        let record = ScoreRecord::assemble(parts(Some(60.0), 0));
        assert_eq!(record.multiplied_score, Some(90.0));
        assert_eq!(record.passes_quality_floor, Some(false));

        let record = ScoreRecord::assemble(parts(Some(80.0), 0));
        assert_eq!(record.passes_quality_floor, Some(true));
    }

    #[test]
    fn test_missing_quality_leaves_derived_fields_empty() {
        let record = ScoreRecord::assemble(parts(None, 0));
        assert!(record.multiplied_score.is_none());
        assert!(record.passes_quality_floor.is_none());
    }

    #[test]
    fn test_latest_per_video_orders_by_multiplied_score() {
        let at = |video: &str, secs: i64, total: Option<f64>| {
            let mut p = parts(total, 0);
            p.video_id = VideoId::from(video);
            p.scored_at = DateTime::from_timestamp(secs, 0).unwrap();
            ScoreRecord::assemble(p)
        };

        let records = vec![
            at("a", 100, Some(40.0)),
            at("a", 200, Some(60.0)),
            at("b", 150, Some(50.0)),
            at("c", 300, None),
            at("b", 50, Some(90.0)),
        ];

        let latest = latest_per_video(records);
        let order: Vec<_> = latest.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert_eq!(latest[0].multiplied_score, Some(90.0));
        assert_eq!(latest[1].scored_at.timestamp(), 150);
    }

    #[test]
    fn test_record_serializes_round_trip() {
        let record = ScoreRecord::assemble(parts(Some(55.5), 1));
        let json = serde_json::to_string(&record).unwrap();
        let back: ScoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run_id, record.run_id);
        assert_eq!(back.gates_passed, 5);
        assert_eq!(back.multiplier.bucket, MultiplierBucket::Tier1LowDom);
    }
}
