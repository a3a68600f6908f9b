//! Seams to the systems the pipeline reads from and writes to.
//!
//! The orchestrator is the only caller of these traits. Scorers receive
//! already-resolved values so they stay testable without any collaborator.

use async_trait::async_trait;
use vscore_models::{
    ApprovedBrand, EmotionSegment, ScoreRecord, SiblingTranscript, VideoContext, VideoId,
};

use crate::error::ScoringResult;

/// Read-only warehouse facts about videos.
#[async_trait]
pub trait VideoFacts: Send + Sync {
    /// Keyword targeting for a video. `Ok(None)` means the video is unknown.
    async fn get_video_context(&self, video_id: &VideoId) -> ScoringResult<Option<VideoContext>>;

    /// Transcripts of other videos targeting `keyword`, excluding `video_id`.
    async fn get_sibling_transcripts(
        &self,
        video_id: &VideoId,
        keyword: &str,
        limit: usize,
    ) -> ScoringResult<Vec<SiblingTranscript>>;

    /// Whether the video has ever produced affiliate revenue.
    async fn has_revenue_history(&self, video_id: &VideoId) -> ScoringResult<bool>;

    /// Vocal emotion segments, if emotion extraction ran for this video.
    async fn get_emotion_segments(
        &self,
        video_id: &VideoId,
    ) -> ScoringResult<Option<Vec<EmotionSegment>>>;
}

/// Approved brands per silo and the active partner list.
#[async_trait]
pub trait BrandCatalog: Send + Sync {
    async fn get_approved_brand(&self, silo: &str) -> ScoringResult<Option<ApprovedBrand>>;

    async fn get_active_partners(&self) -> ScoringResult<Vec<String>>;
}

/// Append-only sink for score records.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Append a record. Records are never updated in place.
    async fn persist(&self, record: &ScoreRecord) -> ScoringResult<()>;

    /// Most recent record for a video.
    async fn get_latest(&self, video_id: &VideoId) -> ScoringResult<Option<ScoreRecord>>;

    /// Current record per video, highest multiplied score first, unscored last.
    async fn list_latest_all(&self) -> ScoringResult<Vec<ScoreRecord>>;

    /// Every record for a video, newest first.
    async fn history(&self, video_id: &VideoId) -> ScoringResult<Vec<ScoreRecord>>;
}
