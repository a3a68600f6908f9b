//! Scoring pipeline orchestration.
//!
//! The pipeline is the only component that talks to collaborators. It
//! resolves the video context and brand mapping, runs gates, quality and
//! rizz concurrently, applies the context multiplier and appends one
//! immutable [`ScoreRecord`] to the store.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;
use vscore_llm::LlmClient;
use vscore_models::{
    ContextMultiplierResult, GateCheckResult, RizzScore, ScoreRecord, ScoreRecordParts, VideoContext,
    VideoId,
};

use crate::collaborators::{BrandCatalog, ScoreStore, VideoFacts};
use crate::config::ScoringConfig;
use crate::error::{ScoringError, ScoringResult};
use crate::gates::{BrandLookup, GateChecker, GateInputs, UNAVAILABLE_REASON};
use crate::logging::ScoringLogger;
use crate::metrics;
use crate::multiplier::{self, MultiplierInputs};
use crate::quality::QualityScorer;
use crate::rizz::{RizzScorer, VocalParams};

/// Scores videos end to end.
#[derive(Clone)]
pub struct ScoringPipeline {
    config: ScoringConfig,
    llm: Arc<dyn LlmClient>,
    facts: Arc<dyn VideoFacts>,
    brands: Arc<dyn BrandCatalog>,
    store: Arc<dyn ScoreStore>,
    gates: GateChecker,
    quality: QualityScorer,
    rizz: RizzScorer,
}

impl ScoringPipeline {
    pub fn new(
        config: ScoringConfig,
        llm: Arc<dyn LlmClient>,
        facts: Arc<dyn VideoFacts>,
        brands: Arc<dyn BrandCatalog>,
        store: Arc<dyn ScoreStore>,
    ) -> Self {
        let gates = GateChecker::new(
            llm.clone(),
            config.ai_gates_fail_open,
            config.gate_transcript_chars,
            config.sibling_transcript_chars,
        );
        let quality = QualityScorer::new(
            llm.clone(),
            config.quality_transcript_chars,
            config.description_chars,
        );
        let rizz = RizzScorer::new(
            llm.clone(),
            VocalParams {
                calibration_max: config.conviction_calibration_max,
                words_per_minute: config.words_per_minute,
            },
            config.gate_transcript_chars,
        );

        Self {
            config,
            llm,
            facts,
            brands,
            store,
            gates,
            quality,
            rizz,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score one video and append the record to the store.
    ///
    /// Only a missing video or an empty transcript is an error. Every other
    /// failure degrades the affected component and is logged. A record that
    /// could not be persisted is still returned.
    pub async fn score_video(
        &self,
        video_id: &VideoId,
        transcript: &str,
        title: &str,
        description: &str,
        duration_seconds: u32,
    ) -> ScoringResult<ScoreRecord> {
        let run_id = Uuid::new_v4();
        let logger = ScoringLogger::new(run_id, video_id);
        let span = logger.create_span();
        let started = Instant::now();

        let result = self
            .run(run_id, &logger, video_id, transcript, title, description, duration_seconds)
            .instrument(span)
            .await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(ScoringError::VideoNotFound(_)) => "video_not_found",
            Err(ScoringError::TranscriptMissing(_)) => "transcript_missing",
            Err(_) => "error",
        };
        metrics::record_run(outcome, started.elapsed().as_secs_f64());
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        run_id: Uuid,
        logger: &ScoringLogger,
        video_id: &VideoId,
        transcript: &str,
        title: &str,
        description: &str,
        duration_seconds: u32,
    ) -> ScoringResult<ScoreRecord> {
        logger.log_start(&format!(
            "transcript={} chars, duration={}s",
            transcript.chars().count(),
            duration_seconds
        ));

        if video_id.is_blank() {
            logger.log_error("input", "video id is blank");
            return Err(ScoringError::VideoNotFound(video_id.clone()));
        }
        if transcript.trim().is_empty() {
            logger.log_error("input", "transcript is empty");
            return Err(ScoringError::TranscriptMissing(video_id.clone()));
        }

        logger.log_stage("context", "Fetching video context");
        let context = self.fetch_context(logger, video_id).await?;
        let brand = self.lookup_brand(logger, &context).await;

        logger.log_stage("score", "Running gates, quality and rizz");
        let (gate_results, quality, rizz) = tokio::join!(
            self.run_gates(logger, video_id, transcript, title, description, &context, &brand),
            self.quality
                .score(transcript, title, description, duration_seconds, &context),
            self.run_rizz(logger, video_id, transcript, duration_seconds),
        );

        if quality.is_none() {
            logger.log_warning("quality", "Quality score unavailable");
            metrics::record_degradation("quality");
        }
        if !rizz.copy.personality_available {
            logger.log_warning("rizz", "Personality density fell back to the neutral score");
            metrics::record_degradation("personality");
        }

        logger.log_stage("multiplier", "Computing context multiplier");
        let multiplier = self
            .compute_multiplier(logger, video_id, &context, &brand)
            .await;

        let record = ScoreRecord::assemble(ScoreRecordParts {
            run_id,
            video_id: video_id.clone(),
            scored_at: Utc::now(),
            scoring_version: self.config.scoring_version.clone(),
            model_used: Some(self.llm.model_name().to_string()),
            transcript_length: transcript.chars().count(),
            gate_results,
            quality,
            multiplier,
            rizz,
        });

        for gate in record.failed_gates() {
            metrics::record_gate_failure(gate.gate_name.as_str());
        }

        logger.log_stage("persist", "Persisting score record");
        if let Err(e) = self.store.persist(&record).await {
            logger.log_error("persist", &format!("Failed to persist score record: {}", e));
            metrics::record_persist_failure();
        }

        logger.log_completion(&format!(
            "quality={:?}, multiplied={:?}, rizz={}, gates={}",
            record.quality.as_ref().map(|q| q.total),
            record.multiplied_score,
            record.rizz.score,
            if record.all_gates_passed { "PASS" } else { "FAIL" }
        ));
        Ok(record)
    }

    /// Current record for a video.
    pub async fn latest(&self, video_id: &VideoId) -> ScoringResult<Option<ScoreRecord>> {
        self.store.get_latest(video_id).await
    }

    /// Current record for every video, best multiplied score first.
    pub async fn leaderboard(&self) -> ScoringResult<Vec<ScoreRecord>> {
        self.store.list_latest_all().await
    }

    pub async fn history(&self, video_id: &VideoId) -> ScoringResult<Vec<ScoreRecord>> {
        self.store.history(video_id).await
    }

    async fn fetch_context(
        &self,
        logger: &ScoringLogger,
        video_id: &VideoId,
    ) -> ScoringResult<VideoContext> {
        match self.facts.get_video_context(video_id).await {
            Ok(Some(context)) => Ok(context),
            Ok(None) => {
                logger.log_error("context", "video not found");
                Err(ScoringError::VideoNotFound(video_id.clone()))
            }
            Err(e) => {
                logger.log_warning("context", &format!("Context lookup failed, scoring without it: {}", e));
                metrics::record_degradation("context");
                Ok(VideoContext::default())
            }
        }
    }

    async fn lookup_brand(&self, logger: &ScoringLogger, context: &VideoContext) -> BrandLookup {
        if !context.has_silo() {
            return BrandLookup::NoSilo;
        }
        match self.brands.get_approved_brand(&context.silo).await {
            Ok(Some(brand)) => BrandLookup::Found(brand),
            Ok(None) => BrandLookup::NotConfigured,
            Err(e) => {
                logger.log_warning("context", &format!("Approved brand lookup failed: {}", e));
                metrics::record_degradation("brand_lookup");
                BrandLookup::Unavailable
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_gates(
        &self,
        logger: &ScoringLogger,
        video_id: &VideoId,
        transcript: &str,
        title: &str,
        description: &str,
        context: &VideoContext,
        brand: &BrandLookup,
    ) -> Vec<GateCheckResult> {
        let partners = match self.brands.get_active_partners().await {
            Ok(partners) => partners,
            Err(e) => {
                logger.log_warning("gates", &format!("Partner list unavailable: {}", e));
                Vec::new()
            }
        };

        let siblings = if context.has_keyword() {
            match self
                .facts
                .get_sibling_transcripts(video_id, &context.main_keyword, self.config.sibling_limit)
                .await
            {
                Ok(mut siblings) => {
                    siblings.truncate(self.config.sibling_limit);
                    siblings
                }
                Err(e) => {
                    logger.log_warning("gates", &format!("Sibling transcripts unavailable: {}", e));
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let results = self
            .gates
            .run(GateInputs {
                transcript,
                title,
                description,
                context,
                brand,
                partners: &partners,
                siblings: &siblings,
            })
            .await;

        if results.iter().any(|g| g.failure_reason == UNAVAILABLE_REASON) {
            metrics::record_degradation("ai_gates");
        }
        results
    }

    async fn run_rizz(
        &self,
        logger: &ScoringLogger,
        video_id: &VideoId,
        transcript: &str,
        duration_seconds: u32,
    ) -> RizzScore {
        let segments = match self.facts.get_emotion_segments(video_id).await {
            Ok(segments) => segments,
            Err(e) => {
                logger.log_warning("rizz", &format!("Emotion segments unavailable: {}", e));
                None
            }
        };
        self.rizz
            .score(transcript, segments.as_deref(), duration_seconds)
            .await
    }

    async fn compute_multiplier(
        &self,
        logger: &ScoringLogger,
        video_id: &VideoId,
        context: &VideoContext,
        brand: &BrandLookup,
    ) -> ContextMultiplierResult {
        let has_approved_brand = brand.is_found();
        let has_revenue = if multiplier::needs_revenue_lookup(context, has_approved_brand) {
            match self.facts.has_revenue_history(video_id).await {
                Ok(has) => has,
                Err(e) => {
                    logger.log_warning("multiplier", &format!("Revenue lookup failed, assuming none: {}", e));
                    false
                }
            }
        } else {
            false
        };

        multiplier::compute(&MultiplierInputs {
            context,
            has_approved_brand,
            has_revenue,
        })
    }
}
