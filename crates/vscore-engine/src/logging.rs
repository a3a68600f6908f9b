//! Structured run logging.
//!
//! Every scoring run logs with the same `run_id` / `video_id` fields so a
//! single run can be followed across the concurrent scorers.

use tracing::{error, info, warn, Span};
use uuid::Uuid;
use vscore_models::VideoId;

/// Run-scoped logger for one scoring invocation.
#[derive(Debug, Clone)]
pub struct ScoringLogger {
    run_id: String,
    video_id: String,
}

impl ScoringLogger {
    pub fn new(run_id: Uuid, video_id: &VideoId) -> Self {
        Self {
            run_id: run_id.to_string(),
            video_id: video_id.to_string(),
        }
    }

    /// Log the start of a run.
    pub fn log_start(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            "Scoring started: {}", message
        );
    }

    /// Log entry into a pipeline stage.
    pub fn log_stage(&self, stage: &str, message: &str) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            stage = stage,
            "Scoring progress: {}", message
        );
    }

    /// Log a degraded component. The run continues.
    pub fn log_warning(&self, stage: &str, message: &str) {
        warn!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            stage = stage,
            "Scoring warning: {}", message
        );
    }

    pub fn log_error(&self, stage: &str, message: &str) {
        error!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            stage = stage,
            "Scoring error: {}", message
        );
    }

    /// Log the completion of a run.
    pub fn log_completion(&self, message: &str) {
        info!(
            run_id = %self.run_id,
            video_id = %self.video_id,
            "Scoring completed: {}", message
        );
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// Span covering the whole run.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "score_video",
            run_id = %self.run_id,
            video_id = %self.video_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_carries_ids() {
        let run_id = Uuid::new_v4();
        let logger = ScoringLogger::new(run_id, &VideoId::from("vid-1"));

        assert_eq!(logger.run_id(), run_id.to_string());
        assert_eq!(logger.video_id(), "vid-1");
    }
}
