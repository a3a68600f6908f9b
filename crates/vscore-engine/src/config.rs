//! Scoring configuration.

/// Scoring configuration.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Version tag stamped on every record
    pub scoring_version: String,
    /// Pass the AI-assisted gates when the model call fails
    pub ai_gates_fail_open: bool,
    /// Mean confidence that maps to full conviction points
    pub conviction_calibration_max: f64,
    /// Transcript chars sent to the gate and personality prompts
    pub gate_transcript_chars: usize,
    /// Transcript chars sent to the quality prompt
    pub quality_transcript_chars: usize,
    /// Description chars sent to the quality prompt
    pub description_chars: usize,
    /// Chars kept from each sibling transcript
    pub sibling_transcript_chars: usize,
    /// Maximum sibling transcripts for the coherence gate
    pub sibling_limit: usize,
    /// Speaking rate used when the duration is unknown
    pub words_per_minute: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            scoring_version: "1.0".to_string(),
            ai_gates_fail_open: true,
            conviction_calibration_max: 0.5,
            gate_transcript_chars: 10_000,
            quality_transcript_chars: 15_000,
            description_chars: 500,
            sibling_transcript_chars: 2_000,
            sibling_limit: 3,
            words_per_minute: 150.0,
        }
    }
}

impl ScoringConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scoring_version: std::env::var("SCORING_VERSION")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.scoring_version),
            ai_gates_fail_open: std::env::var("SCORING_AI_GATES_FAIL_OPEN")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.ai_gates_fail_open),
            conviction_calibration_max: std::env::var("SCORING_CONVICTION_CALIBRATION_MAX")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(defaults.conviction_calibration_max),
            gate_transcript_chars: std::env::var("SCORING_GATE_TRANSCRIPT_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.gate_transcript_chars),
            quality_transcript_chars: std::env::var("SCORING_QUALITY_TRANSCRIPT_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.quality_transcript_chars),
            description_chars: defaults.description_chars,
            sibling_transcript_chars: defaults.sibling_transcript_chars,
            sibling_limit: std::env::var("SCORING_SIBLING_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.sibling_limit),
            words_per_minute: defaults.words_per_minute,
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 6] = [
        "SCORING_VERSION",
        "SCORING_AI_GATES_FAIL_OPEN",
        "SCORING_CONVICTION_CALIBRATION_MAX",
        "SCORING_GATE_TRANSCRIPT_CHARS",
        "SCORING_QUALITY_TRANSCRIPT_CHARS",
        "SCORING_SIBLING_LIMIT",
    ];

    fn clear() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear();
        let config = ScoringConfig::from_env();
        assert_eq!(config.scoring_version, "1.0");
        assert!(config.ai_gates_fail_open);
        assert_eq!(config.conviction_calibration_max, 0.5);
        assert_eq!(config.quality_transcript_chars, 15_000);
        assert_eq!(config.sibling_limit, 3);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear();
        std::env::set_var("SCORING_VERSION", "2.1");
        std::env::set_var("SCORING_AI_GATES_FAIL_OPEN", "off");
        std::env::set_var("SCORING_CONVICTION_CALIBRATION_MAX", "0.4");
        std::env::set_var("SCORING_SIBLING_LIMIT", "5");

        let config = ScoringConfig::from_env();
        assert_eq!(config.scoring_version, "2.1");
        assert!(!config.ai_gates_fail_open);
        assert_eq!(config.conviction_calibration_max, 0.4);
        assert_eq!(config.sibling_limit, 5);
        clear();
    }

    #[test]
    #[serial]
    fn test_invalid_values_fall_back() {
        clear();
        std::env::set_var("SCORING_AI_GATES_FAIL_OPEN", "sometimes");
        std::env::set_var("SCORING_CONVICTION_CALIBRATION_MAX", "0");

        let config = ScoringConfig::from_env();
        assert!(config.ai_gates_fail_open);
        assert_eq!(config.conviction_calibration_max, 0.5);
        clear();
    }
}
