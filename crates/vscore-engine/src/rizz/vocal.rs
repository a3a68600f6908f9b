//! Vocal half of the rizz score.
//!
//! Five sub-metrics worth 0-20 each: conviction, conviction consistency, CTA
//! conviction delta, filler density, pacing variation. Filler density and
//! pacing come from the transcript alone; the other three need emotion
//! segments. Without segments the two transcript metrics are rescaled to
//! the full 0-100 range.

use vscore_models::{round1, EmotionSegment, VocalDetail};

use crate::rizz::patterns;
use crate::stats::{coefficient_of_variation, mean, round_to, sample_std_dev};
use crate::text::{count_matches, duration_minutes, normalize};

/// Emotions that read as vocal confidence.
pub const CONFIDENCE_EMOTIONS: [&str; 3] = ["Determination", "Concentration", "Interest"];

const SUB_MAX: f64 = 20.0;

/// Tunables for the vocal scorer.
#[derive(Debug, Clone, Copy)]
pub struct VocalParams {
    /// Mean confidence that earns full conviction points
    pub calibration_max: f64,
    pub words_per_minute: f64,
}

impl Default for VocalParams {
    fn default() -> Self {
        Self {
            calibration_max: 0.5,
            words_per_minute: 150.0,
        }
    }
}

pub fn score_vocal(
    segments: Option<&[EmotionSegment]>,
    transcript: &str,
    duration_seconds: u32,
    params: VocalParams,
) -> VocalDetail {
    let minutes = duration_minutes(duration_seconds, transcript, params.words_per_minute);
    let filler_count = count_matches(&patterns::FILLERS, &normalize(transcript));
    let fillers_per_min = filler_count as f64 / minutes;
    let (pacing_score, pacing_cv) = pacing_variation(transcript);

    let mut detail = VocalDetail {
        filler_density_score: filler_density_score(fillers_per_min),
        filler_count,
        fillers_per_min: round_to(fillers_per_min, 2),
        pacing_variation_score: pacing_score,
        pacing_cv: pacing_cv.map(|cv| round_to(cv, 3)),
        ..Default::default()
    };

    let confidence: Vec<f64> = segments
        .unwrap_or_default()
        .iter()
        .map(|s| s.summed_score(&CONFIDENCE_EMOTIONS))
        .collect();

    let Some(avg) = mean(&confidence) else {
        detail.total_raw =
            round1((detail.filler_density_score + detail.pacing_variation_score) / 40.0 * 100.0);
        return detail;
    };

    let conviction = conviction_score(avg, params.calibration_max);
    let std_dev = sample_std_dev(&confidence);
    let consistency = std_dev.map(consistency_score).unwrap_or(10.0);
    let delta = cta_delta(&confidence, avg);
    let delta_score = cta_delta_score(delta);

    detail.available = true;
    detail.conviction_score = Some(conviction);
    detail.avg_confidence = Some(round_to(avg, 4));
    detail.conviction_consistency = Some(consistency);
    detail.confidence_std_dev = Some(round_to(std_dev.unwrap_or(0.0), 4));
    detail.cta_conviction_delta = Some(delta_score);
    detail.cta_delta = Some(round_to(delta, 4));
    detail.total_raw = (conviction
        + consistency
        + delta_score
        + detail.filler_density_score
        + detail.pacing_variation_score)
        .min(100.0);
    detail
}

/// Linear map of mean confidence from `[0, calibration_max]` to `[0, 20]`.
pub fn conviction_score(avg_confidence: f64, calibration_max: f64) -> f64 {
    (avg_confidence / calibration_max * SUB_MAX).round().clamp(0.0, SUB_MAX)
}

/// Inverted U over the confidence std-dev. Flat delivery and erratic
/// delivery both lose points.
pub fn consistency_score(std_dev: f64) -> f64 {
    let score = if (0.06..=0.14).contains(&std_dev) {
        SUB_MAX
    } else if std_dev < 0.06 {
        (std_dev / 0.06 * SUB_MAX).round()
    } else {
        (SUB_MAX - (std_dev - 0.14) * 100.0).round()
    };
    score.clamp(0.0, SUB_MAX)
}

/// Mean confidence over the final 20% of segments minus the overall mean.
pub fn cta_delta(confidence: &[f64], overall_avg: f64) -> f64 {
    let start = ((confidence.len() as f64 * 0.8) as usize).max(1);
    let tail = confidence.get(start..).unwrap_or_default();
    mean(tail).unwrap_or(overall_avg) - overall_avg
}

/// A lift scores 0 to 20 over 0.00 to 0.10. A drop starts at 10 and
/// reaches 0 at -0.05.
pub fn cta_delta_score(delta: f64) -> f64 {
    let score = if delta >= 0.0 {
        delta / 0.10 * SUB_MAX
    } else {
        10.0 + delta / 0.05 * 10.0
    };
    score.round().clamp(0.0, SUB_MAX)
}

/// One to three fillers a minute sounds natural. None at all sounds read.
pub fn filler_density_score(fillers_per_min: f64) -> f64 {
    let score = if (1.0..=3.0).contains(&fillers_per_min) {
        SUB_MAX
    } else if fillers_per_min < 1.0 {
        10.0
    } else if fillers_per_min <= 5.0 {
        (SUB_MAX - (fillers_per_min - 3.0) * 7.5).round().max(5.0)
    } else {
        (5.0 - (fillers_per_min - 5.0)).round().max(2.0)
    };
    score.clamp(0.0, SUB_MAX)
}

/// Pacing score from word-count dispersion across ~10 transcript chunks.
/// Returns the score and the CV it was derived from, if one was computed.
pub fn pacing_variation(transcript: &str) -> (f64, Option<f64>) {
    let words: Vec<&str> = transcript.split_whitespace().collect();
    if words.len() < 50 {
        return (10.0, None);
    }

    let chunk_size = (words.len() / 10).max(10);
    let counts: Vec<f64> = words.chunks(chunk_size).map(|c| c.len() as f64).collect();
    if counts.len() < 3 {
        return (10.0, None);
    }

    let Some(cv) = coefficient_of_variation(&counts) else {
        return (10.0, None);
    };
    (pacing_score(cv), Some(cv))
}

pub fn pacing_score(cv: f64) -> f64 {
    let score = if (0.15..=0.35).contains(&cv) {
        SUB_MAX
    } else if cv < 0.15 {
        (cv / 0.15 * SUB_MAX).round().max(5.0)
    } else {
        (SUB_MAX - (cv - 0.35) * 30.0).round().max(5.0)
    };
    score.min(SUB_MAX)
}
