//! Copy half of the rizz score: four transcript metrics worth 0-25 each.

use vscore_models::{CopyDetail, PersonalityMoment};

use crate::rizz::patterns;
use crate::stats::{coefficient_of_variation, round_to};
use crate::text::{count_matches, normalize, sentences};

const SUB_MAX: f64 = 25.0;

/// Score used for personality density when the model call fails.
pub const PERSONALITY_FALLBACK_SCORE: f64 = 10.0;

/// Moments kept on the record for display.
pub const MAX_TOP_MOMENTS: usize = 5;

/// Personality moments counted by the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonalityCount {
    pub total: usize,
    pub moments: Vec<PersonalityMoment>,
}

/// Score the copy metrics. `personality` is `None` when the model call
/// failed; that metric then takes the fallback score.
pub fn score_copy(
    transcript: &str,
    minutes: f64,
    personality: Option<PersonalityCount>,
) -> CopyDetail {
    let normalized = normalize(transcript);
    let mut detail = CopyDetail::default();

    match personality {
        Some(count) => {
            let per_minute = if minutes > 0.0 {
                count.total as f64 / minutes
            } else {
                0.0
            };
            detail.personality_density = personality_score(per_minute);
            detail.personality_available = true;
            detail.personality_moments = count.total;
            detail.personality_per_minute = round_to(per_minute, 2);
            detail.top_moments = count.moments.into_iter().take(MAX_TOP_MOMENTS).collect();
        }
        None => {
            detail.personality_density = PERSONALITY_FALLBACK_SCORE;
        }
    }

    let sents = sentences(transcript);
    detail.sentence_count = sents.len();
    let (sentence_score, sentence_cv) = sentence_variation(&sents);
    detail.sentence_variation = sentence_score;
    detail.sentence_cv = sentence_cv.map(|cv| round_to(cv, 3));

    detail.decisive_count = count_matches(&patterns::DECISIVE, &normalized);
    detail.hedging_count = count_matches(&patterns::HEDGING, &normalized);
    let decisive_ratio = phrase_ratio(detail.decisive_count, detail.hedging_count);
    detail.decisive_language = ratio_score(decisive_ratio);
    detail.decisive_ratio = round_to(decisive_ratio, 2);

    detail.first_person_count = count_matches(&patterns::FIRST_PERSON_EXPERIENCE, &normalized);
    detail.generic_count = count_matches(&patterns::GENERIC_PRODUCT, &normalized);
    let fp_ratio = phrase_ratio(detail.first_person_count, detail.generic_count);
    detail.first_person_experience = ratio_score(fp_ratio);
    detail.first_person_ratio = round_to(fp_ratio, 2);

    detail.total_raw = (detail.personality_density
        + detail.sentence_variation
        + detail.decisive_language
        + detail.first_person_experience)
        .min(100.0);
    detail
}

/// One moment every two minutes earns full marks.
pub fn personality_score(per_minute: f64) -> f64 {
    let score = if per_minute >= 0.5 {
        25.0
    } else if per_minute >= 0.3 {
        20.0
    } else if per_minute >= 0.2 {
        15.0
    } else if per_minute >= 0.1 {
        10.0
    } else {
        (per_minute / 0.1 * 10.0).round().max(3.0)
    };
    score.min(SUB_MAX)
}

/// Sentence-length variation. Fewer than five usable sentences is neutral.
pub fn sentence_variation(sentences: &[&str]) -> (f64, Option<f64>) {
    if sentences.len() < 5 {
        return (10.0, None);
    }
    let lengths: Vec<f64> = sentences
        .iter()
        .map(|s| s.split_whitespace().count() as f64)
        .collect();
    match coefficient_of_variation(&lengths) {
        Some(cv) => (sentence_cv_score(cv), Some(cv)),
        None => (10.0, None),
    }
}

pub fn sentence_cv_score(cv: f64) -> f64 {
    let score = if (0.4..=0.7).contains(&cv) {
        25.0
    } else if cv < 0.2 {
        5.0
    } else if cv < 0.4 {
        (5.0 + (cv - 0.2) / 0.2 * 20.0).round()
    } else {
        (25.0 - (cv - 0.7) * 25.0).round().max(10.0)
    };
    score.clamp(0.0, SUB_MAX)
}

/// `wanted / unwanted`, or the raw wanted count when nothing unwanted was found.
pub fn phrase_ratio(wanted: usize, unwanted: usize) -> f64 {
    if unwanted == 0 {
        wanted as f64
    } else {
        wanted as f64 / unwanted as f64
    }
}

/// Shared curve for decisive-vs-hedging and first-person-vs-generic ratios.
pub fn ratio_score(ratio: f64) -> f64 {
    let score = if ratio >= 3.0 {
        25.0
    } else if ratio >= 2.0 {
        20.0
    } else if ratio >= 1.0 {
        15.0
    } else if ratio >= 0.5 {
        10.0
    } else {
        (ratio * 20.0).round().max(3.0)
    };
    score.min(SUB_MAX)
}
