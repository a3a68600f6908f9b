//! Transcript text helpers.

use regex::Regex;

/// Lowercase and fold typographic apostrophes so phrase patterns match
/// transcripts from any captioning source.
pub fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Total non-overlapping matches of every pattern in `text`.
pub fn count_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}

/// Phrases from `phrases` that occur in `normalized`, in list order.
pub fn phrases_found<'a>(phrases: &[&'a str], normalized: &str) -> Vec<&'a str> {
    phrases
        .iter()
        .copied()
        .filter(|p| normalized.contains(p))
        .collect()
}

/// Sentences split on terminal punctuation, keeping those of two or more words.
pub fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| word_count(s) >= 2)
        .collect()
}

/// Speaking time in minutes, never less than one.
///
/// Uses the known duration when there is one, otherwise estimates it from
/// the word count at `words_per_minute`.
pub fn duration_minutes(duration_seconds: u32, transcript: &str, words_per_minute: f64) -> f64 {
    if duration_seconds > 0 {
        (f64::from(duration_seconds) / 60.0).max(1.0)
    } else {
        (word_count(transcript) as f64 / words_per_minute).max(1.0)
    }
}
