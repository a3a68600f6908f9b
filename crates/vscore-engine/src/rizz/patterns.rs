//! Phrase patterns for the transcript heuristics.
//!
//! All patterns match against normalized (lowercased, straight-apostrophe)
//! text.

use std::sync::LazyLock;

use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
}

/// Verbal fillers. "like" only counts when used as a filler, i.e. followed
/// by a pause or by "you".
pub static FILLERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bum\b",
        r"\buh\b",
        r"\blike(?:\s*,|\s*\.|\s+you)",
        r"\bkinda\b",
        r"\bsorta\b",
        r"\bi guess\b",
        r"\byou know\b",
        r"\bkind of\b",
        r"\bsort of\b",
        r"\bbasically\b",
    ])
});

pub static DECISIVE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bthis is the one\b",
        r"\bhands down\b",
        r"\bi recommend\b",
        r"\bmy top pick\b",
        r"\bthe clear winner\b",
        r"\bwithout a doubt\b",
        r"\bdefinitely go with\b",
        r"\bby far the best\b",
        r"\byou need this\b",
        r"\byou should get\b",
        r"\bjust get\b",
        r"\bdon't hesitate\b",
        r"\bbest option\b",
        r"\bno question\b",
        r"\bgrab this\b",
        r"\bi'd pick\b",
        r"\bi'd go with\b",
        r"\bmy choice\b",
    ])
});

pub static HEDGING: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bit depends\b",
        r"\byou might\b",
        r"\bcould be\b",
        r"\bmaybe\b",
        r"\bperhaps\b",
        r"\bi'm not sure\b",
        r"\bit's hard to say\b",
        r"\bsome people might\b",
        r"\bif you want\b",
        r"\bit's up to you\b",
        r"\bthere's no clear winner\b",
        r"\bboth are good\b",
    ])
});

/// Phrases that only someone who used the product would say.
pub static FIRST_PERSON_EXPERIENCE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bi tested\b",
        r"\bi tried\b",
        r"\bin my experience\b",
        r"\bi found\b",
        r"\bi noticed\b",
        r"\bi've been using\b",
        r"\bi used\b",
        r"\bpersonally\b",
        r"\bmy testing\b",
        r"\bi measured\b",
        r"\bi compared\b",
        r"\bi ran\b",
        r"\bi set up\b",
        r"\bi installed\b",
        r"\bafter using\b",
    ])
});

/// Spec-sheet phrasing that could be lifted from any listing.
pub static GENERIC_PRODUCT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\bthis product features\b",
        r"\busers can expect\b",
        r"\bthe product offers\b",
        r"\bit comes with\b",
        r"\bthe manufacturer claims\b",
        r"\baccording to the specs\b",
        r"\bthe brand says\b",
        r"\bthe company states\b",
    ])
});
