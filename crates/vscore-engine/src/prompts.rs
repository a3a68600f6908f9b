//! Prompt builders for the three model calls.
//!
//! Every prompt asks for a bare JSON object. Inputs arrive already truncated.

use std::fmt::Write as _;

use vscore_models::{QualityDimension, SiblingTranscript};

/// Inputs for the AI-assisted gate prompt.
#[derive(Debug, Clone, Copy)]
pub struct GatePromptInput<'a> {
    pub title: &'a str,
    pub keyword: &'a str,
    pub silo: &'a str,
    pub transcript: &'a str,
    pub partners: &'a [String],
    pub siblings: &'a [SiblingTranscript],
}

pub fn gate_prompt(input: GatePromptInput<'_>) -> String {
    let partners = if input.partners.is_empty() {
        "None on file".to_string()
    } else {
        input.partners.join(", ")
    };

    let mut siblings = String::new();
    for sib in input.siblings {
        let _ = write!(siblings, "\n### {}\n{}\n", sib.video_title, sib.transcript);
    }
    if siblings.is_empty() {
        siblings.push_str("None found");
    }

    format!(
        r#"You review scripts for an affiliate-marketing video channel. Judge the script
below against four pass/fail checks.

Title: {title}
Target keyword: {keyword}
Category: {silo}

## Script
{transcript}

## Partner brands (the channel earns revenue from these)
{partners}

## Other videos targeting the same keyword
{siblings}

## Checks
partner_safety: Fail if the script speaks negatively about any partner brand
(criticism, disparagement or negative framing next to the brand name). Pass if
no partner brands are on file.

cross_video_coherence: Fail if the script contradicts a concrete factual claim
in the other videos above, such as a different top recommendation, conflicting
feature claims or inconsistent pricing. Pass if there are no other videos.

funnel_match: If the keyword is bottom-of-funnel ("best X", "X review", "X vs Y",
a specific product), fail when the script spends more than about 90 seconds on
general category education the viewer already has.

factual_accuracy: List every claim built on a specific number (price,
percentage, statistic, date, feature count) that may go stale or be wrong.
Fail if more than 3 such claims cannot be verified.

Respond with JSON only, in exactly this shape:
{{
  "partner_safety": {{"passed": true, "failure_reason": ""}},
  "cross_video_coherence": {{"passed": true, "failure_reason": ""}},
  "funnel_match": {{"passed": true, "failure_reason": ""}},
  "factual_accuracy": {{"passed": true, "failure_reason": "", "claims_to_verify": []}}
}}"#,
        title = input.title,
        keyword = or_unassigned(input.keyword),
        silo = or_unassigned(input.silo),
        transcript = input.transcript,
        partners = partners,
        siblings = siblings,
    )
}

/// Phrases spotted in the transcript before the quality call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreSignals {
    pub llm_smell: Vec<&'static str>,
    pub vague_credibility: Vec<&'static str>,
    pub objection_naming: Vec<&'static str>,
}

/// Inputs for the quality prompt.
#[derive(Debug, Clone, Copy)]
pub struct QualityPromptInput<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub keyword: &'a str,
    pub silo: &'a str,
    pub duration_seconds: u32,
    pub transcript: &'a str,
    pub signals: &'a PreSignals,
}

pub fn quality_prompt(input: QualityPromptInput<'_>) -> String {
    let mut rubric = String::new();
    let mut shape = String::new();
    for (i, dim) in QualityDimension::ALL.iter().enumerate() {
        let _ = writeln!(
            rubric,
            "\n### {}. {} (0-{} points)",
            i + 1,
            dim.display_name(),
            dim.max_points()
        );
        let mut fields = Vec::new();
        for (name, max) in dim.sub_scores() {
            let _ = writeln!(rubric, "- {} (0-{}): {}", name, max, sub_score_hint(name));
            fields.push(format!("\"{}\": <0-{}>", name, max));
        }
        let _ = writeln!(
            shape,
            "  \"{}\": {{\"total\": <0-{}>, {}, \"notes\": {{\"examples\": [], \"deductions\": []}}}},",
            dim.as_str(),
            dim.max_points(),
            fields.join(", ")
        );
    }

    format!(
        r#"You are a strict evaluator of video scripts for an affiliate-marketing channel.
Score the script on six weighted dimensions worth 100 points in total. Most
scripts land between 50 and 70; above 85 means exceptional on every dimension.

Title: {title}
Description (truncated): {description}
Target keyword: {keyword}
Category: {silo}
Duration: {duration}s ({minutes}m {seconds}s)

## Signals already detected
- AI-sounding phrases: {smell}
- Vague credibility phrases: {vague}
- Objection-naming phrases: {objection}

## Script
{transcript}

## Rubric
{rubric}
Give every sub-score as a number in its range. Put concrete quotes and issues
in "notes" as string lists.

Respond with JSON only, in exactly this shape:
{{
{shape}  "quality_score_total": <sum of the six totals>,
  "top_3_action_items": [
    {{"priority": 1, "dimension": "<dimension>", "action": "<fix>", "specific_detail": "<what to change, quoting the script>"}}
  ]
}}"#,
        title = input.title,
        description = input.description,
        keyword = or_unknown(input.keyword),
        silo = or_unknown(input.silo),
        duration = input.duration_seconds,
        minutes = input.duration_seconds / 60,
        seconds = input.duration_seconds % 60,
        smell = signal_list(&input.signals.llm_smell),
        vague = signal_list(&input.signals.vague_credibility),
        objection = signal_list(&input.signals.objection_naming),
        transcript = input.transcript,
        rubric = rubric,
        shape = shape,
    )
}

pub fn personality_prompt(transcript: &str) -> String {
    format!(
        r#"Count the personality moments in this video script. A moment is any of:
humor (jokes, wit, sarcasm, self-deprecation), a callback to something said
earlier, a fourth-wall break or self-aware aside, a vivid metaphor or analogy,
a personal anecdote that feels real, or a signature catchphrase.

## Script
{transcript}

Respond with JSON only, in exactly this shape:
{{
  "moments": [{{"type": "<kind>", "quote": "<short exact quote>", "timestamp_hint": "beginning|middle|end"}}],
  "total_count": <number>
}}"#
    )
}

fn sub_score_hint(name: &str) -> &'static str {
    match name {
        "quantified_claims" => "credibility claims carry numbers (\"47 hours\", not \"extensive testing\")",
        "feature_benefit_cascade" => "features are carried through to benefits and real situations",
        "proof_density" => "verifiable proof points per minute, about one per 60s; the first 30s count double",
        "generic_content_ratio" => "share of sentences that could sit in any competitor's review; fewer is better",
        "llm_smell" => "free of AI-sounding phrasing; 5 is fully human",
        "cta_placement" => "two or more calls to action, the first soft mention before the 25% mark",
        "frame_control" => "objections named and dismissed (low) up to defining the whole landscape (high)",
        "decisiveness" => "the final minute commits to a pick instead of \"it depends\"",
        "risk_reversal" => "guarantees, trials or returns are mentioned where they exist",
        "cognitive_leakage" => "no needless competitor mentions that send viewers elsewhere; 3 is none",
        "hook_specificity" => "the first 30s use concrete detail, numbers or comparisons",
        "payoff_timing" => "the hook's promise is paid off before the 60% mark",
        "chapter_quality" => "chapter labels are specific and build curiosity; \"Introduction\" loses points",
        "section_ordering" => "order fits the viewer's intent; bottom-of-funnel recommends before 40%",
        "reveal_quality" => "the product reveal lands as a decisive moment",
        "personal_anecdote" => "at least one experience only a real user could describe",
        "personality_moments" => "humor, self-awareness, callbacks, a distinct voice",
        "natural_language" => "contractions, colloquialisms and varied sentence length",
        "llm_voice" => "no stock AI voice markers such as \"here's the thing\"",
        "survivability_2030" => "would still read as human next to future AI content",
        "cognitive_load" => "specs translated into practical terms",
        "funnel_depth" => "does not re-explain what the search intent shows the viewer knows",
        "insider_knowledge" => "one or two details that show real domain expertise",
        "reddit_skeptic" => "gives technical viewers something without pandering to them",
        "broll_references" => "calls for real footage, screen recordings or dashboards",
        "visual_evidence" => "comparative claims are backed by data shown on screen",
        "screen_hygiene" => "nothing on screen that could leak unrelated content; 3 is clean",
        _ => "",
    }
}

fn signal_list(found: &[&str]) -> String {
    if found.is_empty() {
        "None".to_string()
    } else {
        found
            .iter()
            .map(|p| format!("\"{}\"", p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn or_unassigned(value: &str) -> &str {
    if value.trim().is_empty() {
        "Not assigned"
    } else {
        value
    }
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "Unknown"
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_prompt_lists_partners_and_siblings() {
        let partners = vec!["Acme".to_string(), "Globex".to_string()];
        let siblings = vec![SiblingTranscript {
            video_title: "Best routers 2025".into(),
            transcript: "The Deco wins.".into(),
        }];
        let prompt = gate_prompt(GatePromptInput {
            title: "Best mesh router",
            keyword: "best mesh router",
            silo: "",
            transcript: "script body",
            partners: &partners,
            siblings: &siblings,
        });

        assert!(prompt.contains("Acme, Globex"));
        assert!(prompt.contains("### Best routers 2025\nThe Deco wins."));
        assert!(prompt.contains("Category: Not assigned"));
        assert!(prompt.contains("\"factual_accuracy\""));
    }

    #[test]
    fn test_gate_prompt_without_context() {
        let prompt = gate_prompt(GatePromptInput {
            title: "t",
            keyword: "",
            silo: "",
            transcript: "s",
            partners: &[],
            siblings: &[],
        });
        assert!(prompt.contains("None on file"));
        assert!(prompt.contains("None found"));
    }

    #[test]
    fn test_quality_prompt_covers_every_sub_score() {
        let signals = PreSignals {
            llm_smell: vec!["buckle up"],
            ..Default::default()
        };
        let prompt = quality_prompt(QualityPromptInput {
            title: "t",
            description: "d",
            keyword: "k",
            silo: "s",
            duration_seconds: 125,
            transcript: "body",
            signals: &signals,
        });

        for dim in QualityDimension::ALL {
            assert!(prompt.contains(dim.as_str()));
            for (name, _) in dim.sub_scores() {
                assert!(prompt.contains(name), "missing {}", name);
                assert!(!sub_score_hint(name).is_empty(), "no hint for {}", name);
            }
        }
        assert!(prompt.contains("Duration: 125s (2m 5s)"));
        assert!(prompt.contains("AI-sounding phrases: \"buckle up\""));
        assert!(prompt.contains("Vague credibility phrases: None"));
    }

    #[test]
    fn test_personality_prompt_embeds_transcript() {
        let prompt = personality_prompt("so anyway, my cat reviewed it");
        assert!(prompt.contains("so anyway, my cat reviewed it"));
        assert!(prompt.contains("total_count"));
    }
}
