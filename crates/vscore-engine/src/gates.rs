//! Gate checks.
//!
//! Six binary checks. Brand Alignment and SEO Title Compliance are
//! deterministic; the remaining four share one model call. Results always
//! come back as exactly six entries in [`GateName::ALL`] order.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};
use vscore_llm::{parse_llm_json, LlmClient, LlmError, LlmRequest, LlmResult};
use vscore_models::{ApprovedBrand, GateCheckResult, GateName, SiblingTranscript, VideoContext};

use crate::prompts::{gate_prompt, GatePromptInput};
use crate::text::truncate_chars;

/// Factual Accuracy fails when more claims than this need verification.
pub const MAX_UNVERIFIED_CLAIMS: usize = 3;

/// Reason attached to the AI-assisted gates when the model call fails.
pub const UNAVAILABLE_REASON: &str = "Gate check unavailable: model call failed";

/// Share of significant keyword words the title must contain for a partial match.
const PARTIAL_MATCH_RATIO: f64 = 0.6;

const MAX_TOKENS: u32 = 1500;

/// Outcome of looking up the approved brand for a video's silo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandLookup {
    NoSilo,
    NotConfigured,
    Unavailable,
    Found(ApprovedBrand),
}

impl BrandLookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Gate 1: the silo's approved brand is the one being promoted.
pub fn check_brand_alignment(
    transcript: &str,
    description: &str,
    silo: &str,
    brand: &BrandLookup,
) -> GateCheckResult {
    let gate = GateName::BrandAlignment;
    let approved = match brand {
        BrandLookup::NoSilo => return GateCheckResult::pass_with_note(gate, "Skipped: no silo assigned"),
        BrandLookup::NotConfigured => {
            return GateCheckResult::pass_with_note(gate, "Skipped: no approved brand for this silo")
        }
        BrandLookup::Unavailable => {
            return GateCheckResult::pass_with_note(gate, "Skipped: approved brand lookup unavailable")
        }
        BrandLookup::Found(approved) => approved,
    };

    let combined = format!("{} {}", transcript, description).to_lowercase();
    let mentions = |brand: &str| {
        let brand = brand.trim().to_lowercase();
        !brand.is_empty() && combined.contains(&brand)
    };

    if mentions(approved.primary_brand.as_str()) {
        return GateCheckResult::pass(gate);
    }

    if let Some(secondary) = approved.secondary_brand.as_deref().filter(|s| mentions(*s)) {
        return GateCheckResult::pass_with_note(
            gate,
            format!(
                "Using secondary brand ({}), not primary ({})",
                secondary, approved.primary_brand
            ),
        );
    }

    GateCheckResult::fail(
        gate,
        format!(
            "Approved brand for the {} silo is {}, but it was not found in the transcript or description",
            silo, approved.primary_brand
        ),
    )
}

/// Gate 2: the title carries the target keyword.
pub fn check_seo_title(title: &str, keyword: &str) -> GateCheckResult {
    let gate = GateName::SeoTitleCompliance;
    let keyword_lower = keyword.trim().to_lowercase();
    if keyword_lower.is_empty() {
        return GateCheckResult::pass_with_note(gate, "Skipped: no target keyword assigned");
    }

    let title_lower = title.to_lowercase();
    if title_lower.contains(&keyword_lower) {
        return GateCheckResult::pass(gate);
    }

    let significant: Vec<&str> = keyword_lower
        .split_whitespace()
        .filter(|w| w.chars().count() >= 3)
        .collect();
    let matched = significant.iter().filter(|w| title_lower.contains(*w)).count();

    if !significant.is_empty() && matched as f64 >= significant.len() as f64 * PARTIAL_MATCH_RATIO {
        return GateCheckResult::pass_with_note(
            gate,
            format!("Partial keyword match ({}/{} words)", matched, significant.len()),
        );
    }

    GateCheckResult::fail(
        gate,
        format!("Target keyword '{}' not found in title '{}'", keyword, title),
    )
}

/// Everything the gate checker needs, already fetched.
#[derive(Debug, Clone, Copy)]
pub struct GateInputs<'a> {
    pub transcript: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub context: &'a VideoContext,
    pub brand: &'a BrandLookup,
    pub partners: &'a [String],
    pub siblings: &'a [SiblingTranscript],
}

/// Runs all six gates.
#[derive(Clone)]
pub struct GateChecker {
    llm: Arc<dyn LlmClient>,
    fail_open: bool,
    transcript_chars: usize,
    sibling_chars: usize,
}

impl GateChecker {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        fail_open: bool,
        transcript_chars: usize,
        sibling_chars: usize,
    ) -> Self {
        Self {
            llm,
            fail_open,
            transcript_chars,
            sibling_chars,
        }
    }

    pub async fn run(&self, inputs: GateInputs<'_>) -> Vec<GateCheckResult> {
        let mut results = Vec::with_capacity(GateName::ALL.len());
        results.push(check_brand_alignment(
            inputs.transcript,
            inputs.description,
            &inputs.context.silo,
            inputs.brand,
        ));
        results.push(check_seo_title(inputs.title, &inputs.context.main_keyword));

        match self.run_ai_gates(&inputs).await {
            Ok(ai) => results.extend(ai),
            Err(e) => {
                warn!(error = %e, fail_open = self.fail_open, "AI gate check failed");
                results.extend(unavailable_gates(self.fail_open));
            }
        }

        let passed = results.iter().filter(|g| g.passed).count();
        info!(passed, total = results.len(), "Gate checks complete");
        results
    }

    async fn run_ai_gates(&self, inputs: &GateInputs<'_>) -> LlmResult<Vec<GateCheckResult>> {
        let siblings: Vec<SiblingTranscript> = inputs
            .siblings
            .iter()
            .map(|s| SiblingTranscript {
                video_title: s.video_title.clone(),
                transcript: truncate_chars(&s.transcript, self.sibling_chars).to_string(),
            })
            .collect();

        let prompt = gate_prompt(GatePromptInput {
            title: inputs.title,
            keyword: &inputs.context.main_keyword,
            silo: &inputs.context.silo,
            transcript: truncate_chars(inputs.transcript, self.transcript_chars),
            partners: inputs.partners,
            siblings: &siblings,
        });

        let reply = self.llm.complete(&LlmRequest::json(prompt, MAX_TOKENS)).await?;
        let parsed = parse_llm_json(&reply)?;
        ai_gates_from_json(&parsed.value)
    }
}

/// The four AI-assisted gates when the model could not be consulted.
pub fn unavailable_gates(fail_open: bool) -> Vec<GateCheckResult> {
    GateName::AI_ASSISTED
        .iter()
        .map(|gate| GateCheckResult {
            gate_name: *gate,
            passed: fail_open,
            failure_reason: UNAVAILABLE_REASON.to_string(),
            claims_to_verify: Vec::new(),
        })
        .collect()
}

/// Read the four AI-assisted gate verdicts from the model's reply.
///
/// A gate missing from the reply passes. Factual Accuracy is failed locally
/// when the model lists more than [`MAX_UNVERIFIED_CLAIMS`] claims.
pub fn ai_gates_from_json(value: &Value) -> LlmResult<Vec<GateCheckResult>> {
    let root = value
        .as_object()
        .ok_or_else(|| LlmError::invalid_response("gate reply is not a JSON object"))?;

    let results = GateName::AI_ASSISTED
        .iter()
        .map(|gate| {
            let Some(entry) = root.get(gate.as_str()).and_then(Value::as_object) else {
                return GateCheckResult::pass(*gate);
            };

            let passed = entry.get("passed").and_then(as_bool).unwrap_or(true);
            let reason = entry
                .get("failure_reason")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            let claims: Vec<String> = entry
                .get("claims_to_verify")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();

            let mut result = GateCheckResult {
                gate_name: *gate,
                passed,
                failure_reason: reason,
                claims_to_verify: Vec::new(),
            };

            if *gate == GateName::FactualAccuracy {
                if claims.len() > MAX_UNVERIFIED_CLAIMS && result.passed {
                    result.passed = false;
                    if result.failure_reason.is_empty() {
                        result.failure_reason = format!(
                            "{} specific claims need verification (limit {})",
                            claims.len(),
                            MAX_UNVERIFIED_CLAIMS
                        );
                    }
                }
                result = result.with_claims(claims);
            }
            result
        })
        .collect();

    Ok(results)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "pass" | "passed" => Some(true),
            "false" | "fail" | "failed" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn brand(primary: &str, secondary: Option<&str>) -> BrandLookup {
        BrandLookup::Found(ApprovedBrand {
            silo: "vpn".into(),
            primary_brand: primary.into(),
            secondary_brand: secondary.map(str::to_string),
        })
    }

    #[test]
    fn test_brand_primary_in_description() {
        let r = check_brand_alignment("great vpn", "Get NordVPN here", "vpn", &brand("NordVPN", None));
        assert!(r.passed);
        assert!(r.failure_reason.is_empty());
    }

    #[test]
    fn test_brand_secondary_passes_with_warning() {
        let r = check_brand_alignment("I use surfshark daily", "", "vpn", &brand("NordVPN", Some("Surfshark")));
        assert!(r.passed);
        assert_eq!(r.failure_reason, "Using secondary brand (Surfshark), not primary (NordVPN)");
    }

    #[test]
    fn test_brand_missing_fails_naming_brand() {
        let r = check_brand_alignment("ExpressVPN is fast", "", "vpn", &brand("NordVPN", Some("Surfshark")));
        assert!(!r.passed);
        assert!(r.failure_reason.contains("NordVPN"));
        assert!(r.failure_reason.contains("vpn silo"));
    }

    #[test]
    fn test_brand_skips() {
        for lookup in [BrandLookup::NoSilo, BrandLookup::NotConfigured, BrandLookup::Unavailable] {
            let r = check_brand_alignment("", "", "", &lookup);
            assert!(r.passed);
            assert!(r.failure_reason.starts_with("Skipped"));
        }
    }

    #[test]
    fn test_seo_exact_match() {
        let r = check_seo_title("The Best Mesh Router of 2025", "best mesh router");
        assert!(r.passed);
        assert!(r.failure_reason.is_empty());
    }

    #[test]
    fn test_seo_partial_match() {
        let r = check_seo_title("Mesh router guide: best picks", "best mesh router");
        assert!(r.passed);
        assert_eq!(r.failure_reason, "Partial keyword match (3/3 words)");

        let r = check_seo_title("Best mesh router?", "best mesh wifi router");
        assert!(r.passed);
        assert_eq!(r.failure_reason, "Partial keyword match (3/4 words)");
    }

    #[test]
    fn test_seo_no_overlap_fails() {
        let r = check_seo_title("My desk setup tour", "best mesh router");
        assert!(!r.passed);
        assert_eq!(
            r.failure_reason,
            "Target keyword 'best mesh router' not found in title 'My desk setup tour'"
        );
    }

    #[test]
    fn test_seo_without_keyword_skips() {
        assert!(check_seo_title("anything", "  ").passed);
    }

    #[test]
    fn test_ai_gates_parse_and_order() {
        let reply = json!({
            "factual_accuracy": {"passed": true, "failure_reason": "", "claims_to_verify": ["$49 price"]},
            "partner_safety": {"passed": false, "failure_reason": "Calls Acme a scam"},
            "funnel_match": {"passed": "true", "failure_reason": ""}
        });
        let gates = ai_gates_from_json(&reply).unwrap();

        let names: Vec<_> = gates.iter().map(|g| g.gate_name).collect();
        assert_eq!(names, GateName::AI_ASSISTED.to_vec());
        assert!(!gates[0].passed);
        assert_eq!(gates[0].failure_reason, "Calls Acme a scam");
        // Missing from the reply.
        assert!(gates[1].passed);
        assert!(gates[2].passed);
        assert!(gates[3].passed);
        assert_eq!(gates[3].claims_to_verify, vec!["$49 price"]);
    }

    #[test]
    fn test_too_many_claims_fails_locally() {
        let reply = json!({
            "factual_accuracy": {
                "passed": true,
                "claims_to_verify": ["a", "b", "c", "d"]
            }
        });
        let gates = ai_gates_from_json(&reply).unwrap();
        let fa = &gates[3];
        assert!(!fa.passed);
        assert_eq!(fa.failure_reason, "4 specific claims need verification (limit 3)");
        assert_eq!(fa.claims_to_verify.len(), 4);
    }

    #[test]
    fn test_unavailable_gates_follow_policy() {
        assert!(unavailable_gates(true).iter().all(|g| g.passed));
        assert!(unavailable_gates(false).iter().all(|g| !g.passed));
        assert!(unavailable_gates(true)
            .iter()
            .all(|g| g.failure_reason == UNAVAILABLE_REASON));
    }

    #[test]
    fn test_non_object_reply_is_an_error() {
        assert!(ai_gates_from_json(&json!("PASS")).is_err());
    }
}
