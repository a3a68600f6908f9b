//! Context multiplier.
//!
//! A pure lookup from resolved inputs to one of five buckets. The
//! orchestrator does the collaborator lookups and passes the results in.

use vscore_models::{ContextMultiplierResult, MultiplierBucket, VideoContext};

/// Domination percentage at or above which a tier-1 keyword is saturated.
pub const HIGH_DOMINATION_PCT: f64 = 90.0;

/// Resolved inputs for the multiplier.
#[derive(Debug, Clone, Copy)]
pub struct MultiplierInputs<'a> {
    pub context: &'a VideoContext,
    /// The silo has an approved-brand mapping.
    pub has_approved_brand: bool,
    /// The video has produced affiliate revenue. Only consulted for tier 2.
    pub has_revenue: bool,
}

pub fn select_bucket(inputs: &MultiplierInputs<'_>) -> MultiplierBucket {
    if !inputs.context.has_silo() {
        return MultiplierBucket::AiSkeleton;
    }

    if inputs.has_approved_brand {
        match inputs.context.domination_score {
            Some(pct) if pct >= HIGH_DOMINATION_PCT => MultiplierBucket::Tier1HighDom,
            _ => MultiplierBucket::Tier1LowDom,
        }
    } else if inputs.has_revenue {
        MultiplierBucket::Tier2Proven
    } else {
        MultiplierBucket::Tier2Unproven
    }
}

pub fn compute(inputs: &MultiplierInputs<'_>) -> ContextMultiplierResult {
    ContextMultiplierResult::from_bucket(
        select_bucket(inputs),
        inputs.context.domination_score,
        inputs.context.avg_domination_score,
    )
}

/// Whether revenue history matters for these inputs.
pub fn needs_revenue_lookup(context: &VideoContext, has_approved_brand: bool) -> bool {
    context.has_silo() && !has_approved_brand
}

#[cfg(test)]
mod tests {
    use super::*;
    use vscore_models::KeywordTier;

    fn ctx(silo: &str, dom: Option<f64>) -> VideoContext {
        VideoContext {
            silo: silo.into(),
            main_keyword: "best vpn".into(),
            domination_score: dom,
            avg_domination_score: Some(42.0),
        }
    }

    fn bucket(silo: &str, dom: Option<f64>, brand: bool, revenue: bool) -> MultiplierBucket {
        let context = ctx(silo, dom);
        select_bucket(&MultiplierInputs {
            context: &context,
            has_approved_brand: brand,
            has_revenue: revenue,
        })
    }

    #[test]
    fn test_no_silo_is_skeleton() {
        assert_eq!(bucket("", Some(95.0), true, true), MultiplierBucket::AiSkeleton);
        assert_eq!(bucket("   ", None, false, false), MultiplierBucket::AiSkeleton);
    }

    #[test]
    fn test_tier1_domination_threshold() {
        assert_eq!(bucket("vpn", Some(90.0), true, false), MultiplierBucket::Tier1HighDom);
        assert_eq!(bucket("vpn", Some(89.9), true, false), MultiplierBucket::Tier1LowDom);
        assert_eq!(bucket("vpn", None, true, false), MultiplierBucket::Tier1LowDom);
    }

    #[test]
    fn test_tier2_revenue() {
        assert_eq!(bucket("vpn", Some(95.0), false, true), MultiplierBucket::Tier2Proven);
        assert_eq!(bucket("vpn", Some(95.0), false, false), MultiplierBucket::Tier2Unproven);
    }

    #[test]
    fn test_compute_carries_domination_and_is_idempotent() {
        let context = ctx("vpn", Some(55.5));
        let inputs = MultiplierInputs {
            context: &context,
            has_approved_brand: true,
            has_revenue: false,
        };
        let first = compute(&inputs);
        assert_eq!(first, compute(&inputs));
        assert_eq!(first.keyword_tier, KeywordTier::Tier1);
        assert_eq!(first.multiplier, 1.5);
        assert_eq!(first.quality_floor, 80);
        assert_eq!(first.domination_score, Some(55.5));
        assert_eq!(first.avg_domination_score, Some(42.0));
    }

    #[test]
    fn test_multiplier_values_are_from_the_table() {
        let allowed = [0.5, 0.8, 1.0, 1.2, 1.5];
        for silo in ["", "vpn"] {
            for dom in [None, Some(10.0), Some(99.0)] {
                for brand in [false, true] {
                    for revenue in [false, true] {
                        let context = ctx(silo, dom);
                        let r = compute(&MultiplierInputs {
                            context: &context,
                            has_approved_brand: brand,
                            has_revenue: revenue,
                        });
                        assert!(allowed.contains(&r.multiplier));
                    }
                }
            }
        }
    }

    #[test]
    fn test_revenue_lookup_only_for_tier2() {
        assert!(needs_revenue_lookup(&ctx("vpn", None), false));
        assert!(!needs_revenue_lookup(&ctx("vpn", None), true));
        assert!(!needs_revenue_lookup(&ctx("", None), false));
    }
}
