//! Built-in resolvers. A policy can equally pass any boxed function as its
//! resolver.

use crate::decision::{RuleOutcome, Verdict};
use crate::policy::Resolver;
use std::collections::HashMap;

/// Allowed iff no rule denied; skips are tolerated.
pub fn all_must_allow<I>() -> Resolver<I, Verdict> {
    Box::new(|results, _input, _facts| Verdict {
        allowed: !results
            .iter()
            .any(|r| r.result.outcome() == RuleOutcome::Deny),
    })
}

/// Allowed iff at least one rule allowed.
pub fn any_must_allow<I>() -> Resolver<I, Verdict> {
    Box::new(|results, _input, _facts| Verdict {
        allowed: results
            .iter()
            .any(|r| r.result.outcome() == RuleOutcome::Allow),
    })
}

/// Signed score over the weight table: an allowing rule adds its weight, a
/// denying rule subtracts it, skips and unlisted rules contribute nothing.
pub fn weighted_score<I>(weights: HashMap<Box<str>, i64>) -> Resolver<I, i64> {
    Box::new(move |results, _input, _facts| {
        results
            .iter()
            .map(|r| {
                let weight = weights.get(&r.rule).copied().unwrap_or(0);
                match r.result.outcome() {
                    RuleOutcome::Allow => weight,
                    RuleOutcome::Deny => -weight,
                    RuleOutcome::Skip => 0,
                }
            })
            .sum()
    })
}
