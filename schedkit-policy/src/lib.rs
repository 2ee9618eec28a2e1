/*
 * Copyright (c) 2025 Clément GRENNERAT
 *
 * This program is free software: you can redistribute it and/or modify it under the terms of the
 * GNU General Public License as published by the Free Software Foundation, version 3.
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without
 * even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
 * See the GNU General Public License for more details.
 * You should have received a copy of the GNU General Public License along with this program.
 * If not, see https://www.gnu.org/licenses/.
 *
 */

//! Policy core: a deterministic evaluator over named facts, ordered rules
//! and a pluggable resolver, plus the entitlement/quota queries built on
//! top of it. Pure over caller-provided values; adapters are the only
//! suspension points.

pub mod decision;
pub mod display;
pub mod entitlements;
pub mod error;
pub mod facts;
pub mod limits;
pub mod policy;
pub mod resolvers;
pub mod rules;

#[cfg(test)]
mod tests;

pub use decision::{Decision, Obligation, Reason, RuleOutcome, Trace, Verdict};
pub use entitlements::{
    ActionCapability, Capabilities, Entitlement, EntitlementAdapter, EntitlementEngine, LimitedBy,
    QuotaState, RemainingUses,
};
pub use error::{BoxError, PolicyError};
pub use facts::{fact, FactDef, FactMap};
pub use limits::{available_at, check_limit, consume, remaining_quota, Availability, Limit, LimitCheck};
pub use policy::{Policy, Resolver};
pub use resolvers::{all_must_allow, any_must_allow, weighted_score};
pub use rules::{allow, allow_with, deny, skip, EvaluatedRule, Rule, RuleResult};
