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

//! Entitlement queries: typed quota questions answered over the policy
//! engine, the limit math and a caller-supplied store of entitlements and
//! usage counts.

use crate::decision::{Decision, Obligation, Verdict};
use crate::error::{BoxError, PolicyError};
use crate::facts::{fact, FactMap};
use crate::limits::{
    available_at as limit_available_at, check_limit, consume, remaining_quota, Availability, Limit,
};
use crate::policy::Policy;
use crate::resolvers::all_must_allow;
use crate::rules::{allow_with, deny, Rule};
use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use indexmap::IndexMap;
use schedkit_time::{next_reset, resolve_window, EpochMs, Interval, WindowSpec, EPOCH_MS, FAR_FUTURE_MS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// What an actor is entitled to for one action: a ceiling and the window
/// usage is counted in. A limit without a window counts usage over the
/// lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub limit: Limit,
    #[serde(default)]
    pub window: Option<WindowSpec>,
}

/// Projected view of one quota for dashboards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaState {
    pub name: Box<str>,
    pub limit: Limit,
    pub used: u32,
    pub remaining: Limit,
    pub window: Option<WindowSpec>,
    pub resets_at: Option<EpochMs>,
    pub interval: Interval,
}

/// Per-action capability classification.
#[derive(Debug, Clone)]
pub enum ActionCapability {
    Available {
        quota: Option<QuotaState>,
        obligation: Obligation,
    },
    Exhausted {
        quota: QuotaState,
        reason: Box<str>,
        available_at: Option<EpochMs>,
    },
    Unavailable {
        reason: Box<str>,
    },
}

/// Capability listing plus summary arrays, in query order.
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub actions: IndexMap<Box<str>, ActionCapability>,
    pub available: Vec<Box<str>>,
    pub exhausted: Vec<Box<str>>,
    pub unavailable: Vec<Box<str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LimitedBy {
    None,
    Entitlement,
    NoEntitlement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemainingUses {
    pub uses: Limit,
    pub limited_by: LimitedBy,
}

/// The store the entitlement engine reads from. `usage` is always invoked
/// with the precise interval the engine wants counted.
#[async_trait]
pub trait EntitlementAdapter: Send + Sync {
    async fn entitlements(
        &self,
        actor_id: &str,
    ) -> Result<HashMap<Box<str>, Entitlement>, BoxError>;

    async fn usage(
        &self,
        actor_id: &str,
        action: &str,
        interval: &Interval,
    ) -> Result<u32, BoxError>;
}

struct CheckInput {
    actor_id: Box<str>,
    action: Box<str>,
    amount: u32,
    at: EpochMs,
}

fn now_ms() -> EpochMs {
    Utc::now().timestamp_millis()
}

fn entitlement_for(facts: &FactMap, action: &str) -> Option<Entitlement> {
    facts
        .get("entitlements")
        .and_then(|v| v.get(action))
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// The interval usage is counted in: the resolved window, or the whole
/// lifetime when the entitlement has none.
fn counting_interval(entitlement: &Entitlement, at: EpochMs) -> Interval {
    match &entitlement.window {
        Some(window) => resolve_window(window, at),
        None => Interval::new(EPOCH_MS, FAR_FUTURE_MS),
    }
}

pub struct EntitlementEngine<A> {
    adapter: Arc<A>,
}

impl<A: EntitlementAdapter + 'static> EntitlementEngine<A> {
    pub fn new(adapter: A) -> Self {
        EntitlementEngine {
            adapter: Arc::new(adapter),
        }
    }

    /// Can `actor_id` perform `action` `amount` more times right now?
    ///
    /// Runs a two-fact policy (entitlements, then usage counted over the
    /// entitlement's window) with a single limit rule under the
    /// all-must-allow resolver, so the decision carries the full reason
    /// list, the consume obligation and a trace holding the loaded
    /// entitlements. An action with no entitlement denies with
    /// "No entitlement defined".
    pub async fn check(
        &self,
        actor_id: &str,
        action: &str,
        amount: u32,
        at: Option<EpochMs>,
    ) -> Result<Decision<Verdict>, PolicyError> {
        let input = CheckInput {
            actor_id: actor_id.into(),
            action: action.into(),
            amount,
            at: at.unwrap_or_else(now_ms),
        };

        let entitlements_adapter = Arc::clone(&self.adapter);
        let usage_adapter = Arc::clone(&self.adapter);
        let policy: Policy<CheckInput, Verdict> = Policy::new(all_must_allow())
            .with_fact(fact("entitlements", &[], move |input: &CheckInput, _facts| {
                let adapter = Arc::clone(&entitlements_adapter);
                let actor_id = input.actor_id.clone();
                async move {
                    let entitlements = adapter.entitlements(&actor_id).await?;
                    Ok(serde_json::to_value(&entitlements)?)
                }
                .boxed()
            }))
            .with_fact(fact("usage", &["entitlements"], move |input: &CheckInput, facts| {
                let adapter = Arc::clone(&usage_adapter);
                let actor_id = input.actor_id.clone();
                let action = input.action.clone();
                let entitlement = entitlement_for(facts, &action);
                let at = input.at;
                async move {
                    match entitlement {
                        None => Ok(Value::Null),
                        Some(entitlement) => {
                            let interval = counting_interval(&entitlement, at);
                            let used = adapter.usage(&actor_id, &action, &interval).await?;
                            Ok(json!(used))
                        }
                    }
                }
                .boxed()
            }))
            .with_rule(Rule::new("limit", |input: &CheckInput, facts| {
                let Some(entitlement) = entitlement_for(facts, &input.action) else {
                    return deny("No entitlement defined");
                };
                let used = facts.get("usage").and_then(Value::as_u64).unwrap_or(0) as u32;
                let check = check_limit(entitlement.limit, used, input.amount);
                if check.allowed {
                    allow_with(
                        format!("{} of {} remaining", check.remaining, entitlement.limit),
                        check.obligation.into_iter().collect(),
                    )
                } else {
                    deny(format!(
                        "limit reached: {} of {} used",
                        used, entitlement.limit
                    ))
                }
            }));

        policy.evaluate(&input).await
    }

    /// Classifies each queried action as available, exhausted or
    /// unavailable, with quota views and summary arrays.
    pub async fn capabilities(
        &self,
        actor_id: &str,
        actions: &[&str],
        at: Option<EpochMs>,
    ) -> Result<Capabilities, PolicyError> {
        let at = at.unwrap_or_else(now_ms);
        let entitlements = self
            .adapter
            .entitlements(actor_id)
            .await
            .map_err(PolicyError::Adapter)?;

        let mut capabilities = Capabilities {
            actions: IndexMap::new(),
            available: Vec::new(),
            exhausted: Vec::new(),
            unavailable: Vec::new(),
        };
        for &action in actions {
            let capability = match entitlements.get(action) {
                None => ActionCapability::Unavailable {
                    reason: "No entitlement defined".into(),
                },
                Some(entitlement) => {
                    let quota = self.quota_state(actor_id, action, entitlement, at).await?;
                    let check = check_limit(entitlement.limit, quota.used, 1);
                    if check.allowed {
                        ActionCapability::Available {
                            quota: (!entitlement.limit.is_unlimited()).then_some(quota),
                            obligation: check.obligation.unwrap_or_else(|| consume(1)),
                        }
                    } else {
                        let availability = limit_available_at(
                            entitlement.limit,
                            quota.used,
                            entitlement.window.as_ref(),
                            at,
                        );
                        let (reason, opens_at) = match availability {
                            Availability::At { at, reason } => (reason, Some(at)),
                            Availability::Never { reason }
                            | Availability::Unknown { reason } => (reason, None),
                            Availability::Now => ("limit reached".into(), None),
                        };
                        ActionCapability::Exhausted {
                            quota,
                            reason,
                            available_at: opens_at,
                        }
                    }
                }
            };
            match &capability {
                ActionCapability::Available { .. } => capabilities.available.push(action.into()),
                ActionCapability::Exhausted { .. } => capabilities.exhausted.push(action.into()),
                ActionCapability::Unavailable { .. } => {
                    capabilities.unavailable.push(action.into())
                }
            }
            capabilities.actions.insert(action.into(), capability);
        }
        Ok(capabilities)
    }

    /// When the actor can next perform `action`. An unknown action is never
    /// available.
    pub async fn available_at(
        &self,
        actor_id: &str,
        action: &str,
        at: Option<EpochMs>,
    ) -> Result<Availability, PolicyError> {
        let at = at.unwrap_or_else(now_ms);
        let entitlements = self
            .adapter
            .entitlements(actor_id)
            .await
            .map_err(PolicyError::Adapter)?;
        match entitlements.get(action) {
            None => Ok(Availability::Never {
                reason: "No entitlement defined".into(),
            }),
            Some(entitlement) => {
                let interval = counting_interval(entitlement, at);
                let used = self
                    .adapter
                    .usage(actor_id, action, &interval)
                    .await
                    .map_err(PolicyError::Adapter)?;
                Ok(limit_available_at(
                    entitlement.limit,
                    used,
                    entitlement.window.as_ref(),
                    at,
                ))
            }
        }
    }

    /// Uses left for `action` and what bounds them.
    pub async fn remaining_uses(
        &self,
        actor_id: &str,
        action: &str,
        at: Option<EpochMs>,
    ) -> Result<RemainingUses, PolicyError> {
        let at = at.unwrap_or_else(now_ms);
        let entitlements = self
            .adapter
            .entitlements(actor_id)
            .await
            .map_err(PolicyError::Adapter)?;
        match entitlements.get(action) {
            None => Ok(RemainingUses {
                uses: Limit::Count(0),
                limited_by: LimitedBy::NoEntitlement,
            }),
            Some(entitlement) if entitlement.limit.is_unlimited() => Ok(RemainingUses {
                uses: Limit::Unlimited,
                limited_by: LimitedBy::None,
            }),
            Some(entitlement) => {
                let interval = counting_interval(entitlement, at);
                let used = self
                    .adapter
                    .usage(actor_id, action, &interval)
                    .await
                    .map_err(PolicyError::Adapter)?;
                Ok(RemainingUses {
                    uses: remaining_quota(entitlement.limit, used),
                    limited_by: LimitedBy::Entitlement,
                })
            }
        }
    }

    /// Quota view of every entitlement the actor holds, keyed by action in
    /// name order.
    pub async fn dashboard(
        &self,
        actor_id: &str,
        at: Option<EpochMs>,
    ) -> Result<IndexMap<Box<str>, QuotaState>, PolicyError> {
        let at = at.unwrap_or_else(now_ms);
        let entitlements = self
            .adapter
            .entitlements(actor_id)
            .await
            .map_err(PolicyError::Adapter)?;
        let mut actions: Vec<&Box<str>> = entitlements.keys().collect();
        actions.sort();

        let mut dashboard = IndexMap::with_capacity(actions.len());
        for action in actions {
            let state = self
                .quota_state(actor_id, action, &entitlements[action], at)
                .await?;
            dashboard.insert(action.clone(), state);
        }
        Ok(dashboard)
    }

    async fn quota_state(
        &self,
        actor_id: &str,
        action: &str,
        entitlement: &Entitlement,
        at: EpochMs,
    ) -> Result<QuotaState, PolicyError> {
        let interval = counting_interval(entitlement, at);
        let used = self
            .adapter
            .usage(actor_id, action, &interval)
            .await
            .map_err(PolicyError::Adapter)?;
        Ok(QuotaState {
            name: action.into(),
            limit: entitlement.limit,
            used,
            remaining: remaining_quota(entitlement.limit, used),
            window: entitlement.window,
            resets_at: entitlement
                .window
                .as_ref()
                .and_then(|window| next_reset(window, at)),
            interval,
        })
    }
}
