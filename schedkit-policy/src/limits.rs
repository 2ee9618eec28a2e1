//! Limit math: pure functions deciding whether a consumption fits a limit,
//! what remains, and when an exhausted limit opens up again.

use crate::decision::Obligation;
use schedkit_time::{describe_window, next_reset, EpochMs, WindowSpec};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An entitlement ceiling: a finite use count or no ceiling at all. Also
/// used for "remaining" amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Limit {
    Unlimited,
    Count(u32),
}

impl Limit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Limit::Unlimited)
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Unlimited => write!(f, "unlimited"),
            Limit::Count(n) => write!(f, "{}", n),
        }
    }
}

/// The consume obligation a successful limited check carries: the caller
/// must record `amount` uses when it executes the decision.
pub fn consume(amount: u32) -> Obligation {
    Obligation::new("consume", json!({ "amount": amount }))
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitCheck {
    pub allowed: bool,
    pub remaining: Limit,
    pub obligation: Option<Obligation>,
}

/// Whether consuming `amount` more uses fits within `limit` given `used`.
/// An unlimited limit allows without an obligation; a finite one carries a
/// consume obligation exactly when it admits the consumption.
pub fn check_limit(limit: Limit, used: u32, amount: u32) -> LimitCheck {
    match limit {
        Limit::Unlimited => LimitCheck {
            allowed: true,
            remaining: Limit::Unlimited,
            obligation: None,
        },
        Limit::Count(cap) => {
            if used + amount > cap {
                LimitCheck {
                    allowed: false,
                    remaining: Limit::Count(cap.saturating_sub(used)),
                    obligation: None,
                }
            } else {
                LimitCheck {
                    allowed: true,
                    remaining: Limit::Count(cap - used - amount),
                    obligation: Some(consume(amount)),
                }
            }
        }
    }
}

/// Uses left before the limit bites. Never negative.
pub fn remaining_quota(limit: Limit, used: u32) -> Limit {
    match limit {
        Limit::Unlimited => Limit::Unlimited,
        Limit::Count(cap) => Limit::Count(cap.saturating_sub(used)),
    }
}

/// When an action is (or becomes) available under a limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Now,
    At { at: EpochMs, reason: Box<str> },
    Never { reason: Box<str> },
    Unknown { reason: Box<str> },
}

/// When the actor can next perform the action: immediately while under the
/// limit, at the window's next reset for calendar and sliding windows, and
/// never for windowless, lifetime or fixed limits.
pub fn available_at(
    limit: Limit,
    used: u32,
    window: Option<&WindowSpec>,
    at: EpochMs,
) -> Availability {
    match limit {
        Limit::Unlimited => Availability::Now,
        Limit::Count(cap) if used < cap => Availability::Now,
        Limit::Count(cap) => match window {
            None => Availability::Never {
                reason: format!("limit of {} reached with no reset window", cap).into(),
            },
            Some(WindowSpec::Lifetime) => Availability::Never {
                reason: format!("lifetime limit of {} reached", cap).into(),
            },
            Some(WindowSpec::Fixed(_)) => Availability::Never {
                reason: format!("fixed-window limit of {} reached", cap).into(),
            },
            Some(window) => match next_reset(window, at) {
                Some(reset) => Availability::At {
                    at: reset,
                    reason: format!("limit of {} resets {}", cap, describe_window(window)).into(),
                },
                None => Availability::Unknown {
                    reason: "window has no computable reset".into(),
                },
            },
        },
    }
}
