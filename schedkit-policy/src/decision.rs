use crate::facts::FactMap;
use schedkit_time::EpochMs;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A declarative instruction attached to an allow result. Opaque to the
/// engine; the caller performs the corresponding side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obligation {
    pub kind: Box<str>,
    pub params: Value,
}

impl Obligation {
    pub fn new(kind: impl Into<Box<str>>, params: Value) -> Obligation {
        Obligation {
            kind: kind.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOutcome {
    Allow,
    Deny,
    Skip,
}

/// One entry per evaluated rule, in the policy's rule order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reason {
    pub rule: Box<str>,
    pub outcome: RuleOutcome,
    pub explanation: Box<str>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Evaluation record: when the decision was made, how long it took, and the
/// loaded fact snapshot it was made from.
#[derive(Debug, Clone)]
pub struct Trace {
    pub evaluated_at: EpochMs,
    pub duration_ms: u64,
    pub facts: FactMap,
}

/// Result of a policy evaluation, generic over the resolver's outcome type.
#[derive(Debug, Clone)]
pub struct Decision<O> {
    pub outcome: O,
    pub reasons: Vec<Reason>,
    pub obligations: Vec<Obligation>,
    pub trace: Trace,
}

/// The outcome of the boolean built-in resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub allowed: bool,
}
