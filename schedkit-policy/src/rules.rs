//! Pure predicate rules over loaded facts, plus the result helpers used to
//! build them.

use crate::decision::{Obligation, Reason, RuleOutcome};
use crate::facts::FactMap;
use serde_json::Value;

/// What a single rule concluded. Deny and skip never carry obligations.
#[derive(Debug, Clone)]
pub enum RuleResult {
    Allow {
        explanation: Box<str>,
        obligations: Vec<Obligation>,
        metadata: Option<Value>,
    },
    Deny {
        explanation: Box<str>,
        metadata: Option<Value>,
    },
    Skip {
        explanation: Box<str>,
        metadata: Option<Value>,
    },
}

impl RuleResult {
    pub fn outcome(&self) -> RuleOutcome {
        match self {
            RuleResult::Allow { .. } => RuleOutcome::Allow,
            RuleResult::Deny { .. } => RuleOutcome::Deny,
            RuleResult::Skip { .. } => RuleOutcome::Skip,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            RuleResult::Allow { explanation, .. }
            | RuleResult::Deny { explanation, .. }
            | RuleResult::Skip { explanation, .. } => explanation,
        }
    }

    /// Attaches metadata that surfaces in the decision's reason entry.
    pub fn with_metadata(mut self, value: Value) -> RuleResult {
        match &mut self {
            RuleResult::Allow { metadata, .. }
            | RuleResult::Deny { metadata, .. }
            | RuleResult::Skip { metadata, .. } => *metadata = Some(value),
        }
        self
    }

    pub(crate) fn metadata(&self) -> Option<&Value> {
        match self {
            RuleResult::Allow { metadata, .. }
            | RuleResult::Deny { metadata, .. }
            | RuleResult::Skip { metadata, .. } => metadata.as_ref(),
        }
    }
}

pub fn allow(explanation: impl Into<Box<str>>) -> RuleResult {
    RuleResult::Allow {
        explanation: explanation.into(),
        obligations: Vec::new(),
        metadata: None,
    }
}

pub fn allow_with(explanation: impl Into<Box<str>>, obligations: Vec<Obligation>) -> RuleResult {
    RuleResult::Allow {
        explanation: explanation.into(),
        obligations,
        metadata: None,
    }
}

pub fn deny(explanation: impl Into<Box<str>>) -> RuleResult {
    RuleResult::Deny {
        explanation: explanation.into(),
        metadata: None,
    }
}

pub fn skip(explanation: impl Into<Box<str>>) -> RuleResult {
    RuleResult::Skip {
        explanation: explanation.into(),
        metadata: None,
    }
}

/// A named synchronous predicate over the input and the loaded facts.
pub struct Rule<I> {
    pub(crate) id: Box<str>,
    check: Box<dyn Fn(&I, &FactMap) -> RuleResult + Send + Sync>,
}

impl<I> Rule<I> {
    pub fn new(
        id: impl Into<Box<str>>,
        check: impl Fn(&I, &FactMap) -> RuleResult + Send + Sync + 'static,
    ) -> Rule<I> {
        Rule {
            id: id.into(),
            check: Box::new(check),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn evaluate(&self, input: &I, facts: &FactMap) -> RuleResult {
        (self.check)(input, facts)
    }
}

/// A rule id paired with what it returned; the slice handed to resolvers,
/// in rule order.
pub struct EvaluatedRule {
    pub rule: Box<str>,
    pub result: RuleResult,
}

impl EvaluatedRule {
    pub(crate) fn reason(&self) -> Reason {
        Reason {
            rule: self.rule.clone(),
            outcome: self.result.outcome(),
            explanation: self.result.explanation().into(),
            metadata: self.result.metadata().cloned(),
        }
    }
}
