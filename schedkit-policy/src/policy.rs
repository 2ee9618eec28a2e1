//! Policy assembly and evaluation: load facts, run every rule in order,
//! resolve the outcome, collect obligations and the trace.

use crate::decision::{Decision, Trace};
use crate::error::PolicyError;
use crate::facts::{load_facts, FactDef, FactMap};
use crate::rules::{EvaluatedRule, Rule, RuleResult};
use chrono::Utc;
use std::time::Instant;

/// Turns the ordered rule results plus the input and facts into the final
/// outcome value.
pub type Resolver<I, O> = Box<dyn Fn(&[EvaluatedRule], &I, &FactMap) -> O + Send + Sync>;

/// Facts + rules + resolver. Stateless; every evaluation is independent.
pub struct Policy<I, O> {
    facts: Vec<FactDef<I>>,
    rules: Vec<Rule<I>>,
    resolver: Resolver<I, O>,
}

impl<I: Sync, O> Policy<I, O> {
    pub fn new(resolver: Resolver<I, O>) -> Policy<I, O> {
        Policy {
            facts: Vec::new(),
            rules: Vec::new(),
            resolver,
        }
    }

    pub fn with_fact(mut self, fact: FactDef<I>) -> Self {
        self.facts.push(fact);
        self
    }

    pub fn with_rule(mut self, rule: Rule<I>) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluates the policy: facts load in topological order, then every
    /// rule runs in list order (no short-circuiting; the reasons are the
    /// product, not just the outcome). Fact-graph violations and loader
    /// errors fail the whole evaluation; no partial decision is returned.
    pub async fn evaluate(&self, input: &I) -> Result<Decision<O>, PolicyError> {
        let evaluated_at = Utc::now().timestamp_millis();
        let started = Instant::now();

        let facts = load_facts(&self.facts, input).await?;

        let mut evaluated = Vec::with_capacity(self.rules.len());
        let mut obligations = Vec::new();
        for rule in &self.rules {
            let result = rule.evaluate(input, &facts);
            if let RuleResult::Allow {
                obligations: rule_obligations,
                ..
            } = &result
            {
                obligations.extend(rule_obligations.iter().cloned());
            }
            evaluated.push(EvaluatedRule {
                rule: rule.id.clone(),
                result,
            });
        }

        let outcome = (self.resolver)(&evaluated, input, &facts);
        let reasons = evaluated.iter().map(EvaluatedRule::reason).collect();

        Ok(Decision {
            outcome,
            reasons,
            obligations,
            trace: Trace {
                evaluated_at,
                duration_ms: started.elapsed().as_millis() as u64,
                facts,
            },
        })
    }
}
