//! Policy evaluation.
//!
//! [`evaluate`] is the pure decision function. [`PolicyEngine`] wraps a
//! config behind a lock so it can be shared by many tasks and extended at
//! runtime ("always allow this tool"), while each evaluation still runs
//! against one consistent snapshot.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::RwLock;
use tracing::{debug, info, warn};
use warden_core::{PolicyDecision, ToolCallRequest};

use crate::model::{PolicyEngineConfig, PolicyRule};

/// The outcome of evaluating a tool call against a policy config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub decision: PolicyDecision,
    /// Which rule fired, if any.
    pub rule: Option<String>,
    /// Human-readable explanation.
    pub message: String,
    /// `true` when an `AskUser` result was turned into `Deny` because no
    /// human is present.
    pub coerced: bool,
}

impl PolicyVerdict {
    fn from_rule(rule: &PolicyRule) -> Self {
        Self {
            decision: rule.decision,
            rule: Some(rule.label()),
            message: if rule.message.is_empty() {
                format!("Policy rule '{}' matched", rule.label())
            } else {
                rule.message.clone()
            },
            coerced: false,
        }
    }

    fn from_default(decision: PolicyDecision) -> Self {
        Self {
            decision,
            rule: None,
            message: format!("No policy rule matched; default is {decision}"),
            coerced: false,
        }
    }
}

/// Decide whether `request` may run under `config`.
///
/// Pure and deterministic: same inputs, same verdict. Never fails; when
/// nothing applies the config's default decision is used.
pub fn evaluate(request: &ToolCallRequest, config: &PolicyEngineConfig) -> PolicyVerdict {
    let serialized = serde_json::to_string(&request.arguments).unwrap_or_default();

    // Strictly greater keeps the earliest declared rule on priority ties.
    let mut winner: Option<&PolicyRule> = None;
    for rule in &config.rules {
        if !rule.matches(&request.name, &serialized) {
            continue;
        }
        if winner.is_none_or(|w| rule.priority > w.priority) {
            winner = Some(rule);
        }
    }

    let mut verdict = match winner {
        Some(rule) => PolicyVerdict::from_rule(rule),
        None => PolicyVerdict::from_default(config.default_decision),
    };

    if config.non_interactive && verdict.decision == PolicyDecision::AskUser {
        verdict.decision = PolicyDecision::Deny;
        verdict.coerced = true;
        verdict.message = format!(
            "{} (no user available to confirm in non-interactive mode)",
            verdict.message
        );
    }

    verdict
}

/// Shared, thread-safe policy engine.
pub struct PolicyEngine {
    config: RwLock<PolicyEngineConfig>,
    /// Tools the reviewer allowed for the rest of the session.
    always_allowed: RwLock<HashSet<String>>,
}

impl PolicyEngine {
    pub fn new(config: PolicyEngineConfig) -> Self {
        Self {
            config: RwLock::new(config),
            always_allowed: RwLock::new(HashSet::new()),
        }
    }

    /// Evaluate a tool call against the current rule set.
    pub fn evaluate(&self, request: &ToolCallRequest) -> PolicyVerdict {
        let verdict = {
            let config = self.config.read().unwrap_or_else(|e| e.into_inner());
            evaluate(request, &config)
        };

        match verdict.decision {
            PolicyDecision::Deny => warn!(
                call_id = %request.id,
                tool = %request.name,
                rule = ?verdict.rule,
                "Policy DENIED tool call: {}",
                verdict.message
            ),
            PolicyDecision::AskUser => info!(
                call_id = %request.id,
                tool = %request.name,
                rule = ?verdict.rule,
                "Policy requires CONFIRMATION: {}",
                verdict.message
            ),
            PolicyDecision::Allow => debug!(
                call_id = %request.id,
                tool = %request.name,
                rule = ?verdict.rule,
                "Policy ALLOWED tool call"
            ),
        }

        verdict
    }

    /// Append a rule at runtime.
    pub fn add_rule(&self, rule: PolicyRule) {
        info!(rule = %rule.label(), "Policy rule added");
        self.config
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .rules
            .push(rule);
    }

    /// Stop asking about `tool_name` for the rest of the session.
    ///
    /// The new rule outranks every ask-user rule for the tool. Deny rules of
    /// higher priority still win, so narrower blocks keep applying. Calling
    /// it again for the same tool changes nothing.
    pub fn allow_tool(&self, tool_name: &str) {
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut allowed = self
            .always_allowed
            .write()
            .unwrap_or_else(|e| e.into_inner());
        if !allowed.insert(tool_name.to_string()) {
            debug!(tool = %tool_name, "Tool already allowed for the session");
            return;
        }

        let top_ask = config
            .rules
            .iter()
            .filter(|r| r.decision == PolicyDecision::AskUser && r.applies_to_tool(tool_name))
            .map(|r| r.priority)
            .max();
        let priority = top_ask.map_or(0, |p| p.saturating_add(1));
        let rule = PolicyRule::new(PolicyDecision::Allow)
            .for_tool(tool_name)
            .with_priority(priority)
            .named(format!("always-allow:{tool_name}"));
        info!(tool = %tool_name, priority, "Tool allowed for the rest of the session");

        // Nothing outranks i32::MAX; declaring the rule ahead of the first
        // ask rule at that priority wins the tie instead.
        let ahead_of = (top_ask == Some(i32::MAX))
            .then(|| {
                config.rules.iter().position(|r| {
                    r.decision == PolicyDecision::AskUser
                        && r.priority == i32::MAX
                        && r.applies_to_tool(tool_name)
                })
            })
            .flatten();
        match ahead_of {
            Some(index) => config.rules.insert(index, rule),
            None => config.rules.push(rule),
        }
    }

    /// Whether a reviewer allowed `tool_name` for the rest of the session.
    ///
    /// Such a tool also skips the review gate for allowed calls.
    pub fn is_always_allowed(&self, tool_name: &str) -> bool {
        self.always_allowed
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(tool_name)
    }

    /// A copy of the current configuration.
    pub fn snapshot(&self) -> PolicyEngineConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_non_interactive(&self) -> bool {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .non_interactive
    }

    pub fn rule_count(&self) -> usize {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .rules
            .len()
    }
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyEngineConfig::default())
    }
}
