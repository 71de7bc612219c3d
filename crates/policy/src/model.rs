//! Policy data model: rules and the engine configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_config::PolicyConfig;
use warden_core::PolicyDecision;

use crate::PolicyError;

/// A compiled regular expression over serialized tool arguments.
///
/// Compilation happens on construction, so an invalid pattern fails when a
/// rule set is built or loaded, never during evaluation.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArgsPattern {
    source: String,
    regex: regex_lite::Regex,
}

impl ArgsPattern {
    pub fn new(pattern: &str) -> Result<Self, PolicyError> {
        let regex = regex_lite::Regex::new(pattern).map_err(|e| PolicyError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, serialized_args: &str) -> bool {
        self.regex.is_match(serialized_args)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for ArgsPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArgsPattern").field(&self.source).finish()
    }
}

impl TryFrom<String> for ArgsPattern {
    type Error = PolicyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(&s)
    }
}

impl From<ArgsPattern> for String {
    fn from(p: ArgsPattern) -> Self {
        p.source
    }
}

/// A single admission rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Optional label reported when the rule fires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool the rule applies to; `None` matches every tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    /// Predicate over the serialized arguments; `None` matches any arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_pattern: Option<ArgsPattern>,

    pub decision: PolicyDecision,

    /// Higher wins. Ties are broken by declaration order.
    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub message: String,
}

impl PolicyRule {
    pub fn new(decision: PolicyDecision) -> Self {
        Self {
            name: None,
            tool_name: None,
            args_pattern: None,
            decision,
            priority: 0,
            message: String::new(),
        }
    }

    pub fn for_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_args_pattern(mut self, pattern: &str) -> Result<Self, PolicyError> {
        self.args_pattern = Some(ArgsPattern::new(pattern)?);
        Ok(self)
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Whether the tool-name filter admits `tool_name`.
    pub fn applies_to_tool(&self, tool_name: &str) -> bool {
        self.tool_name.as_deref().is_none_or(|t| t == tool_name)
    }

    /// Whether this rule matches a call to `tool_name` with the given
    /// serialized arguments.
    pub fn matches(&self, tool_name: &str, serialized_args: &str) -> bool {
        self.applies_to_tool(tool_name)
            && self
                .args_pattern
                .as_ref()
                .is_none_or(|p| p.is_match(serialized_args))
    }

    /// Name used in logs and verdicts.
    pub fn label(&self) -> String {
        match (&self.name, &self.tool_name) {
            (Some(name), _) => name.clone(),
            (None, Some(tool)) => format!("{}:{tool}", self.decision),
            (None, None) => format!("{}:*", self.decision),
        }
    }
}

/// Everything the engine needs to decide: rules, default, and mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyEngineConfig {
    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<PolicyRule>,

    /// Used when no rule matches.
    #[serde(default)]
    pub default_decision: PolicyDecision,

    /// No human is present: `AskUser` resolves to `Deny`.
    #[serde(default)]
    pub non_interactive: bool,
}

impl PolicyEngineConfig {
    pub fn new(default_decision: PolicyDecision) -> Self {
        Self {
            rules: Vec::new(),
            default_decision,
            non_interactive: false,
        }
    }

    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn non_interactive(mut self, non_interactive: bool) -> Self {
        self.non_interactive = non_interactive;
        self
    }

    /// Compile the `[policy]` section of the configuration.
    ///
    /// Every argument pattern is compiled here; a bad pattern fails the load.
    pub fn from_settings(settings: &PolicyConfig) -> Result<Self, PolicyError> {
        let mut rules = Vec::with_capacity(settings.rules.len());
        for (index, rc) in settings.rules.iter().enumerate() {
            if matches!(&rc.tool, Some(t) if t.trim().is_empty()) {
                return Err(PolicyError::InvalidRule {
                    index,
                    reason: "tool name cannot be empty".into(),
                });
            }
            let args_pattern = rc
                .args_pattern
                .as_deref()
                .map(ArgsPattern::new)
                .transpose()?;
            rules.push(PolicyRule {
                name: rc.name.clone(),
                tool_name: rc.tool.clone(),
                args_pattern,
                decision: rc.decision,
                priority: rc.priority,
                message: rc.message.clone(),
            });
        }
        Ok(Self {
            rules,
            default_decision: settings.default_decision.unwrap_or_default(),
            non_interactive: settings.non_interactive,
        })
    }
}
