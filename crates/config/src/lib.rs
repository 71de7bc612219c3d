//! Configuration loading, validation, and management for Warden.
//!
//! Loads configuration from `~/.warden/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`WardenConfig`] is read-only session configuration: the scheduler,
//! policy engine and router only ever read it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use warden_core::PolicyDecision;

/// The root configuration structure.
///
/// Maps directly to `~/.warden/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WardenConfig {
    /// Backend selection and fallback
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Admission-control rules for tool calls
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Tool-call scheduling
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Model value meaning "let the router decide".
pub const AUTO_MODEL: &str = "auto";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Backend used when nothing else decides
    #[serde(default = "default_backend")]
    pub default_backend: String,

    /// Cheaper backend picked for simple requests
    #[serde(default = "default_fast_backend")]
    pub fast_backend: String,

    /// Backend offered to the fallback handler when the active one fails
    #[serde(default = "default_fast_backend")]
    pub fallback_backend: String,

    /// Backend that answers routing classification prompts
    #[serde(default = "default_fast_backend")]
    pub classifier_backend: String,

    /// Explicit model override, or `"auto"` to route per request
    #[serde(default = "default_model")]
    pub model: String,

    /// Whether the classifier strategy takes part in routing
    #[serde(default = "default_true")]
    pub use_classifier: bool,
}

fn default_backend() -> String {
    "primary".into()
}
fn default_fast_backend() -> String {
    "fast".into()
}
fn default_model() -> String {
    AUTO_MODEL.into()
}
fn default_true() -> bool {
    true
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
            fast_backend: default_fast_backend(),
            fallback_backend: default_fast_backend(),
            classifier_backend: default_fast_backend(),
            model: default_model(),
            use_classifier: true,
        }
    }
}

impl RoutingConfig {
    /// The explicit model override, if one is configured.
    pub fn model_override(&self) -> Option<&str> {
        let model = self.model.trim();
        if model.is_empty() || model.eq_ignore_ascii_case(AUTO_MODEL) {
            None
        } else {
            Some(model)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Decision when no rule matches (ask_user when omitted)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_decision: Option<PolicyDecision>,

    /// No human is present; ask_user resolves to deny
    #[serde(default)]
    pub non_interactive: bool,

    /// Rules in declaration order
    #[serde(default)]
    pub rules: Vec<PolicyRuleConfig>,
}

/// Configuration for one policy rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRuleConfig {
    /// Optional label reported when the rule fires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Tool the rule applies to; omitted = every tool
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,

    /// Regular expression over the JSON-serialized arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args_pattern: Option<String>,

    pub decision: PolicyDecision,

    /// Higher wins; ties go to the rule declared first
    #[serde(default)]
    pub priority: i32,

    /// Message shown when the rule fires
    #[serde(default)]
    pub message: String,
}

/// How much human review an allowed call still needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalMode {
    /// Edit and execute tools are shown to a reviewer first.
    #[default]
    Default,
    /// Edit tools run without review; execute tools are still reviewed.
    AutoEdit,
    /// Nothing allowed by policy is reviewed.
    Yolo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub approval_mode: ApprovalMode,

    /// Maximum tool executions running at once within one task
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_max_concurrency() -> usize {
    8
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            approval_mode: ApprovalMode::Default,
            max_concurrency: default_max_concurrency(),
        }
    }
}

impl WardenConfig {
    /// Load configuration from the default path (~/.warden/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `WARDEN_BACKEND`: default backend
    /// - `WARDEN_MODEL`: model override (`auto` to route)
    /// - `WARDEN_NON_INTERACTIVE`: `1`/`true` forces non-interactive policy
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(backend) = lookup("WARDEN_BACKEND") {
            self.routing.default_backend = backend;
        }
        if let Some(model) = lookup("WARDEN_MODEL") {
            self.routing.model = model;
        }
        if let Some(flag) = lookup("WARDEN_NON_INTERACTIVE") {
            self.policy.non_interactive = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            );
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".warden")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let backends = [
            ("routing.default_backend", &self.routing.default_backend),
            ("routing.fast_backend", &self.routing.fast_backend),
            ("routing.fallback_backend", &self.routing.fallback_backend),
            ("routing.classifier_backend", &self.routing.classifier_backend),
        ];
        for (field, value) in backends {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "{field} cannot be empty"
                )));
            }
        }

        if self.scheduler.max_concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "scheduler.max_concurrency must be at least 1".into(),
            ));
        }

        for (i, rule) in self.policy.rules.iter().enumerate() {
            if matches!(&rule.tool, Some(t) if t.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "policy.rules[{i}].tool cannot be empty (omit it to match every tool)"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
