//! Policy engine: declarative admission control for tool calls.
//!
//! Every tool call is checked against an ordered rule set *before* anything
//! else happens to it. The answer is one of three decisions:
//!
//! ```text
//! ┌─────────────┐    ┌──────────────┐    ┌─────────────┐
//! │  Scheduler   │───▶│   Policy     │───▶│  Decision    │
//! │  (tool call) │    │   Engine     │    │  Allow       │
//! └─────────────┘    └──────────────┘    │  Deny        │
//!                                        │  AskUser     │
//!                                        └─────────────┘
//! ```
//!
//! Rules are matched on tool name and on a regular expression over the
//! serialized arguments. The highest priority match wins; equal priorities
//! go to the rule declared first. With no match the configured default
//! applies. In non-interactive mode `AskUser` is always turned into `Deny`.
//!
//! # Example
//!
//! ```toml
//! [policy]
//! default_decision = "allow"
//!
//! [[policy.rules]]
//! name = "no-delete"
//! tool = "delete_file"
//! decision = "deny"
//! priority = 10
//! message = "Deleting files is not allowed"
//! ```

mod engine;
mod model;

pub use engine::{PolicyEngine, PolicyVerdict, evaluate};
pub use model::{ArgsPattern, PolicyEngineConfig, PolicyRule};
pub use warden_core::PolicyDecision;

/// Errors from the policy subsystem. All of them surface while a rule set
/// is being built; evaluation itself cannot fail.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid argument pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("invalid rule {index}: {reason}")]
    InvalidRule { index: usize, reason: String },
}
