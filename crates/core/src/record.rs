//! Tool-call records and their lifecycle.
//!
//! ```text
//! VALIDATING ──▶ SCHEDULED ──▶ EXECUTING ──▶ SUCCEEDED | FAILED | CANCELLED
//!     │              ▲
//!     ├──▶ AWAITING_APPROVAL ──▶ CANCELLED
//!     └──▶ REJECTED | FAILED | CANCELLED
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SchedulerError;
use crate::tool::{ProposedContent, ToolCallRequest, ToolOutput};

/// Admission-control verdict for one tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    Allow,
    Deny,
    #[default]
    AskUser,
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
            Self::AskUser => "ask_user",
        })
    }
}

/// Lifecycle state of a single tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallState {
    Validating,
    AwaitingApproval,
    Scheduled,
    Executing,
    Succeeded,
    Failed,
    Rejected,
    Cancelled,
}

impl ToolCallState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Rejected | Self::Cancelled
        )
    }

    /// Whether `self -> next` is a legal edge of the lifecycle.
    pub fn can_transition_to(self, next: ToolCallState) -> bool {
        use ToolCallState::*;
        matches!(
            (self, next),
            (Validating, Scheduled | AwaitingApproval | Rejected | Failed | Cancelled)
                | (AwaitingApproval, Scheduled | Cancelled)
                | (Scheduled, Executing | Failed | Cancelled)
                | (Executing, Succeeded | Failed | Cancelled)
        )
    }
}

impl fmt::Display for ToolCallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validating => "validating",
            Self::AwaitingApproval => "awaiting_approval",
            Self::Scheduled => "scheduled",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        })
    }
}

/// How a tool call settled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    Succeeded { output: ToolOutput },
    /// Blocked by policy. A normal outcome, not an error.
    Rejected { reason: String },
    Failed { error: String },
    /// Not treated as an error for reporting purposes.
    Cancelled { reason: String },
}

impl CallOutcome {
    /// The terminal state this outcome puts a record in.
    pub fn state(&self) -> ToolCallState {
        match self {
            Self::Succeeded { .. } => ToolCallState::Succeeded,
            Self::Rejected { .. } => ToolCallState::Rejected,
            Self::Failed { .. } => ToolCallState::Failed,
            Self::Cancelled { .. } => ToolCallState::Cancelled,
        }
    }

    /// One-line, human-readable summary for a presentation layer.
    pub fn summary(&self) -> String {
        match self {
            Self::Succeeded { output } => {
                let first = output.output.lines().next().unwrap_or("");
                if first.is_empty() {
                    "completed".to_string()
                } else {
                    format!("completed: {first}")
                }
            }
            Self::Rejected { reason } => format!("blocked by policy: {reason}"),
            Self::Failed { error } => format!("error: {error}"),
            Self::Cancelled { reason } => format!("cancelled: {reason}"),
        }
    }
}

/// The scheduler's own unit of work: one request plus everything that
/// happened to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub request: ToolCallRequest,
    pub state: ToolCallState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<PolicyDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_content: Option<ProposedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CallOutcome>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl ToolCallRecord {
    pub fn new(request: ToolCallRequest) -> Self {
        Self {
            request,
            state: ToolCallState::Validating,
            decision: None,
            proposed_content: None,
            outcome: None,
            scheduled_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.request.id
    }

    pub fn tool_name(&self) -> &str {
        &self.request.name
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Move to a non-terminal state.
    pub fn transition(&mut self, next: ToolCallState) -> Result<(), SchedulerError> {
        self.check(next)?;
        if next == ToolCallState::Executing {
            self.started_at = Some(Utc::now());
        }
        self.state = next;
        Ok(())
    }

    /// Move to the terminal state implied by `outcome`.
    pub fn settle(&mut self, outcome: CallOutcome) -> Result<(), SchedulerError> {
        self.check(outcome.state())?;
        self.state = outcome.state();
        self.outcome = Some(outcome);
        self.ended_at = Some(Utc::now());
        Ok(())
    }

    fn check(&self, next: ToolCallState) -> Result<(), SchedulerError> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(SchedulerError::InvalidTransition {
                call_id: self.request.id.clone(),
                from: self.state.to_string(),
                to: next.to_string(),
            })
        }
    }
}
