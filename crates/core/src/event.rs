//! Task events: the stream a Task publishes to its observer.
//!
//! A Task is handed an [`EventPublisher`] at construction and writes every
//! record transition to it. The subscriber owns the matching
//! [`EventStream`] and its own read loop. Publishing never blocks and never
//! fails: a closed subscriber simply stops receiving.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::record::{CallOutcome, ToolCallState};
use crate::tool::ProposedContent;

/// Per-call entry of a batch-completion summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSummary {
    pub call_id: String,
    pub tool_name: String,
    pub state: ToolCallState,
    pub summary: String,
}

/// Events emitted by a Task while it drives a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A tool call moved to a new state.
    ToolCallUpdate {
        task_id: String,
        context_id: String,
        call_id: String,
        tool_name: String,
        state: ToolCallState,
        /// Present when the call is waiting for a reviewer.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        proposed_content: Option<ProposedContent>,
        /// Present on terminal states.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<CallOutcome>,
        timestamp: DateTime<Utc>,
    },

    /// Every call of the batch is terminal. Outcomes are in request order.
    BatchCompleted {
        task_id: String,
        context_id: String,
        outcomes: Vec<CallSummary>,
        timestamp: DateTime<Utc>,
    },
}

impl TaskEvent {
    /// Wire name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ToolCallUpdate { .. } => "tool_call_update",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }

    pub fn task_id(&self) -> &str {
        match self {
            Self::ToolCallUpdate { task_id, .. } | Self::BatchCompleted { task_id, .. } => task_id,
        }
    }
}

/// Receiving half handed to the external subscriber.
pub type EventStream = mpsc::UnboundedReceiver<TaskEvent>;

/// Append-only, non-blocking output channel of a Task.
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: mpsc::UnboundedSender<TaskEvent>,
}

impl EventPublisher {
    /// Create a publisher and the stream its subscriber reads from.
    pub fn channel() -> (Self, EventStream) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Publish an event to the subscriber.
    pub fn publish(&self, event: TaskEvent) {
        // A dropped subscriber is fine; the Task keeps running.
        if self.sender.send(event).is_err() {
            tracing::trace!("Event subscriber gone, dropping event");
        }
    }

    /// Whether the subscriber has dropped its stream.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
