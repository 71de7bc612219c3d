//! Tool-call scheduler for Warden.
//!
//! A [`Task`] takes the tool calls a model asked for in one turn and drives
//! each of them through policy, optional human review and execution,
//! publishing every state change on the Task's event channel.
//!
//! ```text
//! requests ─▶ Task::schedule_tool_calls
//!               ├─ policy (allow / deny / ask)
//!               ├─ review ◀── ConfirmationHandle::respond
//!               ├─ dependencies, concurrency limit
//!               └─ Tool::execute ─▶ TaskEvent stream
//! ```

pub mod confirmation;
mod review;
pub mod task;

pub use confirmation::{ConfirmationHandle, ConfirmationOutcome};
pub use task::{BatchSummary, Task};
