//! # Warden Core
//!
//! Domain types, traits, and error definitions for the Warden tool-call
//! execution core. This crate has **zero framework dependencies** beyond
//! tokio's sync primitives. It defines the domain model that the policy,
//! routing and scheduler crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is defined as a trait here (tool capabilities,
//! backend clients). Implementations live outside the core. This enables:
//! - Plugging in arbitrary tools by name through the [`ToolRegistry`]
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod event;
pub mod record;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use backend::BackendClient;
pub use error::{BackendError, SchedulerError, ToolError};
pub use event::{CallSummary, EventPublisher, EventStream, TaskEvent};
pub use record::{CallOutcome, PolicyDecision, ToolCallRecord, ToolCallState};
pub use tool::{
    CallOrigin, ProposedContent, Tool, ToolCallRequest, ToolKind, ToolOutput, ToolRegistry,
};
