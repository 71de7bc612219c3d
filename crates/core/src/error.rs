//! Error types for the Warden domain.
//!
//! Each bounded context has its own error enum. Tool and backend failures
//! are data that ends up on a record or in front of the fallback handler;
//! only [`SchedulerError`] is returned to the caller of a batch.

use thiserror::Error;

/// A failed call against a model backend.
///
/// Never retried by the scheduler; escalated to the fallback controller.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),
}

/// Errors raised by a tool capability or while preparing to run one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed in {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Could not compute proposed content for {tool_name}: {reason}")]
    PreviewFailed { tool_name: String, reason: String },

    #[error("Tool cancelled: {0}")]
    Cancelled(String),
}

/// Programming-contract violations. These are the only failures that abort
/// a whole batch instead of settling a single record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Duplicate call id in batch: {0}")]
    DuplicateCallId(String),

    #[error("Task {task_id} is already running a batch")]
    BatchInProgress { task_id: String },

    #[error("No call awaiting approval with id: {0}")]
    UnknownCall(String),

    #[error("Invalid transition for {call_id}: {from} -> {to}")]
    InvalidTransition {
        call_id: String,
        from: String,
        to: String,
    },
}
