//! Tool trait: the abstraction over agent capabilities.
//!
//! Tool bodies are opaque to the core: the scheduler only knows a tool by
//! name, kind, schema, an `execute` entry point and an optional preview of
//! the change it is about to make.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;

/// Who asked for a tool call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallOrigin {
    /// Requested by the model in its response.
    #[default]
    Model,
    /// Requested directly by the client (e.g. a user-issued command).
    Client,
}

/// A request to execute a tool.
///
/// Immutable once handed to the scheduler; the scheduler reads it and
/// derives its own records from clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Unique call ID within a batch (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,

    /// Whether the model or the client originated this call
    #[serde(default)]
    pub origin: CallOrigin,

    /// Correlates the call with the prompt/turn that produced it
    #[serde(default)]
    pub prompt_id: String,

    /// Calls in the same batch whose results this call needs first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            origin: CallOrigin::Model,
            prompt_id: String::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: CallOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_prompt_id(mut self, prompt_id: impl Into<String>) -> Self {
        self.prompt_id = prompt_id.into();
        self
    }

    /// Declare that this call must wait for `call_id` to succeed.
    pub fn depends_on(mut self, call_id: impl Into<String>) -> Self {
        self.depends_on.push(call_id.into());
        self
    }
}

/// Broad category of what a tool does to the outside world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Read,
    Edit,
    Execute,
    #[default]
    Other,
}

impl ToolKind {
    /// Kinds that change external state and should be shown to a human first.
    pub fn requires_review(self) -> bool {
        matches!(self, ToolKind::Edit | ToolKind::Execute)
    }
}

/// A preview of the change a tool call would make, e.g. a pending diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedContent {
    /// Short description shown above the preview (e.g. a file path)
    pub title: String,

    /// The preview body (e.g. a unified diff)
    pub body: String,
}

/// The successful result of a tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The output content
    pub output: String,

    /// Optional structured data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolOutput {
    pub fn text(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            data: None,
        }
    }
}

/// The core Tool trait.
///
/// Implementations are registered in the [`ToolRegistry`] and invoked by
/// name. Argument validation against [`Tool::parameters_schema`] is the
/// tool's own concern.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "read_file", "shell").
    fn name(&self) -> &str;

    /// Human-readable summary, shown to reviewers alongside the preview.
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    fn kind(&self) -> ToolKind {
        ToolKind::Other
    }

    /// Whether an allowed call must still be reviewed by a human.
    fn requires_review(&self) -> bool {
        self.kind().requires_review()
    }

    /// Compute a preview of the change this call would make.
    ///
    /// Called before a call is put in front of a reviewer. `Ok(None)` means
    /// there is nothing to preview.
    async fn proposed_content(
        &self,
        _arguments: &serde_json::Value,
    ) -> std::result::Result<Option<ProposedContent>, ToolError> {
        Ok(None)
    }

    /// Execute the tool with the given arguments.
    ///
    /// Long-running tools should watch `cancel` and return early once it
    /// fires; the scheduler does not wait for them after cancellation.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        cancel: CancellationToken,
    ) -> std::result::Result<ToolOutput, ToolError>;
}

/// A registry of available tools, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `tool` under its own name; a later tool with the same name wins.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
