//! Routing contract and the simple strategies.
//!
//! A [`RoutingStrategy`] may decline to decide (returns `None`) so that the
//! next strategy in a chain gets a turn. A [`TerminalStrategy`] always
//! decides and closes a chain.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use warden_core::BackendClient;

use crate::session::ModelSession;

/// What a strategy may look at when picking a backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingContext {
    /// The request about to be sent (usually the latest user message).
    pub request: String,

    /// Recent conversation turns, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

impl RoutingContext {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<String>) -> Self {
        self.history = history;
        self
    }
}

/// Why and how a backend was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingMetadata {
    /// Which strategy decided (e.g. `"default"`, `"agent-router/classifier"`).
    pub source: String,
    /// Time spent deciding.
    pub latency_ms: u64,
    pub reasoning: String,
}

/// The selected backend plus metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub backend: String,
    pub metadata: RoutingMetadata,
}

impl RoutingDecision {
    pub fn new(
        backend: impl Into<String>,
        source: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            backend: backend.into(),
            metadata: RoutingMetadata {
                source: source.into(),
                latency_ms: 0,
                reasoning: reasoning.into(),
            },
        }
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.metadata.latency_ms = latency_ms;
        self
    }
}

/// A strategy that may or may not reach a decision.
///
/// Implementations must not change session state; only the caller acts on
/// the decision.
#[async_trait]
pub trait RoutingStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn route(
        &self,
        context: &RoutingContext,
        session: &ModelSession,
        client: &dyn BackendClient,
    ) -> Option<RoutingDecision>;
}

/// A strategy that always decides.
#[async_trait]
pub trait TerminalStrategy: Send + Sync {
    fn name(&self) -> &str;

    async fn route(
        &self,
        context: &RoutingContext,
        session: &ModelSession,
        client: &dyn BackendClient,
    ) -> RoutingDecision;
}

/// Always routes to the configured default backend, instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

#[async_trait]
impl TerminalStrategy for DefaultStrategy {
    fn name(&self) -> &str {
        "default"
    }

    async fn route(
        &self,
        _context: &RoutingContext,
        session: &ModelSession,
        _client: &dyn BackendClient,
    ) -> RoutingDecision {
        let backend = &session.config().default_backend;
        RoutingDecision::new(
            backend.clone(),
            "default",
            format!("Routing to default backend: {backend}"),
        )
    }
}

/// Routes to the fallback backend once the session has switched to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackStrategy;

#[async_trait]
impl RoutingStrategy for FallbackStrategy {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn route(
        &self,
        _context: &RoutingContext,
        session: &ModelSession,
        _client: &dyn BackendClient,
    ) -> Option<RoutingDecision> {
        let backend = session.fallback_backend()?;
        let reasoning = format!("Session is in fallback mode. Using: {backend}");
        Some(RoutingDecision::new(backend, "fallback", reasoning))
    }
}

/// Honors an explicit model set in configuration instead of routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideStrategy;

#[async_trait]
impl RoutingStrategy for OverrideStrategy {
    fn name(&self) -> &str {
        "override"
    }

    async fn route(
        &self,
        _context: &RoutingContext,
        session: &ModelSession,
        _client: &dyn BackendClient,
    ) -> Option<RoutingDecision> {
        let model = session.config().model_override()?;
        Some(RoutingDecision::new(
            model,
            "override",
            format!("Routing bypassed by configured model. Using: {model}"),
        ))
    }
}
