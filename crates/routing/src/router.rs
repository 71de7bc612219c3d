//! Model router: the session's standard strategy chain.
//!
//! Evaluation order is fallback, override, classifier, then default. The
//! first strategy that decides wins.

use std::sync::Arc;
use tracing::info;
use warden_core::BackendClient;

use crate::classifier::ClassifierStrategy;
use crate::composite::CompositeStrategy;
use crate::session::ModelSession;
use crate::strategy::{
    DefaultStrategy, FallbackStrategy, OverrideStrategy, RoutingContext, RoutingDecision,
    TerminalStrategy,
};

/// Name of the standard chain; prefixes every decision source.
pub const ROUTER_NAME: &str = "agent-router";

/// Picks the backend for each request of one session.
pub struct ModelRouter {
    session: Arc<ModelSession>,
    client: Arc<dyn BackendClient>,
    chain: CompositeStrategy,
}

impl ModelRouter {
    /// Create a router using the standard chain.
    pub fn new(session: Arc<ModelSession>, client: Arc<dyn BackendClient>) -> Self {
        let chain = CompositeStrategy::new(
            ROUTER_NAME,
            vec![
                Box::new(FallbackStrategy),
                Box::new(OverrideStrategy),
                Box::new(ClassifierStrategy),
            ],
            Box::new(DefaultStrategy),
        );
        Self::with_chain(session, client, chain)
    }

    /// Create a router with a custom chain.
    pub fn with_chain(
        session: Arc<ModelSession>,
        client: Arc<dyn BackendClient>,
        chain: CompositeStrategy,
    ) -> Self {
        Self {
            session,
            client,
            chain,
        }
    }

    pub fn session(&self) -> &Arc<ModelSession> {
        &self.session
    }

    /// Names of the chain members in evaluation order.
    pub fn strategies(&self) -> Vec<&str> {
        self.chain.members()
    }

    /// Decide which backend handles this request.
    pub async fn route(&self, context: &RoutingContext) -> RoutingDecision {
        let decision = self
            .chain
            .route(context, &self.session, self.client.as_ref())
            .await;

        info!(
            session = %self.session.session_id(),
            backend = %decision.backend,
            source = %decision.metadata.source,
            latency_ms = decision.metadata.latency_ms,
            "Routing decision"
        );

        decision
    }
}
