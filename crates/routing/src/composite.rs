//! Ordered strategy chain.
//!
//! Children are tried in order; the first one that decides wins. The
//! terminal strategy closes the chain, so a composite always decides.

use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;
use warden_core::BackendClient;

use crate::session::ModelSession;
use crate::strategy::{RoutingContext, RoutingDecision, RoutingStrategy, TerminalStrategy};

/// A named chain of strategies ending in a terminal one.
///
/// The winning decision's source is rewritten to `"{name}/{child source}"`
/// and its latency to the time the whole chain took.
pub struct CompositeStrategy {
    name: String,
    strategies: Vec<Box<dyn RoutingStrategy>>,
    terminal: Box<dyn TerminalStrategy>,
}

impl CompositeStrategy {
    pub fn new(
        name: impl Into<String>,
        strategies: Vec<Box<dyn RoutingStrategy>>,
        terminal: Box<dyn TerminalStrategy>,
    ) -> Self {
        Self {
            name: name.into(),
            strategies,
            terminal,
        }
    }

    /// Names of the chain members in evaluation order, terminal last.
    pub fn members(&self) -> Vec<&str> {
        self.strategies
            .iter()
            .map(|s| s.name())
            .chain(std::iter::once(self.terminal.name()))
            .collect()
    }

    fn finalize(&self, mut decision: RoutingDecision, start: Instant) -> RoutingDecision {
        decision.metadata.source = format!("{}/{}", self.name, decision.metadata.source);
        decision.metadata.latency_ms =
            u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        decision
    }
}

#[async_trait]
impl TerminalStrategy for CompositeStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn route(
        &self,
        context: &RoutingContext,
        session: &ModelSession,
        client: &dyn BackendClient,
    ) -> RoutingDecision {
        let start = Instant::now();

        for strategy in &self.strategies {
            if let Some(decision) = strategy.route(context, session, client).await {
                return self.finalize(decision, start);
            }
            debug!(chain = %self.name, strategy = strategy.name(), "Strategy deferred");
        }

        let decision = self.terminal.route(context, session, client).await;
        self.finalize(decision, start)
    }
}
