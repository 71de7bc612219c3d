//! Classifier strategy: lets a small backend judge request complexity.
//!
//! The classifier backend receives the request plus a few recent turns and
//! must answer with JSON:
//!
//! ```json
//! { "reasoning": "single factual lookup", "complexity": "simple" }
//! ```
//!
//! `simple` routes to the fast backend, `complex` to the default backend.
//! Any failure (backend error, malformed reply) makes the strategy defer.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};
use warden_core::{BackendClient, BackendError};

use crate::session::ModelSession;
use crate::strategy::{RoutingContext, RoutingDecision, RoutingStrategy};

/// How many history turns are shown to the classifier.
const HISTORY_TURNS: usize = 4;

const CLASSIFIER_PROMPT: &str = "You route requests for a coding agent. \
Decide whether the request below is SIMPLE (a single, well-defined step such as \
reading a file or answering a factual question) or COMPLEX (planning, multi-step \
edits, debugging, ambiguous goals). Reply with JSON only: \
{\"reasoning\": \"<one sentence>\", \"complexity\": \"simple\" | \"complex\"}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Complexity {
    Simple,
    Complex,
}

#[derive(Debug, Deserialize)]
struct ClassifierReply {
    #[serde(default)]
    reasoning: String,
    complexity: Complexity,
}

/// Routes on the answer of an auxiliary classification call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierStrategy;

impl ClassifierStrategy {
    fn build_prompt(context: &RoutingContext) -> String {
        let mut prompt = String::from(CLASSIFIER_PROMPT);
        let skip = context.history.len().saturating_sub(HISTORY_TURNS);
        if context.history.len() > skip {
            prompt.push_str("\n\nRecent conversation:\n");
            for turn in &context.history[skip..] {
                prompt.push_str("- ");
                prompt.push_str(turn);
                prompt.push('\n');
            }
        }
        prompt.push_str("\nRequest:\n");
        prompt.push_str(&context.request);
        prompt
    }

    fn parse(value: serde_json::Value) -> Result<ClassifierReply, BackendError> {
        serde_json::from_value(value).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RoutingStrategy for ClassifierStrategy {
    fn name(&self) -> &str {
        "classifier"
    }

    async fn route(
        &self,
        context: &RoutingContext,
        session: &ModelSession,
        client: &dyn BackendClient,
    ) -> Option<RoutingDecision> {
        let config = session.config();
        if !config.use_classifier {
            return None;
        }

        let start = Instant::now();
        let prompt = Self::build_prompt(context);
        let reply = client
            .generate_json(&config.classifier_backend, &prompt)
            .await
            .and_then(Self::parse);

        let reply = match reply {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    backend = %config.classifier_backend,
                    error = %e,
                    "Classifier failed, deferring to next strategy"
                );
                return None;
            }
        };

        let backend = match reply.complexity {
            Complexity::Simple => &config.fast_backend,
            Complexity::Complex => &config.default_backend,
        };
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(backend = %backend, complexity = ?reply.complexity, latency_ms, "Classifier decided");

        Some(
            RoutingDecision::new(backend.clone(), "classifier", reply.reasoning)
                .with_latency_ms(latency_ms),
        )
    }
}
