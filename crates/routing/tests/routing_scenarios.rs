//! End-to-end routing and fallback behavior for one session.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use warden_config::RoutingConfig;
use warden_core::{BackendClient, BackendError};
use warden_routing::{
    DefaultStrategy, FallbackController, FallbackError, FallbackHandler, FallbackIntent,
    ModelRouter, ModelSession, RoutingContext, TerminalStrategy,
};

/// Classifier backend that always says the request is simple.
struct SimpleClassifier;

#[async_trait]
impl BackendClient for SimpleClassifier {
    async fn generate_json(
        &self,
        _backend: &str,
        _prompt: &str,
    ) -> Result<serde_json::Value, BackendError> {
        Ok(serde_json::json!({ "reasoning": "trivial", "complexity": "simple" }))
    }
}

struct CountingHandler {
    intent: FallbackIntent,
    calls: AtomicUsize,
}

#[async_trait]
impl FallbackHandler for CountingHandler {
    async fn on_fallback(
        &self,
        _failed_backend: &str,
        _fallback_backend: &str,
        _error: Option<&BackendError>,
    ) -> Option<FallbackIntent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Some(self.intent)
    }
}

fn config() -> RoutingConfig {
    RoutingConfig {
        default_backend: "capable".into(),
        fast_backend: "quick".into(),
        fallback_backend: "backup".into(),
        classifier_backend: "quick".into(),
        ..RoutingConfig::default()
    }
}

#[tokio::test]
async fn default_strategy_ignores_context() {
    let session = ModelSession::new("d", config());
    let contexts = vec![
        RoutingContext::new(""),
        RoutingContext::new("one line"),
        RoutingContext::new("plan a migration").with_history(vec![
            "earlier".into(),
            "turns".into(),
            "of".into(),
            "conversation".into(),
        ]),
    ];

    for ctx in &contexts {
        let decision = DefaultStrategy.route(ctx, &session, &SimpleClassifier).await;
        assert_eq!(decision.backend, "capable");
        assert_eq!(decision.metadata.source, "default");
        assert_eq!(decision.metadata.latency_ms, 0);
    }

    // Even once the session has switched, the default strategy stays fixed.
    let controller = FallbackController::new(
        Arc::new(ModelSession::new("d2", config())),
        Arc::new(CountingHandler {
            intent: FallbackIntent::Stop,
            calls: AtomicUsize::new(0),
        }),
    );
    controller.handle_failure("capable", None).await;
    let decision = DefaultStrategy
        .route(&contexts[0], controller.session(), &SimpleClassifier)
        .await;
    assert_eq!(decision.backend, "capable");
}

#[tokio::test]
async fn stop_switches_session_for_subsequent_routing() {
    let session = Arc::new(ModelSession::new("e", config()));
    let handler = Arc::new(CountingHandler {
        intent: FallbackIntent::Stop,
        calls: AtomicUsize::new(0),
    });
    let router = ModelRouter::new(session.clone(), Arc::new(SimpleClassifier));
    let controller = FallbackController::new(session.clone(), handler.clone());

    let before = router.route(&RoutingContext::new("hi")).await;
    assert_eq!(before.backend, "quick");
    assert_eq!(before.metadata.source, "agent-router/classifier");

    let err = controller
        .call_with_fallback("capable", |_| async {
            Err::<(), _>(BackendError::RateLimited {
                retry_after_secs: 30,
            })
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FallbackError::Abandoned { ref switched_to, .. } if switched_to == "backup"));

    for prompt in ["next", "and another", "refactor everything"] {
        let decision = router.route(&RoutingContext::new(prompt)).await;
        assert_eq!(decision.backend, "backup");
        assert_eq!(decision.metadata.source, "agent-router/fallback");
    }

    // A later failure of the original backend observes the switch.
    let err = controller
        .call_with_fallback("capable", |_| async {
            Err::<(), _>(BackendError::Network("reset".into()))
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FallbackError::Abandoned { .. }));
    assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_returns_to_normal_routing() {
    let session = Arc::new(ModelSession::new("r", config()));
    let router = ModelRouter::new(session.clone(), Arc::new(SimpleClassifier));
    let controller = FallbackController::new(
        session.clone(),
        Arc::new(CountingHandler {
            intent: FallbackIntent::Stop,
            calls: AtomicUsize::new(0),
        }),
    );

    controller.handle_failure("capable", None).await;
    assert_eq!(router.route(&RoutingContext::new("x")).await.backend, "backup");

    session.reset();
    assert_eq!(router.route(&RoutingContext::new("x")).await.backend, "quick");
}
