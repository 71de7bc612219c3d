//! Per-session backend selection.

use std::sync::RwLock;
use tracing::info;
use warden_config::RoutingConfig;

/// Routing configuration of one session plus its mutable active-backend
/// selection.
///
/// Strategies only read from it. The fallback controller is the only
/// writer and serializes its writes through [`ModelSession::failover`].
pub struct ModelSession {
    session_id: String,
    config: RoutingConfig,
    fallback_active: RwLock<Option<String>>,
    pub(crate) failover: tokio::sync::Mutex<()>,
}

impl ModelSession {
    pub fn new(session_id: impl Into<String>, config: RoutingConfig) -> Self {
        Self {
            session_id: session_id.into(),
            config,
            fallback_active: RwLock::new(None),
            failover: tokio::sync::Mutex::new(()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// The backend subsequent requests should use.
    pub fn active_backend(&self) -> String {
        self.fallback_backend()
            .unwrap_or_else(|| self.config.default_backend.clone())
    }

    /// The persisted fallback backend, when fallback mode is on.
    pub fn fallback_backend(&self) -> Option<String> {
        self.fallback_active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_in_fallback_mode(&self) -> bool {
        self.fallback_backend().is_some()
    }

    pub(crate) fn activate_fallback(&self, backend: &str) {
        info!(session = %self.session_id, backend = %backend, "Fallback mode activated");
        *self
            .fallback_active
            .write()
            .unwrap_or_else(|e| e.into_inner()) = Some(backend.to_string());
    }

    /// Leave fallback mode, e.g. after the user re-authenticates.
    pub fn reset(&self) {
        *self
            .fallback_active
            .write()
            .unwrap_or_else(|e| e.into_inner()) = None;
    }
}
