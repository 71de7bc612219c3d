//! Fallback controller: what to do when a backend fails.
//!
//! On failure the controller asks an interactive [`FallbackHandler`] for one
//! [`FallbackIntent`]:
//!
//! - `Retry`: re-issue the current request on the fallback backend, leaving
//!   the session selection untouched
//! - `Stop`: persist the fallback backend for the rest of the session and
//!   abandon the current request
//! - `Auth`: abandon and let the caller re-authenticate
//!
//! No answer counts as `Stop`. Failure reports for one session are
//! serialized; once a switch has been persisted, later reports observe it
//! without asking the handler again.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use warden_core::BackendError;

use crate::session::ModelSession;

/// The user's answer to a backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackIntent {
    Retry,
    Stop,
    Auth,
}

/// Interactive collaborator consulted once per failure.
#[async_trait]
pub trait FallbackHandler: Send + Sync {
    async fn on_fallback(
        &self,
        failed_backend: &str,
        fallback_backend: &str,
        error: Option<&BackendError>,
    ) -> Option<FallbackIntent>;
}

/// What the controller decided for one failure report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackResolution {
    /// Re-issue the request on this backend once; nothing persisted.
    Retry { backend: String },
    /// This report persisted the switch; the request is abandoned.
    Switched { backend: String },
    /// An earlier report already switched the session.
    AlreadySwitched { backend: String },
    /// The caller must re-authenticate.
    Reauthenticate,
    /// The failed backend is the fallback itself; nothing left to try.
    NoFallback,
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("Retry on fallback backend '{backend}' failed: {source}")]
    RetryFailed {
        backend: String,
        #[source]
        source: BackendError,
    },

    #[error("Request abandoned; session switched to '{switched_to}': {source}")]
    Abandoned {
        switched_to: String,
        #[source]
        source: BackendError,
    },

    #[error("Re-authentication required: {source}")]
    AuthRequired {
        #[source]
        source: BackendError,
    },

    #[error("No fallback available for backend '{backend}': {source}")]
    NoFallback {
        backend: String,
        #[source]
        source: BackendError,
    },
}

/// Applies fallback intents to one session.
pub struct FallbackController {
    session: Arc<ModelSession>,
    handler: Arc<dyn FallbackHandler>,
}

impl FallbackController {
    pub fn new(session: Arc<ModelSession>, handler: Arc<dyn FallbackHandler>) -> Self {
        Self { session, handler }
    }

    pub fn session(&self) -> &Arc<ModelSession> {
        &self.session
    }

    /// Resolve a failure of `failed_backend`.
    pub async fn handle_failure(
        &self,
        failed_backend: &str,
        error: Option<&BackendError>,
    ) -> FallbackResolution {
        let _failover = self.session.failover.lock().await;
        let fallback = self.session.config().fallback_backend.as_str();

        if failed_backend == fallback {
            warn!(backend = %failed_backend, "Fallback backend failed, nothing left to switch to");
            return FallbackResolution::NoFallback;
        }

        if let Some(active) = self.session.fallback_backend() {
            info!(
                failed = %failed_backend,
                active = %active,
                "Session already switched, not asking again"
            );
            return FallbackResolution::AlreadySwitched { backend: active };
        }

        let intent = self
            .handler
            .on_fallback(failed_backend, fallback, error)
            .await
            .unwrap_or_else(|| {
                warn!(failed = %failed_backend, "No fallback decision, treating as stop");
                FallbackIntent::Stop
            });

        info!(failed = %failed_backend, fallback = %fallback, intent = ?intent, "Fallback intent");

        match intent {
            FallbackIntent::Retry => FallbackResolution::Retry {
                backend: fallback.to_string(),
            },
            FallbackIntent::Stop => {
                self.session.activate_fallback(fallback);
                FallbackResolution::Switched {
                    backend: fallback.to_string(),
                }
            }
            FallbackIntent::Auth => FallbackResolution::Reauthenticate,
        }
    }

    /// Run `op` against `backend`, applying the fallback intent on failure.
    ///
    /// `op` receives the backend id to use. It is called at most twice:
    /// once on `backend`, and once more on the fallback backend when the
    /// handler answers `Retry`.
    pub async fn call_with_fallback<T, F, Fut>(
        &self,
        backend: &str,
        op: F,
    ) -> Result<T, FallbackError>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let error = match op(backend.to_string()).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        warn!(backend = %backend, error = %error, "Backend call failed");

        match self.handle_failure(backend, Some(&error)).await {
            FallbackResolution::Retry { backend: fallback } => {
                op(fallback.clone())
                    .await
                    .map_err(|source| FallbackError::RetryFailed {
                        backend: fallback,
                        source,
                    })
            }
            FallbackResolution::Switched { backend: switched_to }
            | FallbackResolution::AlreadySwitched { backend: switched_to } => {
                Err(FallbackError::Abandoned {
                    switched_to,
                    source: error,
                })
            }
            FallbackResolution::Reauthenticate => Err(FallbackError::AuthRequired { source: error }),
            FallbackResolution::NoFallback => Err(FallbackError::NoFallback {
                backend: backend.to_string(),
                source: error,
            }),
        }
    }
}
