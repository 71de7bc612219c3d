//! Backend client trait: the narrow view of a model backend the core needs.
//!
//! The core never drives conversations itself. Routing strategies may make
//! an auxiliary classification call, and the fallback controller re-issues
//! whatever operation the caller hands it, so a single JSON-generation entry
//! point is enough.

use async_trait::async_trait;

use crate::error::BackendError;

/// A client able to ask a named backend for a JSON answer.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Send `prompt` to `backend` and parse the reply as a JSON value.
    async fn generate_json(
        &self,
        backend: &str,
        prompt: &str,
    ) -> std::result::Result<serde_json::Value, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClient;

    #[async_trait]
    impl BackendClient for FixedClient {
        async fn generate_json(
            &self,
            backend: &str,
            _prompt: &str,
        ) -> std::result::Result<serde_json::Value, BackendError> {
            if backend == "offline" {
                return Err(BackendError::Network("connection refused".into()));
            }
            Ok(serde_json::json!({ "backend": backend }))
        }
    }

    #[tokio::test]
    async fn client_is_object_safe() {
        let client: Box<dyn BackendClient> = Box::new(FixedClient);
        let value = client.generate_json("fast", "hi").await.unwrap();
        assert_eq!(value["backend"], "fast");
        assert!(client.generate_json("offline", "hi").await.is_err());
    }
}
