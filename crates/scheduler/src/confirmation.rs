//! Confirmation channel between a Task and its reviewer.
//!
//! A call that needs review parks a oneshot sender here, keyed by call id,
//! before its `awaiting_approval` event goes out. The reviewer answers
//! through [`ConfirmationHandle::respond`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::debug;
use warden_core::SchedulerError;

/// The reviewer's answer for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationOutcome {
    /// Run this call.
    ProceedOnce,
    /// Run this call and allow the tool for the rest of the session.
    ProceedAlways,
    /// Do not run this call.
    Cancel,
}

type Pending = HashMap<String, oneshot::Sender<ConfirmationOutcome>>;

/// Cloneable handle for answering pending confirmations of one Task.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationHandle {
    pending: Arc<Mutex<Pending>>,
}

impl ConfirmationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the pending confirmation for `call_id`.
    ///
    /// Fails with [`SchedulerError::UnknownCall`] when the call is not
    /// waiting for review (never asked, already answered, or settled by
    /// cancellation).
    pub fn respond(
        &self,
        call_id: &str,
        outcome: ConfirmationOutcome,
    ) -> Result<(), SchedulerError> {
        let sender = self
            .lock()
            .remove(call_id)
            .ok_or_else(|| SchedulerError::UnknownCall(call_id.to_string()))?;

        sender
            .send(outcome)
            .map_err(|_| SchedulerError::UnknownCall(call_id.to_string()))?;
        debug!(call_id = %call_id, outcome = ?outcome, "Confirmation delivered");
        Ok(())
    }

    /// Call ids currently waiting for an answer, sorted.
    pub fn pending(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub(crate) fn register(&self, call_id: &str) -> oneshot::Receiver<ConfirmationOutcome> {
        let (tx, rx) = oneshot::channel();
        self.lock().insert(call_id.to_string(), tx);
        rx
    }

    pub(crate) fn withdraw(&self, call_id: &str) {
        self.lock().remove(call_id);
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn respond_delivers_once() {
        let handle = ConfirmationHandle::new();
        let rx = handle.register("c1");
        assert_eq!(handle.pending(), vec!["c1"]);

        handle.respond("c1", ConfirmationOutcome::ProceedOnce).unwrap();
        assert_eq!(rx.await.unwrap(), ConfirmationOutcome::ProceedOnce);
        assert!(handle.pending().is_empty());

        let err = handle
            .respond("c1", ConfirmationOutcome::ProceedOnce)
            .unwrap_err();
        assert_eq!(err, SchedulerError::UnknownCall("c1".into()));
    }

    #[test]
    fn unknown_call_is_an_error() {
        let handle = ConfirmationHandle::new();
        assert!(matches!(
            handle.respond("nope", ConfirmationOutcome::Cancel),
            Err(SchedulerError::UnknownCall(id)) if id == "nope"
        ));
    }

    #[test]
    fn dropped_waiter_is_an_error() {
        let handle = ConfirmationHandle::new();
        drop(handle.register("c1"));
        assert!(handle.respond("c1", ConfirmationOutcome::ProceedOnce).is_err());
    }

    #[test]
    fn withdraw_and_clear() {
        let handle = ConfirmationHandle::new();
        let _a = handle.register("a");
        let _b = handle.register("b");
        handle.withdraw("a");
        assert_eq!(handle.pending(), vec!["b"]);
        handle.clear();
        assert!(handle.pending().is_empty());
    }

    #[test]
    fn outcome_wire_names() {
        let json = serde_json::to_string(&ConfirmationOutcome::ProceedAlways).unwrap();
        assert_eq!(json, r#""proceed_always""#);
    }
}
