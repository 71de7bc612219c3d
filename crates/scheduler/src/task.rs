//! Task: drives one agent turn's batch of tool calls to completion.
//!
//! Every call becomes a [`ToolCallRecord`] and runs on its own tokio task:
//! validation, policy, optional review, dependency wait, execution. All
//! record mutations go through one mutex and each transition is published
//! while that mutex is held, so a subscriber sees a record's events in the
//! order its transitions happened.
//!
//! Cancellation is batch-wide. Once the token fires every call that has not
//! settled is cancelled at once; running tools get a cancelled child token
//! and are not waited for. Whatever they return afterwards is discarded,
//! since a terminal record accepts no further transitions.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Semaphore, watch};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use warden_config::SchedulerConfig;
use warden_core::{
    CallOutcome, CallSummary, EventPublisher, PolicyDecision, ProposedContent, SchedulerError,
    TaskEvent, Tool, ToolCallRecord, ToolCallRequest, ToolCallState, ToolError, ToolRegistry,
};
use warden_policy::PolicyEngine;

use crate::confirmation::{ConfirmationHandle, ConfirmationOutcome};
use crate::review::requires_approval;

const ABORTED: &str = "task aborted";
const DECLINED: &str = "declined by reviewer";

/// Every record of a finished batch, in request order. All are terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub task_id: String,
    pub records: Vec<ToolCallRecord>,
}

impl BatchSummary {
    /// One-line summaries in request order.
    pub fn summaries(&self) -> Vec<CallSummary> {
        self.records.iter().map(call_summary).collect()
    }

    pub fn record(&self, call_id: &str) -> Option<&ToolCallRecord> {
        self.records.iter().find(|r| r.id() == call_id)
    }

    pub fn state(&self, call_id: &str) -> Option<ToolCallState> {
        self.record(call_id).map(|r| r.state)
    }

    /// Number of calls that ended in `state`.
    pub fn count(&self, state: ToolCallState) -> usize {
        self.records.iter().filter(|r| r.state == state).count()
    }
}

fn call_summary(record: &ToolCallRecord) -> CallSummary {
    CallSummary {
        call_id: record.id().to_string(),
        tool_name: record.tool_name().to_string(),
        state: record.state,
        summary: record
            .outcome
            .as_ref()
            .map(CallOutcome::summary)
            .unwrap_or_else(|| record.state.to_string()),
    }
}

/// Scheduler for the tool calls of one agent turn.
///
/// A Task runs at most one batch at a time. Its records stay readable
/// after the batch completes, until the next batch replaces them.
pub struct Task {
    shared: Arc<Shared>,
    running: AtomicBool,
}

impl Task {
    pub fn new(
        context_id: impl Into<String>,
        settings: SchedulerConfig,
        tools: Arc<ToolRegistry>,
        policy: Arc<PolicyEngine>,
        events: EventPublisher,
    ) -> Self {
        let (settled, _) = watch::channel(0);
        let limiter = Semaphore::new(settings.max_concurrency.max(1));
        Self {
            shared: Arc::new(Shared {
                task_id: uuid::Uuid::new_v4().to_string(),
                context_id: context_id.into(),
                settings,
                tools,
                policy,
                events,
                confirmations: ConfirmationHandle::new(),
                batch: Mutex::new(Batch::default()),
                settled,
                limiter,
            }),
            running: AtomicBool::new(false),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.shared.task_id
    }

    pub fn context_id(&self) -> &str {
        &self.shared.context_id
    }

    /// Handle for answering calls that wait for review.
    pub fn confirmations(&self) -> ConfirmationHandle {
        self.shared.confirmations.clone()
    }

    /// Snapshot of the current batch's records, in request order.
    pub fn records(&self) -> Vec<ToolCallRecord> {
        self.shared.lock().records.clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run a batch of tool calls until every one of them is terminal.
    ///
    /// Per-call failures never fail the batch; they settle that call and
    /// show up in its event and in the returned summary. Only contract
    /// violations are errors: duplicate call ids, or a batch already
    /// running on this Task.
    pub async fn schedule_tool_calls(
        &self,
        requests: &[ToolCallRequest],
        cancel: CancellationToken,
    ) -> Result<BatchSummary, SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::BatchInProgress {
                task_id: self.shared.task_id.clone(),
            });
        }
        let _running = RunningGuard(&self.running);

        let mut seen = HashSet::new();
        for request in requests {
            if !seen.insert(request.id.as_str()) {
                return Err(SchedulerError::DuplicateCallId(request.id.clone()));
            }
        }

        info!(
            task = %self.shared.task_id,
            context = %self.shared.context_id,
            calls = requests.len(),
            "Scheduling tool calls"
        );
        let batch = self.shared.begin(requests);

        let mut workers = JoinSet::new();
        for index in 0..requests.len() {
            let shared = Arc::clone(&self.shared);
            let cancel = cancel.clone();
            workers.spawn(async move { shared.run_call(CallRef { batch, index }, cancel).await });
        }

        tokio::select! {
            _ = drain(&mut workers) => {
                let stranded = self.shared.settle_remaining(|record| {
                    let error = "tool call worker stopped unexpectedly".to_string();
                    if record.state.can_transition_to(ToolCallState::Failed) {
                        CallOutcome::Failed { error }
                    } else {
                        CallOutcome::Cancelled { reason: error }
                    }
                });
                if stranded > 0 {
                    warn!(task = %self.shared.task_id, stranded, "Settled calls left behind by workers");
                }
            }
            _ = cancel.cancelled() => {
                let cancelled = self.shared.settle_remaining(|_| CallOutcome::Cancelled {
                    reason: ABORTED.to_string(),
                });
                info!(task = %self.shared.task_id, cancelled, "Batch cancelled");
            }
        }
        // Dropping the set aborts workers that are still winding down.
        drop(workers);

        Ok(self.shared.finish())
    }
}

async fn drain(workers: &mut JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "Tool call worker failed");
        }
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Records of the current batch. `id` changes with every batch so that a
/// straggling worker of an old batch can never touch the new one.
#[derive(Default)]
struct Batch {
    id: u64,
    records: Vec<ToolCallRecord>,
}

/// Address of one record within one batch.
#[derive(Debug, Clone, Copy)]
struct CallRef {
    batch: u64,
    index: usize,
}

enum Dependencies {
    Ready,
    Pending,
    Failed(String),
    Invalid(String),
}

struct Shared {
    task_id: String,
    context_id: String,
    settings: SchedulerConfig,
    tools: Arc<ToolRegistry>,
    policy: Arc<PolicyEngine>,
    events: EventPublisher,
    confirmations: ConfirmationHandle,
    batch: Mutex<Batch>,
    /// Bumped whenever a record settles; dependents wait on it.
    settled: watch::Sender<u64>,
    limiter: Semaphore,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Batch> {
        self.batch.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the records with a fresh batch and announce every call.
    fn begin(&self, requests: &[ToolCallRequest]) -> u64 {
        self.confirmations.clear();
        let mut batch = self.lock();
        batch.id += 1;
        batch.records = requests.iter().cloned().map(ToolCallRecord::new).collect();
        for record in &batch.records {
            self.events.publish(self.update_event(record));
        }
        batch.id
    }

    fn finish(&self) -> BatchSummary {
        self.confirmations.clear();
        let batch = self.lock();
        let summary = BatchSummary {
            task_id: self.task_id.clone(),
            records: batch.records.clone(),
        };
        info!(
            task = %self.task_id,
            succeeded = summary.count(ToolCallState::Succeeded),
            failed = summary.count(ToolCallState::Failed),
            rejected = summary.count(ToolCallState::Rejected),
            cancelled = summary.count(ToolCallState::Cancelled),
            "Batch completed"
        );
        self.events.publish(TaskEvent::BatchCompleted {
            task_id: self.task_id.clone(),
            context_id: self.context_id.clone(),
            outcomes: summary.summaries(),
            timestamp: Utc::now(),
        });
        summary
    }

    fn update_event(&self, record: &ToolCallRecord) -> TaskEvent {
        let proposed_content = if record.state == ToolCallState::AwaitingApproval {
            record.proposed_content.clone()
        } else {
            None
        };
        TaskEvent::ToolCallUpdate {
            task_id: self.task_id.clone(),
            context_id: self.context_id.clone(),
            call_id: record.id().to_string(),
            tool_name: record.tool_name().to_string(),
            state: record.state,
            proposed_content,
            outcome: record.outcome.clone(),
            timestamp: Utc::now(),
        }
    }

    fn with_record<R>(&self, call: CallRef, f: impl FnOnce(&mut ToolCallRecord) -> R) -> Option<R> {
        let mut batch = self.lock();
        if batch.id != call.batch {
            return None;
        }
        batch.records.get_mut(call.index).map(f)
    }

    /// Apply a non-terminal transition. `false` means the record has moved
    /// on without us (usually cancelled) and the caller should stop.
    fn advance(&self, call: CallRef, next: ToolCallState) -> bool {
        self.with_record(call, |record| match record.transition(next) {
            Ok(()) => {
                debug!(call_id = %record.id(), tool = %record.tool_name(), state = %next, "Tool call transition");
                self.events.publish(self.update_event(record));
                true
            }
            Err(e) => {
                debug!(error = %e, "Transition discarded");
                false
            }
        })
        .unwrap_or(false)
    }

    fn park(&self, call: CallRef, preview: Option<ProposedContent>) -> bool {
        self.with_record(call, |record| match record.transition(ToolCallState::AwaitingApproval) {
            Ok(()) => {
                record.proposed_content = preview;
                info!(call_id = %record.id(), tool = %record.tool_name(), "Tool call awaiting approval");
                self.events.publish(self.update_event(record));
                true
            }
            Err(e) => {
                debug!(error = %e, "Transition discarded");
                false
            }
        })
        .unwrap_or(false)
    }

    fn settle(&self, call: CallRef, outcome: CallOutcome) -> bool {
        let settled = self
            .with_record(call, |record| match record.settle(outcome) {
                Ok(()) => {
                    info!(
                        call_id = %record.id(),
                        tool = %record.tool_name(),
                        state = %record.state,
                        "Tool call settled"
                    );
                    self.events.publish(self.update_event(record));
                    true
                }
                Err(e) => {
                    debug!(error = %e, "Late result discarded");
                    false
                }
            })
            .unwrap_or(false);
        if settled {
            self.settled.send_modify(|n| *n += 1);
        }
        settled
    }

    fn cancel(&self, call: CallRef, reason: &str) {
        self.settle(
            call,
            CallOutcome::Cancelled {
                reason: reason.to_string(),
            },
        );
    }

    fn fail(&self, call: CallRef, error: impl Into<String>) {
        self.settle(
            call,
            CallOutcome::Failed {
                error: error.into(),
            },
        );
    }

    /// Settle every record that is not terminal yet. Returns how many were
    /// settled.
    fn settle_remaining(&self, outcome: impl Fn(&ToolCallRecord) -> CallOutcome) -> usize {
        let mut settled = 0;
        {
            let mut batch = self.lock();
            for record in batch.records.iter_mut().filter(|r| !r.is_terminal()) {
                let outcome = outcome(record);
                if record.settle(outcome).is_ok() {
                    self.confirmations.withdraw(record.id());
                    self.events.publish(self.update_event(record));
                    settled += 1;
                }
            }
        }
        if settled > 0 {
            self.settled.send_modify(|n| *n += 1);
        }
        settled
    }

    fn dependencies(&self, call: CallRef) -> Option<Dependencies> {
        let batch = self.lock();
        if batch.id != call.batch {
            return None;
        }
        let (earlier, rest) = batch.records.split_at(call.index);
        let record = rest.first()?;

        for dep in &record.request.depends_on {
            let Some(upstream) = earlier.iter().find(|r| r.id() == dep) else {
                return Some(Dependencies::Invalid(dep.clone()));
            };
            match upstream.state {
                ToolCallState::Succeeded => {}
                state if state.is_terminal() => return Some(Dependencies::Failed(dep.clone())),
                _ => return Some(Dependencies::Pending),
            }
        }
        Some(Dependencies::Ready)
    }

    async fn run_call(&self, call: CallRef, cancel: CancellationToken) {
        if cancel.is_cancelled() {
            self.cancel(call, ABORTED);
            return;
        }
        let Some(request) = self.with_record(call, |r| r.request.clone()) else {
            return;
        };

        if let Some(Dependencies::Invalid(dep)) = self.dependencies(call) {
            warn!(call_id = %request.id, depends_on = %dep, "Invalid dependency");
            self.fail(
                call,
                format!("Invalid dependency '{dep}': must name an earlier call in the batch"),
            );
            return;
        }

        let Some(tool) = self.tools.get(&request.name) else {
            warn!(call_id = %request.id, tool = %request.name, "Unknown tool");
            self.fail(call, ToolError::NotFound(request.name.clone()).to_string());
            return;
        };

        let verdict = self.policy.evaluate(&request);
        self.with_record(call, |r| r.decision = Some(verdict.decision));
        if verdict.decision == PolicyDecision::Deny {
            self.settle(
                call,
                CallOutcome::Rejected {
                    reason: verdict.message,
                },
            );
            return;
        }

        let gated = requires_approval(
            verdict.decision,
            tool.as_ref(),
            self.settings.approval_mode,
            self.policy.is_non_interactive(),
            self.policy.is_always_allowed(&request.name),
        );
        let scheduled = if gated {
            self.await_approval(call, &request, tool.as_ref(), &cancel)
                .await
        } else {
            self.advance(call, ToolCallState::Scheduled)
        };
        if !scheduled || !self.await_dependencies(call, &cancel).await {
            return;
        }

        self.execute(call, request, tool, cancel).await;
    }

    async fn await_approval(
        &self,
        call: CallRef,
        request: &ToolCallRequest,
        tool: &dyn Tool,
        cancel: &CancellationToken,
    ) -> bool {
        let preview = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.cancel(call, ABORTED);
                return false;
            }
            preview = tool.proposed_content(&request.arguments) => preview,
        };
        let preview = match preview {
            Ok(preview) => preview,
            Err(e) => {
                warn!(call_id = %request.id, error = %e, "Preview failed");
                self.fail(call, e.to_string());
                return false;
            }
        };

        // Register before announcing, so an immediate answer is not lost.
        let response = self.confirmations.register(&request.id);
        if !self.park(call, preview) {
            self.confirmations.withdraw(&request.id);
            return false;
        }

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.confirmations.withdraw(&request.id);
                self.cancel(call, ABORTED);
                return false;
            }
            outcome = response => outcome.unwrap_or(ConfirmationOutcome::Cancel),
        };

        match outcome {
            ConfirmationOutcome::ProceedOnce => {}
            ConfirmationOutcome::ProceedAlways => self.policy.allow_tool(&request.name),
            ConfirmationOutcome::Cancel => {
                self.cancel(call, DECLINED);
                return false;
            }
        }
        self.advance(call, ToolCallState::Scheduled)
    }

    async fn await_dependencies(&self, call: CallRef, cancel: &CancellationToken) -> bool {
        let mut settled = self.settled.subscribe();
        loop {
            if cancel.is_cancelled() {
                self.cancel(call, ABORTED);
                return false;
            }
            match self.dependencies(call) {
                None => return false,
                Some(Dependencies::Ready) => return true,
                Some(Dependencies::Failed(dep) | Dependencies::Invalid(dep)) => {
                    self.fail(call, format!("Dependency '{dep}' did not succeed"));
                    return false;
                }
                Some(Dependencies::Pending) => {}
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                changed = settled.changed() => {
                    if changed.is_err() {
                        self.fail(call, "dependency tracking closed");
                        return false;
                    }
                }
            }
        }
    }

    async fn execute(
        &self,
        call: CallRef,
        request: ToolCallRequest,
        tool: Arc<dyn Tool>,
        cancel: CancellationToken,
    ) {
        let _permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.cancel(call, ABORTED);
                return;
            }
            permit = self.limiter.acquire() => match permit {
                Ok(permit) => permit,
                Err(_) => {
                    self.fail(call, "execution limiter closed");
                    return;
                }
            },
        };

        if cancel.is_cancelled() {
            self.cancel(call, ABORTED);
            return;
        }
        if !self.advance(call, ToolCallState::Executing) {
            return;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.cancel(call, "cancelled during execution");
                return;
            }
            result = tool.execute(request.arguments, cancel.child_token()) => result,
        };

        let outcome = match result {
            Ok(output) => CallOutcome::Succeeded { output },
            Err(ToolError::Cancelled(reason)) => CallOutcome::Cancelled { reason },
            Err(e) => {
                warn!(call_id = %request.id, tool = %request.name, error = %e, "Tool execution failed");
                CallOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.settle(call, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use warden_core::{EventStream, ToolOutput};
    use warden_policy::{PolicyEngineConfig, PolicyRule};

    struct Echo;

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
            _cancel: CancellationToken,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text(arguments.to_string()))
        }
    }

    fn task(default: PolicyDecision) -> (Task, EventStream) {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo));
        let policy = PolicyEngine::new(PolicyEngineConfig::new(default));
        let (events, stream) = EventPublisher::channel();
        let task = Task::new(
            "ctx-1",
            SchedulerConfig::default(),
            Arc::new(registry),
            Arc::new(policy),
            events,
        );
        (task, stream)
    }

    fn drain(stream: &mut EventStream) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = stream.try_recv() {
            events.push(event);
        }
        events
    }

    fn states_of(events: &[TaskEvent], id: &str) -> Vec<ToolCallState> {
        events
            .iter()
            .filter_map(|e| match e {
                TaskEvent::ToolCallUpdate { call_id, state, .. } if call_id == id => Some(*state),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn allowed_call_runs_to_success() {
        let (task, mut stream) = task(PolicyDecision::Allow);
        let requests = vec![ToolCallRequest::new("c1", "echo", serde_json::json!({"x": 1}))];

        let summary = task
            .schedule_tool_calls(&requests, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary.state("c1"), Some(ToolCallState::Succeeded));
        assert_eq!(summary.task_id, task.task_id());

        let record = summary.record("c1").unwrap();
        assert_eq!(record.decision, Some(PolicyDecision::Allow));
        assert!(record.started_at.is_some());
        assert!(record.ended_at.is_some());

        let events = drain(&mut stream);
        assert_eq!(
            states_of(&events, "c1"),
            vec![
                ToolCallState::Validating,
                ToolCallState::Scheduled,
                ToolCallState::Executing,
                ToolCallState::Succeeded,
            ]
        );
        let last = events.last().unwrap();
        assert_eq!(last.event_type(), "batch_completed");
        if let TaskEvent::BatchCompleted { outcomes, context_id, .. } = last {
            assert_eq!(context_id, "ctx-1");
            assert_eq!(outcomes.len(), 1);
            assert!(outcomes[0].summary.starts_with("completed"));
        }
    }

    #[tokio::test]
    async fn duplicate_ids_fail_the_whole_call() {
        let (task, mut stream) = task(PolicyDecision::Allow);
        let requests = vec![
            ToolCallRequest::new("same", "echo", serde_json::json!({})),
            ToolCallRequest::new("same", "echo", serde_json::json!({})),
        ];
        let err = task
            .schedule_tool_calls(&requests, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, SchedulerError::DuplicateCallId("same".into()));
        assert!(drain(&mut stream).is_empty());
        assert!(!task.is_running());
    }

    #[tokio::test]
    async fn unknown_tool_fails_validation() {
        let (task, mut stream) = task(PolicyDecision::Allow);
        let requests = vec![ToolCallRequest::new("c1", "no_such_tool", serde_json::json!({}))];
        let summary = task
            .schedule_tool_calls(&requests, CancellationToken::new())
            .await
            .unwrap();

        let record = summary.record("c1").unwrap();
        assert_eq!(record.state, ToolCallState::Failed);
        assert!(record.decision.is_none());
        assert_eq!(
            states_of(&drain(&mut stream), "c1"),
            vec![ToolCallState::Validating, ToolCallState::Failed]
        );
    }

    #[tokio::test]
    async fn forward_dependency_is_invalid() {
        let (task, _stream) = task(PolicyDecision::Allow);
        let requests = vec![
            ToolCallRequest::new("a", "echo", serde_json::json!({})).depends_on("b"),
            ToolCallRequest::new("b", "echo", serde_json::json!({})),
        ];
        let summary = task
            .schedule_tool_calls(&requests, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(summary.state("a"), Some(ToolCallState::Failed));
        assert_eq!(summary.state("b"), Some(ToolCallState::Succeeded));
        let error = match &summary.record("a").unwrap().outcome {
            Some(CallOutcome::Failed { error }) => error.clone(),
            other => panic!("unexpected outcome {other:?}"),
        };
        assert!(error.contains("Invalid dependency 'b'"));
    }

    #[tokio::test]
    async fn deny_rule_rejects_with_rule_message() {
        let (task, _stream) = task(PolicyDecision::Allow);
        task.shared.policy.add_rule(
            PolicyRule::new(PolicyDecision::Deny)
                .for_tool("echo")
                .with_priority(5)
                .with_message("echo is disabled"),
        );
        let requests = vec![ToolCallRequest::new("c1", "echo", serde_json::json!({}))];
        let summary = task
            .schedule_tool_calls(&requests, CancellationToken::new())
            .await
            .unwrap();
        let record = summary.record("c1").unwrap();
        assert_eq!(record.state, ToolCallState::Rejected);
        assert_eq!(
            record.outcome.as_ref().unwrap().summary(),
            "blocked by policy: echo is disabled"
        );
    }

    #[tokio::test]
    async fn records_survive_until_next_batch() {
        let (task, _stream) = task(PolicyDecision::Allow);
        let first = vec![ToolCallRequest::new("a", "echo", serde_json::json!({}))];
        task.schedule_tool_calls(&first, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(task.records().len(), 1);
        assert_eq!(task.records()[0].id(), "a");

        let second = vec![
            ToolCallRequest::new("b", "echo", serde_json::json!({})),
            ToolCallRequest::new("c", "echo", serde_json::json!({})),
        ];
        task.schedule_tool_calls(&second, CancellationToken::new())
            .await
            .unwrap();
        let ids: Vec<String> = task.records().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let (task, mut stream) = task(PolicyDecision::Allow);
        let summary = task
            .schedule_tool_calls(&[], CancellationToken::new())
            .await
            .unwrap();
        assert!(summary.records.is_empty());
        let events = drain(&mut stream);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "batch_completed");
    }
}
