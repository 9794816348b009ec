use crate::client::inflight::{InFlightGuard, InFlightTracker};
use crate::resilience::RateLimitGate;
use crate::{Error, ErrorContext, Result};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Terminal result of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The remote effect was issued.
    Sent,
    /// An inventory refresh completed with `count` entries.
    Refreshed { count: usize },
    NoSuchAppliance,
    NoSuchSignal,
    /// The rate-limit gate refused admission; nothing ran.
    Denied,
    /// The unit of work failed (API error or panic).
    Failed(String),
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Sent | CommandOutcome::Refreshed { .. })
    }
}

/// Delivered once per launched unit of work, on every terminal path.
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub id: Uuid,
    pub label: String,
    pub outcome: CommandOutcome,
    pub elapsed: Duration,
}

/// Completion handle of an admitted command.
#[derive(Debug)]
pub struct CommandHandle {
    id: Uuid,
    label: String,
    rx: oneshot::Receiver<CommandReport>,
}

impl CommandHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the unit of work to finish.
    pub async fn wait(self) -> CommandReport {
        match self.rx.await {
            Ok(report) => report,
            Err(_) => CommandReport {
                id: self.id,
                label: self.label,
                outcome: CommandOutcome::Failed("command task aborted".into()),
                elapsed: Duration::ZERO,
            },
        }
    }
}

/// Admission result of a command operation.
#[derive(Debug)]
pub enum Dispatch {
    Denied,
    Admitted(CommandHandle),
}

impl Dispatch {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Dispatch::Admitted(_))
    }

    pub fn handle(self) -> Option<CommandHandle> {
        match self {
            Dispatch::Admitted(handle) => Some(handle),
            Dispatch::Denied => None,
        }
    }

    /// Outcome of the command; `Denied` immediately if it was never launched.
    pub async fn outcome(self) -> CommandOutcome {
        match self {
            Dispatch::Admitted(handle) => handle.wait().await.outcome,
            Dispatch::Denied => CommandOutcome::Denied,
        }
    }
}

/// Rate-gated, fire-and-forget launcher for command bodies.
pub struct CommandDispatcher {
    gate: Arc<RateLimitGate>,
    tracker: Arc<InFlightTracker>,
    events: broadcast::Sender<CommandReport>,
    runtime: Handle,
}

impl CommandDispatcher {
    pub fn new(
        gate: Arc<RateLimitGate>,
        tracker: Arc<InFlightTracker>,
        event_capacity: usize,
        runtime: Handle,
    ) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            gate,
            tracker,
            events,
            runtime,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CommandReport> {
        self.events.subscribe()
    }

    /// Admit `requested` units against the gate and, if admitted, run `body`
    /// as an independent task.
    ///
    /// The task marks `label` in flight, awaits `body`, publishes the report,
    /// then ends `label`. Only admission is awaited here.
    pub async fn launch<F>(&self, requested: u32, label: impl Into<String>, body: F) -> Dispatch
    where
        F: Future<Output = Result<CommandOutcome>> + Send + 'static,
    {
        let label = label.into();
        if !self.gate.try_acquire(requested).await {
            debug!(%label, requested, "command denied by rate limit gate");
            return Dispatch::Denied;
        }

        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        let tracker = self.tracker.clone();
        let events = self.events.clone();
        let task_label = label.clone();

        self.runtime.spawn(async move {
            let started = Instant::now();
            let _in_flight = InFlightGuard::begin(&tracker, &task_label);

            let outcome = match AssertUnwindSafe(body).catch_unwind().await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(e)) => {
                    warn!(%id, label = %task_label, error = %e, "command failed");
                    CommandOutcome::Failed(e.to_string())
                }
                Err(payload) => {
                    let e = Error::runtime_with_context(
                        "command panicked",
                        ErrorContext::new()
                            .with_details(panic_message(payload.as_ref()))
                            .with_source("command_dispatcher"),
                    );
                    warn!(%id, label = %task_label, error = %e, "command panicked");
                    CommandOutcome::Failed(e.to_string())
                }
            };

            let report = CommandReport {
                id,
                label: task_label.clone(),
                outcome,
                elapsed: started.elapsed(),
            };
            info!(%id, label = %report.label, outcome = ?report.outcome, elapsed_ms = report.elapsed.as_millis() as u64, "command finished");
            // No subscribers and a dropped handle are both fine.
            let _ = events.send(report.clone());
            let _ = tx.send(report);
        });

        Dispatch::Admitted(CommandHandle { id, label, rx })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
