// src/engine/notifier.rs

//! Lifecycle event fan-out.

use tokio::sync::mpsc;
use tracing::trace;

use crate::dag::{Progress, TaskId, TaskResult};

/// Events emitted by the graph engine as tasks move through their lifecycle.
///
/// Observers only receive these; nothing they do feeds back into scheduling.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    /// A task was admitted into the current round.
    TaskRunning { id: TaskId },
    TaskCompleted { id: TaskId, result: TaskResult },
    TaskFailed { id: TaskId, error: String },
    /// A pending task was skipped because something upstream failed.
    TaskSkipped { id: TaskId, reason: String },
    /// Every task admitted in `round` has settled.
    BatchComplete {
        round: usize,
        admitted: usize,
        progress: Progress,
    },
}

impl GraphEvent {
    /// Task the event is about, if any.
    pub fn task_id(&self) -> Option<&str> {
        match self {
            GraphEvent::TaskRunning { id }
            | GraphEvent::TaskCompleted { id, .. }
            | GraphEvent::TaskFailed { id, .. }
            | GraphEvent::TaskSkipped { id, .. } => Some(id),
            GraphEvent::BatchComplete { .. } => None,
        }
    }
}

/// Publish/subscribe registry backed by unbounded channels.
///
/// Emission is synchronous and never waits on a slow observer. Subscribers
/// whose receiver has been dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct Notifier {
    subscribers: Vec<mpsc::UnboundedSender<GraphEvent>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GraphEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn emit(&mut self, event: GraphEvent) {
        trace!(?event, subscribers = self.subscribers.len(), "emitting graph event");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
