// src/engine/graph.rs

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::warn;

use crate::dag::{self, Progress, Task, TaskId, TaskResult, TaskStore};
use crate::engine::notifier::{GraphEvent, Notifier};
use crate::errors::Result;

/// The graph engine: a task store plus the notifier observing it.
///
/// All status changes go through the `mark_*` methods here so that every
/// transition is published. Scheduling lives in
/// [`execute`](TaskGraph::execute).
#[derive(Debug, Default)]
pub struct TaskGraph {
    pub(crate) store: TaskStore,
    pub(crate) notifier: Notifier,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from task descriptors, keeping their order.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut graph = Self::new();
        for task in tasks {
            graph.add_task(task);
        }
        graph
    }

    /// Insert or overwrite a task; it always (re)starts as pending.
    pub fn add_task(&mut self, task: Task) {
        self.store.add_task(task);
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.store.get(id)
    }

    pub fn all_tasks(&self) -> Vec<&Task> {
        self.store.tasks().collect()
    }

    pub fn get_ready(&self) -> Vec<&Task> {
        self.store.ready()
    }

    pub fn get_progress(&self) -> Progress {
        self.store.progress()
    }

    pub fn has_cycle(&self) -> bool {
        dag::has_cycle(&self.store)
    }

    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        dag::find_cycle(&self.store)
    }

    /// Dependency-first order for inspection; fails with `GraphCycle` on a
    /// cyclic graph. The scheduler does not use it.
    pub fn topological_sort(&self) -> Result<Vec<TaskId>> {
        dag::topological_sort(&self.store)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Graphviz rendering of the dependency graph.
    pub fn to_dot(&self) -> String {
        dag::export::to_dot(&self.store)
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<GraphEvent> {
        self.notifier.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    pub fn mark_running(&mut self, id: &str) -> Result<()> {
        self.store.mark_running(id)?;
        self.notifier.emit(GraphEvent::TaskRunning { id: id.to_string() });
        Ok(())
    }

    pub fn mark_complete(&mut self, id: &str, result: TaskResult) -> Result<()> {
        self.store.mark_complete(id, result.clone())?;
        self.notifier.emit(GraphEvent::TaskCompleted {
            id: id.to_string(),
            result,
        });
        Ok(())
    }

    /// Fail `id` with a synthesized result and skip everything pending
    /// downstream of it. Returns the newly skipped ids.
    pub fn mark_failed(&mut self, id: &str, error: impl Into<String>) -> Result<Vec<TaskId>> {
        self.fail_with_result(id, TaskResult::failure(error, Duration::ZERO))
    }

    pub(crate) fn fail_with_result(&mut self, id: &str, result: TaskResult) -> Result<Vec<TaskId>> {
        let error = result
            .error
            .clone()
            .unwrap_or_else(|| "task failed".to_string());

        let skipped = self.store.mark_failed(id, result)?;
        warn!(task = %id, error = %error, "task failed");

        self.notifier.emit(GraphEvent::TaskFailed {
            id: id.to_string(),
            error,
        });
        for skipped_id in &skipped {
            self.notifier.emit(GraphEvent::TaskSkipped {
                id: skipped_id.clone(),
                reason: format!("upstream task '{id}' failed"),
            });
        }
        Ok(skipped)
    }
}
