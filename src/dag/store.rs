// src/dag/store.rs

//! Task store: owns every task entity and applies status transitions.

use std::collections::VecDeque;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::task::{Task, TaskId, TaskResult, TaskStatus};
use crate::errors::{GraphError, Result};

/// Per-status task counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl Progress {
    /// Number of tasks that reached a terminal state.
    pub fn settled(&self) -> usize {
        self.completed + self.failed + self.skipped
    }
}

/// Tasks keyed by id, in insertion order.
///
/// The insertion order is the graph's natural iteration order: ready sets,
/// batch admission and topological tie-breaks all follow it. Overwriting an
/// existing id keeps the id's original position.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: IndexMap<TaskId, Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a task. The stored copy always starts `Pending`
    /// with no result, whatever the caller passed in.
    pub fn add_task(&mut self, mut task: Task) {
        task.status = TaskStatus::Pending;
        task.result = None;

        if let Some(previous) = self.tasks.insert(task.id.clone(), task) {
            debug!(task = %previous.id, "overwriting existing task; status reset to pending");
        }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// All tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Pending tasks whose dependencies are all `Completed` or `Skipped`.
    ///
    /// A dependency id with no matching task is never satisfied.
    pub fn ready(&self) -> Vec<&Task> {
        self.tasks()
            .filter(|task| task.status == TaskStatus::Pending && self.deps_satisfied(task))
            .collect()
    }

    fn deps_satisfied(&self, task: &Task) -> bool {
        task.dependencies.iter().all(|dep| {
            self.tasks
                .get(dep)
                .is_some_and(|d| d.status.satisfies_dependents())
        })
    }

    pub fn pending_ids(&self) -> Vec<TaskId> {
        self.tasks()
            .filter(|t| t.status == TaskStatus::Pending)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Dependency ids of `id` that do not name any task in the store.
    pub fn missing_dependencies(&self, id: &str) -> Vec<TaskId> {
        self.tasks
            .get(id)
            .map(|t| {
                t.dependencies
                    .iter()
                    .filter(|d| !self.tasks.contains_key(d.as_str()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn progress(&self) -> Progress {
        let mut progress = Progress {
            total: self.tasks.len(),
            ..Progress::default()
        };
        for task in self.tasks.values() {
            match task.status {
                TaskStatus::Pending => progress.pending += 1,
                TaskStatus::Running => progress.running += 1,
                TaskStatus::Completed => progress.completed += 1,
                TaskStatus::Failed => progress.failed += 1,
                TaskStatus::Skipped => progress.skipped += 1,
            }
        }
        progress
    }

    pub fn mark_running(&mut self, id: &str) -> Result<()> {
        self.transition(id, TaskStatus::Running)?;
        Ok(())
    }

    pub fn mark_complete(&mut self, id: &str, result: TaskResult) -> Result<()> {
        let task = self.transition(id, TaskStatus::Completed)?;
        task.result = Some(result);
        Ok(())
    }

    /// Mark `id` failed and skip every pending task downstream of it.
    ///
    /// Returns the ids that were newly skipped, nearest dependents first.
    pub fn mark_failed(&mut self, id: &str, result: TaskResult) -> Result<Vec<TaskId>> {
        let task = self.transition(id, TaskStatus::Failed)?;
        task.result = Some(result);
        Ok(self.skip_dependents(id))
    }

    /// Work-list cascade: each pending dependent is visited exactly once
    /// because it leaves `Pending` as soon as it is reached.
    fn skip_dependents(&mut self, failed: &str) -> Vec<TaskId> {
        let mut skipped = Vec::new();
        let mut queue: VecDeque<TaskId> = VecDeque::from([failed.to_string()]);

        while let Some(current) = queue.pop_front() {
            let dependents: Vec<TaskId> = self
                .tasks()
                .filter(|t| t.status == TaskStatus::Pending && t.depends_on(&current))
                .map(|t| t.id.clone())
                .collect();

            for dep_id in dependents {
                if let Some(task) = self.tasks.get_mut(&dep_id) {
                    task.status = TaskStatus::Skipped;
                    debug!(task = %dep_id, upstream = %failed, "skipping dependent of failed task");
                    skipped.push(dep_id.clone());
                    queue.push_back(dep_id);
                }
            }
        }

        if !skipped.is_empty() {
            warn!(task = %failed, skipped = skipped.len(), "failure cascaded to dependents");
        }
        skipped
    }

    fn transition(&mut self, id: &str, to: TaskStatus) -> Result<&mut Task> {
        let task = self
            .tasks
            .get_mut(id)
            .ok_or_else(|| GraphError::TaskNotFound(id.to_string()))?;

        let allowed = match to {
            TaskStatus::Running | TaskStatus::Skipped => task.status == TaskStatus::Pending,
            TaskStatus::Completed | TaskStatus::Failed => {
                matches!(task.status, TaskStatus::Pending | TaskStatus::Running)
            }
            TaskStatus::Pending => false,
        };

        if !allowed {
            return Err(GraphError::InvalidTransition {
                id: id.to_string(),
                from: task.status,
                to,
            });
        }

        debug!(task = %id, from = %task.status, to = %to, "task status transition");
        task.status = to;
        Ok(task)
    }
}
