// src/engine/report.rs

//! Execution options and the aggregate report returned by a run.

use std::time::Duration;

use indexmap::IndexMap;
use serde::Serialize;

use crate::dag::task::duration_ms;
use crate::dag::{TaskId, TaskResult, TaskStore};
use crate::errors::Result;

/// Default cap on how many tasks are admitted per round.
pub const DEFAULT_MAX_PARALLEL: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Upper bound on tasks admitted into one round. Zero is treated as one.
    pub max_parallel: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
        }
    }
}

impl ExecuteOptions {
    pub fn with_max_parallel(max_parallel: usize) -> Self {
        Self { max_parallel }
    }
}

/// Outcome of [`TaskGraph::execute`](super::TaskGraph::execute).
///
/// `success` holds only when nothing failed and nothing was skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub success: bool,
    /// Results of every task that completed or failed, in graph order.
    /// Skipped tasks have no entry.
    pub results: IndexMap<TaskId, TaskResult>,
    #[serde(rename = "total_duration_ms", with = "duration_ms")]
    pub total_duration: Duration,
    pub completed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    /// Number of rounds that admitted at least one task.
    pub rounds: usize,
}

impl ExecutionReport {
    pub(crate) fn from_store(store: &TaskStore, total_duration: Duration, rounds: usize) -> Self {
        let progress = store.progress();
        let results = store
            .tasks()
            .filter_map(|t| t.result.clone().map(|r| (t.id.clone(), r)))
            .collect();

        Self {
            success: progress.failed == 0 && progress.skipped == 0,
            results,
            total_duration,
            completed_count: progress.completed,
            failed_count: progress.failed,
            skipped_count: progress.skipped,
            rounds,
        }
    }

    /// Ids of failed tasks, in graph order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, r)| !r.success)
            .map(|(id, _)| id.as_str())
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
