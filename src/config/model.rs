// src/config/model.rs

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::dag::{Task, TaskId};
use crate::engine::DEFAULT_MAX_PARALLEL;
use crate::types::DelegateRole;

/// Plan file exactly as deserialized from TOML, before validation.
///
/// ```toml
/// [config]
/// max_parallel = 3
/// task_timeout = "30s"
///
/// [[task]]
/// id = "fetch"
/// description = "Download sources"
/// cmd = "./fetch.sh"
///
/// [[task]]
/// id = "build"
/// description = "Build"
/// after = ["fetch"]
/// delegate_role = "coder"
/// ```
///
/// Tasks are an array of tables so that file order is the graph's insertion
/// order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// Validated plan. Build one with `PlanFile::try_from(raw)` or
/// [`load_and_validate`](super::load_and_validate).
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub config: ConfigSection,
    pub tasks: Vec<TaskConfig>,
    task_timeout: Option<Duration>,
}

impl PlanFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        tasks: Vec<TaskConfig>,
        task_timeout: Option<Duration>,
    ) -> Self {
        Self {
            config,
            tasks,
            task_timeout,
        }
    }

    pub fn max_parallel(&self) -> usize {
        self.config.max_parallel
    }

    /// Parsed `[config].task_timeout`.
    pub fn task_timeout(&self) -> Option<Duration> {
        self.task_timeout
    }

    /// Task descriptors in file order.
    pub fn to_tasks(&self) -> Vec<Task> {
        self.tasks.iter().map(TaskConfig::to_task).collect()
    }

    /// `id -> cmd` for every task that has a command.
    pub fn commands(&self) -> HashMap<TaskId, String> {
        self.tasks
            .iter()
            .filter_map(|t| t.cmd.as_ref().map(|cmd| (t.id.clone(), cmd.clone())))
            .collect()
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of tasks admitted per round.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Per-task timeout for the shell executor, e.g. `"30s"` or `"5m"`.
    #[serde(default)]
    pub task_timeout: Option<String>,
}

fn default_max_parallel() -> usize {
    DEFAULT_MAX_PARALLEL
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            task_timeout: None,
        }
    }
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub id: TaskId,

    pub description: String,

    /// Ids this task waits for. Unknown ids are allowed here; they surface
    /// as a deadlock at run time.
    #[serde(default)]
    pub after: Vec<TaskId>,

    /// Shell command run by the `taskgraph` binary. Tasks without one are
    /// no-ops.
    #[serde(default)]
    pub cmd: Option<String>,

    #[serde(default)]
    pub delegate_role: Option<DelegateRole>,

    #[serde(default)]
    pub parallel_hint: Option<bool>,

    #[serde(default)]
    pub estimated_cost: Option<f64>,
}

impl TaskConfig {
    pub fn to_task(&self) -> Task {
        Task {
            dependencies: self.after.clone(),
            delegate_role: self.delegate_role,
            parallel_hint: self.parallel_hint,
            estimated_cost: self.estimated_cost,
            ..Task::new(self.id.clone(), self.description.clone())
        }
    }
}
