// src/dag/task.rs

//! Task entities, their lifecycle states and execution results.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::DelegateRole;

/// Canonical task identifier type used throughout the engine.
pub type TaskId = String;

/// Lifecycle state of a task.
///
/// `Pending -> Running -> Completed | Failed`, or `Pending -> Skipped` when an
/// upstream task fails. The three settled states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Whether a dependent may treat this dependency as done.
    ///
    /// `Skipped` counts as satisfied, so a task downstream of a skipped
    /// task still runs.
    pub fn satisfies_dependents(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Skipped)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Skipped => "skipped",
        };
        f.write_str(s)
    }
}

/// Outcome of one executor invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub output: String,
    #[serde(rename = "duration_ms", with = "duration_ms")]
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResult {
    pub fn success(output: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: true,
            output: output.into(),
            duration,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            output: String::new(),
            duration,
            error: Some(error.into()),
        }
    }
}

/// A unit of work in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    /// Ids this task waits for. Ids that never get added to the graph block
    /// the task permanently.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    #[serde(default)]
    pub delegate_role: Option<DelegateRole>,
    /// Carried for executors and UIs; admission order ignores it.
    #[serde(default)]
    pub parallel_hint: Option<bool>,
    #[serde(default)]
    pub estimated_cost: Option<f64>,
    #[serde(default = "pending")]
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

fn pending() -> TaskStatus {
    TaskStatus::Pending
}

impl Task {
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            dependencies: Vec::new(),
            delegate_role: None,
            parallel_hint: None,
            estimated_cost: None,
            status: TaskStatus::Pending,
            result: None,
        }
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|d| d == id)
    }
}

/// Durations cross the serialization boundary as whole milliseconds.
pub(crate) mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(d)?;
        Ok(Duration::from_millis(ms))
    }
}
