#![allow(dead_code)]

use taskgraph::config::{ConfigSection, PlanFile, RawPlanFile, TaskConfig};
use taskgraph::dag::Task;
use taskgraph::engine::TaskGraph;
use taskgraph::types::DelegateRole;

/// Builder for `Task` to simplify test setup.
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task::new(id, format!("task {id}")),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.task.description = description.to_string();
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.dependencies.push(dep.to_string());
        self
    }

    pub fn role(mut self, role: DelegateRole) -> Self {
        self.task.delegate_role = Some(role);
        self
    }

    pub fn parallel_hint(mut self, val: bool) -> Self {
        self.task.parallel_hint = Some(val);
        self
    }

    pub fn estimated_cost(mut self, cost: f64) -> Self {
        self.task.estimated_cost = Some(cost);
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for `TaskGraph`, keeping insertion order.
#[derive(Default)]
pub struct GraphBuilder {
    tasks: Vec<Task>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    /// Shorthand: `task("B", &["A"])`.
    pub fn task(self, id: &str, deps: &[&str]) -> Self {
        let task = deps
            .iter()
            .fold(TaskBuilder::new(id), |b, dep| b.after(dep))
            .build();
        self.with_task(task)
    }

    pub fn build(self) -> TaskGraph {
        TaskGraph::from_tasks(self.tasks)
    }
}

/// Builder for validated `PlanFile`s.
pub struct PlanFileBuilder {
    plan: RawPlanFile,
}

impl PlanFileBuilder {
    pub fn new() -> Self {
        Self {
            plan: RawPlanFile {
                config: ConfigSection::default(),
                task: Vec::new(),
            },
        }
    }

    pub fn max_parallel(mut self, n: usize) -> Self {
        self.plan.config.max_parallel = n;
        self
    }

    pub fn task_timeout(mut self, timeout: &str) -> Self {
        self.plan.config.task_timeout = Some(timeout.to_string());
        self
    }

    pub fn with_task(mut self, id: &str, cmd: Option<&str>, after: &[&str]) -> Self {
        self.plan.task.push(TaskConfig {
            id: id.to_string(),
            description: format!("task {id}"),
            after: after.iter().map(|s| s.to_string()).collect(),
            cmd: cmd.map(str::to_string),
            delegate_role: None,
            parallel_hint: None,
            estimated_cost: None,
        });
        self
    }

    pub fn raw(self) -> RawPlanFile {
        self.plan
    }

    pub fn build(self) -> PlanFile {
        PlanFile::try_from(self.plan).expect("Failed to build valid plan from builder")
    }
}

impl Default for PlanFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
