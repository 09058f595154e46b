use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use taskgraph::dag::{Task, TaskResult};
use taskgraph::exec::{ExecFuture, TaskExecutor};

/// What the scripted executor does for a given task.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Succeed,
    /// Return `Ok(TaskResult { success: false, .. })`.
    Fail(String),
    /// Return `Err(anyhow!(..))`.
    Error(String),
    Panic(String),
}

/// A fake executor that:
/// - records which tasks were started and finished, in order
/// - tracks how many invocations were in flight at once
/// - succeeds by default, or follows a per-task [`Behaviour`]
#[derive(Clone, Default)]
pub struct ScriptedExecutor {
    behaviours: Arc<Mutex<HashMap<String, Behaviour>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    default_delay: Duration,
    started: Arc<Mutex<Vec<String>>>,
    finished: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every task sleeps this long before settling.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn delay_task(self, id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(id.to_string(), delay);
        self
    }

    pub fn behave(self, id: &str, behaviour: Behaviour) -> Self {
        self.behaviours
            .lock()
            .unwrap()
            .insert(id.to_string(), behaviour);
        self
    }

    pub fn fail(self, id: &str) -> Self {
        self.behave(id, Behaviour::Fail(format!("{id} failed")))
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }

    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }

    /// Largest number of invocations observed running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    async fn run(&self, task: Task) -> anyhow::Result<TaskResult> {
        self.started.lock().unwrap().push(task.id.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .lock()
            .unwrap()
            .get(&task.id)
            .copied()
            .unwrap_or(self.default_delay);
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.finished.lock().unwrap().push(task.id.clone());

        let behaviour = self
            .behaviours
            .lock()
            .unwrap()
            .get(&task.id)
            .cloned()
            .unwrap_or(Behaviour::Succeed);

        match behaviour {
            Behaviour::Succeed => Ok(TaskResult::success(format!("{} done", task.id), delay)),
            Behaviour::Fail(msg) => Ok(TaskResult {
                success: false,
                output: String::new(),
                duration: delay,
                error: Some(msg),
            }),
            Behaviour::Error(msg) => Err(anyhow::anyhow!(msg)),
            Behaviour::Panic(msg) => panic!("{msg}"),
        }
    }
}

impl TaskExecutor for ScriptedExecutor {
    fn execute(&self, task: Task) -> ExecFuture<'_> {
        Box::pin(self.run(task))
    }
}
