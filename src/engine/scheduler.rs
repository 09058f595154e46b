// src/engine/scheduler.rs

//! Round-based scheduler.
//!
//! Each round computes the ready frontier, admits at most `max_parallel`
//! tasks from it in store order, runs them concurrently and waits for every
//! one of them to settle before looking at the graph again. Nothing is
//! admitted mid-round, even if a slot frees early.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::dag::analysis::cycle_error;
use crate::dag::{Task, TaskId, TaskResult, TaskStatus};
use crate::engine::graph::TaskGraph;
use crate::engine::notifier::GraphEvent;
use crate::engine::report::{ExecuteOptions, ExecutionReport};
use crate::errors::Result;
use crate::exec::TaskExecutor;

/// How one executor invocation settled.
#[derive(Debug)]
enum Settled {
    Completed(TaskResult),
    Failed(TaskResult),
}

impl TaskGraph {
    /// Run every pending task to a terminal state.
    ///
    /// Fails up front with [`GraphCycle`](crate::errors::GraphError::GraphCycle)
    /// if the graph is cyclic. Task-level failures, including executor errors,
    /// panics and deadlocked tasks, never make this return `Err`; they are
    /// reported through the [`ExecutionReport`].
    pub async fn execute<E>(
        &mut self,
        executor: &E,
        options: ExecuteOptions,
    ) -> Result<ExecutionReport>
    where
        E: TaskExecutor + ?Sized,
    {
        let started = Instant::now();

        if let Some(cycle) = self.find_cycle() {
            let err = cycle_error(&cycle);
            error!(cycle = ?cycle, "refusing to execute cyclic task graph");
            return Err(err);
        }

        if options.max_parallel == 0 {
            warn!("max_parallel = 0 is not usable; admitting one task per round");
        }
        let max_parallel = options.max_parallel.max(1);

        info!(
            tasks = self.store.len(),
            max_parallel, "starting task graph execution"
        );

        let mut round = 0;
        loop {
            let ready = self.store.ready();
            if ready.is_empty() {
                let stuck = self.store.pending_ids();
                if !stuck.is_empty() {
                    self.fail_deadlocked(stuck)?;
                }
                break;
            }

            round += 1;
            let frontier = ready.len();
            let batch: Vec<Task> = ready.into_iter().take(max_parallel).cloned().collect();
            let admitted = batch.len();

            info!(round, admitted, frontier, "admitting round");

            for task in &batch {
                self.mark_running(&task.id)?;
            }

            let outcomes = join_all(batch.into_iter().map(|task| run_one(executor, task))).await;

            for (id, settled) in outcomes {
                match settled {
                    Settled::Completed(result) => self.mark_complete(&id, result)?,
                    Settled::Failed(result) => {
                        self.fail_with_result(&id, result)?;
                    }
                }
            }

            let progress = self.get_progress();
            debug!(round, ?progress, "round settled");
            self.notifier.emit(GraphEvent::BatchComplete {
                round,
                admitted,
                progress,
            });
        }

        let report = ExecutionReport::from_store(&self.store, started.elapsed(), round);
        info!(
            success = report.success,
            completed = report.completed_count,
            failed = report.failed_count,
            skipped = report.skipped_count,
            rounds = report.rounds,
            elapsed = ?report.total_duration,
            "task graph execution finished"
        );
        Ok(report)
    }

    /// Nothing is ready but tasks are still pending: none of them can ever
    /// run, and every one of them is failed.
    ///
    /// Dependents go first (reverse dependency order), so no stuck task is
    /// still pending when an upstream stuck task fails and the cascade never
    /// turns one of them into `Skipped`.
    fn fail_deadlocked(&mut self, stuck: Vec<TaskId>) -> Result<()> {
        warn!(stuck = ?stuck, "no ready tasks but pending tasks remain; deadlock");

        let stuck_set: HashSet<&str> = stuck.iter().map(String::as_str).collect();
        let ordered: Vec<TaskId> = self
            .topological_sort()?
            .into_iter()
            .rev()
            .filter(|id| stuck_set.contains(id.as_str()))
            .collect();

        for id in ordered {
            let still_pending = self
                .get_task(&id)
                .is_some_and(|t| t.status == TaskStatus::Pending);
            if !still_pending {
                continue;
            }

            let message = self.deadlock_message(&id);
            self.fail_with_result(&id, TaskResult::failure(message, Duration::ZERO))?;
        }
        Ok(())
    }

    fn deadlock_message(&self, id: &str) -> String {
        let missing = self.store.missing_dependencies(id);
        if missing.is_empty() {
            let blocked_on: Vec<&str> = self
                .get_task(id)
                .map(|t| {
                    t.dependencies
                        .iter()
                        .filter(|d| {
                            self.get_task(d)
                                .is_some_and(|dep| !dep.status.satisfies_dependents())
                        })
                        .map(String::as_str)
                        .collect()
                })
                .unwrap_or_default();
            format!(
                "unreachable dependency: blocked on unsatisfiable dependencies {blocked_on:?}"
            )
        } else {
            format!("unreachable dependency: {missing:?} not present in the task graph")
        }
    }
}

/// Invoke the executor for one task and classify the outcome.
///
/// The call happens inside the caught future, so a panic raised while
/// building the future is caught as well.
async fn run_one<E>(executor: &E, task: Task) -> (TaskId, Settled)
where
    E: TaskExecutor + ?Sized,
{
    let id = task.id.clone();
    let started = Instant::now();

    let outcome = AssertUnwindSafe(async move { executor.execute(task).await })
        .catch_unwind()
        .await;
    let elapsed = started.elapsed();

    let settled = match outcome {
        Ok(Ok(result)) if result.success => Settled::Completed(result),
        Ok(Ok(mut result)) => {
            if result.error.is_none() {
                result.error = Some("task reported failure".to_string());
            }
            Settled::Failed(result)
        }
        Ok(Err(err)) => Settled::Failed(TaskResult::failure(format!("{err:#}"), elapsed)),
        Err(panic) => Settled::Failed(TaskResult::failure(
            format!("executor panicked: {}", panic_message(panic.as_ref())),
            elapsed,
        )),
    };

    debug!(task = %id, ?elapsed, "executor settled");
    (id, settled)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
