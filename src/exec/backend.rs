// src/exec/backend.rs

//! Pluggable executor abstraction.
//!
//! The graph engine hands each admitted task to a [`TaskExecutor`] and only
//! looks at the settled result. What the executor actually does (spawn a
//! process, call a model, simulate work in tests) is opaque to the engine.
//!
//! - [`ShellExecutor`](super::ShellExecutor) is the implementation used by the
//!   `taskgraph` binary.
//! - [`executor_fn`] adapts any async closure, which is what most embedders
//!   and tests want.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::dag::{Task, TaskResult};

/// Future returned by [`TaskExecutor::execute`].
pub type ExecFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<TaskResult>> + Send + 'a>>;

/// Trait abstracting how one admitted task is executed.
///
/// Returning `Ok(TaskResult { success: false, .. })` and returning `Err(_)`
/// both fail the task; a panic inside the future is treated the same way.
/// Neither ever aborts the surrounding run.
pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: Task) -> ExecFuture<'_>;
}

impl<E: TaskExecutor + ?Sized> TaskExecutor for &E {
    fn execute(&self, task: Task) -> ExecFuture<'_> {
        (**self).execute(task)
    }
}

impl<E: TaskExecutor + ?Sized> TaskExecutor for std::sync::Arc<E> {
    fn execute(&self, task: Task) -> ExecFuture<'_> {
        (**self).execute(task)
    }
}

/// Executor backed by an async closure. Build one with [`executor_fn`].
pub struct FnExecutor<F> {
    f: F,
}

impl<F> fmt::Debug for FnExecutor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExecutor").finish_non_exhaustive()
    }
}

/// Wrap `f` so it can be passed to [`TaskGraph::execute`](crate::engine::TaskGraph::execute).
///
/// ```no_run
/// use std::time::Duration;
/// use taskgraph::dag::TaskResult;
/// use taskgraph::exec::executor_fn;
///
/// let exec = executor_fn(|task| async move {
///     Ok(TaskResult::success(format!("did {}", task.id), Duration::ZERO))
/// });
/// # let _ = exec;
/// ```
pub fn executor_fn<F, Fut>(f: F) -> FnExecutor<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<TaskResult>> + Send + 'static,
{
    FnExecutor { f }
}

impl<F, Fut> TaskExecutor for FnExecutor<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<TaskResult>> + Send + 'static,
{
    fn execute(&self, task: Task) -> ExecFuture<'_> {
        Box::pin((self.f)(task))
    }
}
