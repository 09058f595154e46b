// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the [`TaskExecutor`] trait the engine dispatches
//!   through, plus [`executor_fn`] for closure-based executors.
//! - [`shell`] contains [`ShellExecutor`], which runs per-task commands with
//!   `tokio::process` and an optional timeout.

pub mod backend;
pub mod shell;

pub use backend::{ExecFuture, FnExecutor, TaskExecutor, executor_fn};
pub use shell::ShellExecutor;
