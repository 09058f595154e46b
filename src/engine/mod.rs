// src/engine/mod.rs

//! Graph engine for taskgraph.
//!
//! This module ties together:
//! - the task store (owned by [`TaskGraph`])
//! - the round-based scheduler ([`TaskGraph::execute`])
//! - the notifier that publishes lifecycle events to observers
//!
//! Status transitions always go through [`TaskGraph`] so that observers see
//! every one of them; the notifier itself never touches task state.

pub mod graph;
pub mod notifier;
pub mod report;
pub mod scheduler;

pub use graph::TaskGraph;
pub use notifier::{GraphEvent, Notifier};
pub use report::{DEFAULT_MAX_PARALLEL, ExecuteOptions, ExecutionReport};
