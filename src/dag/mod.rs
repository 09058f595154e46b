// src/dag/mod.rs

//! Task graph data and structural analysis.
//!
//! - [`task`] defines task entities, statuses and results.
//! - [`store`] owns the tasks and applies status transitions, including the
//!   failure cascade.
//! - [`analysis`] provides cycle detection and dependency-first ordering.
//! - [`export`] renders the graph for inspection (Graphviz DOT).

pub mod analysis;
pub mod export;
pub mod store;
pub mod task;

pub use analysis::{find_cycle, has_cycle, topological_sort};
pub use store::{Progress, TaskStore};
pub use task::{Task, TaskId, TaskResult, TaskStatus};
