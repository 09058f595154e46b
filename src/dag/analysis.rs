// src/dag/analysis.rs

//! Structural analysis over the dependency relation: cycle detection and
//! dependency-first ordering.
//!
//! Both walks are depth-first with an explicit frame stack, start from roots
//! in store order and follow each task's dependencies in declared order.
//! Dependency ids that name no task are ignored here; they only matter to
//! readiness.

use std::collections::HashSet;

use crate::dag::store::TaskStore;
use crate::dag::task::{Task, TaskId};
use crate::errors::{GraphError, Result};

/// One level of the explicit DFS stack: a task and the index of the next
/// dependency to look at.
struct Frame<'a> {
    task: &'a Task,
    next_dep: usize,
}

impl<'a> Frame<'a> {
    fn new(task: &'a Task) -> Self {
        Self { task, next_dep: 0 }
    }
}

pub fn has_cycle(store: &TaskStore) -> bool {
    find_cycle(store).is_some()
}

/// Return the first directed cycle found, as a path that starts and ends
/// with the same id (e.g. `["A", "B", "A"]`).
pub fn find_cycle(store: &TaskStore) -> Option<Vec<TaskId>> {
    let mut visited: HashSet<&str> = HashSet::new();

    for root in store.tasks() {
        if visited.contains(root.id.as_str()) {
            continue;
        }

        let mut on_path: HashSet<&str> = HashSet::new();
        let mut stack: Vec<Frame<'_>> = vec![Frame::new(root)];
        visited.insert(root.id.as_str());
        on_path.insert(root.id.as_str());

        while let Some(frame) = stack.last_mut() {
            let task = frame.task;
            let Some(dep_id) = task.dependencies.get(frame.next_dep) else {
                on_path.remove(task.id.as_str());
                stack.pop();
                continue;
            };
            frame.next_dep += 1;

            let Some(dep) = store.get(dep_id) else {
                continue;
            };

            if on_path.contains(dep.id.as_str()) {
                let start = stack
                    .iter()
                    .position(|f| f.task.id == dep.id)
                    .unwrap_or(0);
                let mut cycle: Vec<TaskId> =
                    stack[start..].iter().map(|f| f.task.id.clone()).collect();
                cycle.push(dep.id.clone());
                return Some(cycle);
            }

            if visited.insert(dep.id.as_str()) {
                on_path.insert(dep.id.as_str());
                stack.push(Frame::new(dep));
            }
        }
    }

    None
}

/// Dependency-first ordering of every task in the store.
///
/// A task is emitted only after all of its (existing) dependencies; ties
/// between independent tasks follow store order.
pub fn topological_sort(store: &TaskStore) -> Result<Vec<TaskId>> {
    if let Some(cycle) = find_cycle(store) {
        return Err(cycle_error(&cycle));
    }

    let mut emitted: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(store.len());

    for root in store.tasks() {
        if !emitted.insert(root.id.as_str()) {
            continue;
        }

        let mut stack: Vec<Frame<'_>> = vec![Frame::new(root)];

        while let Some(frame) = stack.last_mut() {
            let task = frame.task;
            let Some(dep_id) = task.dependencies.get(frame.next_dep) else {
                order.push(task.id.clone());
                stack.pop();
                continue;
            };
            frame.next_dep += 1;

            if let Some(dep) = store.get(dep_id) {
                // Acyclic, so "entered" and "emitted" can share one set.
                if emitted.insert(dep.id.as_str()) {
                    stack.push(Frame::new(dep));
                }
            }
        }
    }

    Ok(order)
}

pub(crate) fn cycle_error(cycle: &[TaskId]) -> GraphError {
    let first = cycle.first().map(String::as_str).unwrap_or("?");
    GraphError::GraphCycle(format!(
        "cycle detected involving task '{}' ({})",
        first,
        cycle.join(" -> ")
    ))
}
