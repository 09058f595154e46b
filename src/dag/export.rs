// src/dag/export.rs

//! Graphviz rendering of the dependency graph.

use std::collections::HashMap;
use std::fmt::Write;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::dag::store::TaskStore;

const MISSING_PREFIX: &str = "missing: ";

/// Build a petgraph graph from the store.
///
/// Edge direction: dep -> task. For a task `B` with `dependencies = ["A"]`
/// we add edge `A -> B`. Dependency ids that name no task get a placeholder
/// node labelled `missing: <id>`.
pub fn to_petgraph(store: &TaskStore) -> DiGraph<String, ()> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for task in store.tasks() {
        let idx = graph.add_node(task.id.clone());
        index.insert(task.id.as_str(), idx);
    }

    for task in store.tasks() {
        let to = index[task.id.as_str()];
        for dep in &task.dependencies {
            let from = match index.get(dep.as_str()) {
                Some(idx) => *idx,
                None => {
                    let idx = graph.add_node(format!("{MISSING_PREFIX}{dep}"));
                    index.insert(dep.as_str(), idx);
                    idx
                }
            };
            graph.add_edge(from, to, ());
        }
    }

    graph
}

/// Render the store as a DOT digraph; missing dependency targets are dashed.
pub fn to_dot(store: &TaskStore) -> String {
    let graph = to_petgraph(store);
    let mut out = String::from("digraph {\n");

    for idx in graph.node_indices() {
        let label = &graph[idx];
        let style = if label.starts_with(MISSING_PREFIX) {
            ", style=dashed"
        } else {
            ""
        };
        let _ = writeln!(out, "    {} [ label = {:?}{} ]", idx.index(), label, style);
    }
    for edge in graph.edge_references() {
        let _ = writeln!(
            out,
            "    {} -> {}",
            edge.source().index(),
            edge.target().index()
        );
    }

    out.push_str("}\n");
    out
}
