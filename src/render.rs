// src/render.rs

//! Plain-text progress output for the CLI.
//!
//! Lines go to stdout; logs go to stderr (see [`crate::logging`]).

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::engine::{ExecutionReport, GraphEvent};

/// One human-readable line per event.
pub fn format_event(event: &GraphEvent) -> String {
    match event {
        GraphEvent::TaskRunning { id } => format!("[run ] {id}"),
        GraphEvent::TaskCompleted { id, result } => {
            format!("[ ok ] {id} ({} ms)", result.duration.as_millis())
        }
        GraphEvent::TaskFailed { id, error } => format!("[FAIL] {id}: {error}"),
        GraphEvent::TaskSkipped { id, reason } => format!("[skip] {id}: {reason}"),
        GraphEvent::BatchComplete {
            round,
            admitted,
            progress,
        } => format!(
            "-- round {round}: {admitted} admitted, {}/{} settled ({} ok, {} failed, {} skipped)",
            progress.settled(),
            progress.total,
            progress.completed,
            progress.failed,
            progress.skipped
        ),
    }
}

/// Print events until the sending side (the graph) is dropped.
pub fn spawn_progress_printer(mut rx: mpsc::UnboundedReceiver<GraphEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", format_event(&event));
        }
    })
}

pub fn format_summary(report: &ExecutionReport) -> String {
    let verdict = if report.success { "succeeded" } else { "FAILED" };
    format!(
        "run {verdict}: {} completed, {} failed, {} skipped in {} round(s), {} ms",
        report.completed_count,
        report.failed_count,
        report.skipped_count,
        report.rounds,
        report.total_duration.as_millis()
    )
}
