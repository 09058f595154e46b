// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod render;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{PlanFile, default_plan_path, load_and_validate};
use crate::engine::{ExecuteOptions, ExecutionReport, TaskGraph};
use crate::exec::ShellExecutor;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - plan loading
/// - graph construction
/// - the shell executor
/// - progress printing and the optional JSON report
///
/// Returns whether the run succeeded (nothing failed, nothing skipped).
pub async fn run(args: CliArgs) -> Result<bool> {
    let plan_path = args
        .plan
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(default_plan_path);
    let plan = load_and_validate(&plan_path)
        .with_context(|| format!("loading plan from {:?}", plan_path))?;

    let mut graph = TaskGraph::from_tasks(plan.to_tasks());
    info!(tasks = graph.store().len(), plan = ?plan_path, "plan loaded");

    if args.graph {
        print!("{}", graph.to_dot());
        return Ok(true);
    }

    if args.dry_run {
        print_dry_run(&plan, &graph)?;
        return Ok(true);
    }

    let max_parallel = match args.max_parallel {
        Some(0) => bail!("--max-parallel must be >= 1"),
        Some(n) => n,
        None => plan.max_parallel(),
    };

    let executor = ShellExecutor::new(plan.commands()).with_timeout(plan.task_timeout());
    let printer = render::spawn_progress_printer(graph.subscribe());

    let report = graph
        .execute(&executor, ExecuteOptions::with_max_parallel(max_parallel))
        .await?;

    // Dropping the graph closes the event channel so the printer drains and
    // exits.
    drop(graph);
    printer.await.context("progress printer task")?;

    println!("{}", render::format_summary(&report));

    if let Some(path) = args.report.as_deref() {
        write_report(&report, Path::new(path))?;
    }

    Ok(report.success)
}

/// Serialize the report as pretty JSON to `path`.
pub fn write_report(report: &ExecutionReport, path: &Path) -> Result<()> {
    let json = report.to_json().context("serializing execution report")?;
    fs::write(path, json).with_context(|| format!("writing report to {:?}", path))?;
    debug!(path = ?path, "execution report written");
    Ok(())
}

/// Dry-run output: tasks, their dependencies, and the order they would
/// settle in if everything succeeded.
fn print_dry_run(plan: &PlanFile, graph: &TaskGraph) -> Result<()> {
    println!("taskgraph dry-run");
    println!("  config.max_parallel = {}", plan.max_parallel());
    if let Some(timeout) = plan.task_timeout() {
        println!("  config.task_timeout = {timeout:?}");
    }
    println!();

    println!("tasks ({}):", plan.tasks.len());
    for task in plan.tasks.iter() {
        println!("  - {}: {}", task.id, task.description);
        if let Some(ref cmd) = task.cmd {
            println!("      cmd: {cmd}");
        }
        if !task.after.is_empty() {
            println!("      after: {:?}", task.after);
        }
        let missing = graph.store().missing_dependencies(&task.id);
        if !missing.is_empty() {
            println!("      unreachable: {:?}", missing);
        }
        if let Some(role) = task.delegate_role {
            println!("      delegate_role: {role}");
        }
    }
    println!();

    let order = graph.topological_sort()?;
    println!("order: {}", order.join(" -> "));

    debug!("dry-run complete (no execution)");
    Ok(())
}
