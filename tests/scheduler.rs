// tests/scheduler.rs

use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use taskgraph::dag::{TaskResult, TaskStatus};
use taskgraph::engine::{ExecuteOptions, GraphEvent, TaskGraph};
use taskgraph::errors::GraphError;
use taskgraph::exec::executor_fn;
use taskgraph_test_utils::builders::{GraphBuilder, TaskBuilder};
use taskgraph_test_utils::fake_executor::{Behaviour, ScriptedExecutor};
use taskgraph_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn chain() -> TaskGraph {
    GraphBuilder::new()
        .task("A", &[])
        .task("B", &["A"])
        .task("C", &["B"])
        .build()
}

fn drain(rx: &mut mpsc::UnboundedReceiver<GraphEvent>) -> Vec<GraphEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn index_of(events: &[GraphEvent], pred: impl Fn(&GraphEvent) -> bool) -> usize {
    events
        .iter()
        .position(pred)
        .unwrap_or_else(|| panic!("event not found in {events:?}"))
}

fn status_of(graph: &TaskGraph, id: &str) -> TaskStatus {
    graph.get_task(id).expect("task exists").status
}

#[tokio::test]
async fn chain_runs_in_dependency_order() -> TestResult {
    init_tracing();

    let mut graph = chain();
    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new();

    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert!(report.success);
    assert_eq!(report.completed_count, 3);
    assert_eq!(report.failed_count, 0);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(report.rounds, 3);
    assert_eq!(exec.started(), vec!["A", "B", "C"]);
    assert_eq!(report.results["B"].output, "B done");

    let events = drain(&mut rx);
    let completed_a = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskCompleted { id, .. } if id == "A")
    });
    let running_b = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskRunning { id } if id == "B")
    });
    let completed_b = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskCompleted { id, .. } if id == "B")
    });
    let running_c = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskRunning { id } if id == "C")
    });
    assert!(completed_a < running_b);
    assert!(completed_b < running_c);

    Ok(())
}

#[tokio::test]
async fn failure_skips_downstream_chain() -> TestResult {
    init_tracing();

    let mut graph = chain();
    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new().fail("A");

    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert!(!report.success);
    assert_eq!(report.failed_count, 1);
    assert_eq!(report.skipped_count, 2);
    assert_eq!(report.completed_count, 0);
    assert_eq!(exec.started(), vec!["A"]);
    assert_eq!(status_of(&graph, "B"), TaskStatus::Skipped);
    assert_eq!(status_of(&graph, "C"), TaskStatus::Skipped);
    assert_eq!(report.results["A"].error.as_deref(), Some("A failed"));
    assert!(!report.results.contains_key("B"));
    assert_eq!(report.failed_ids(), vec!["A"]);

    let skips: Vec<GraphEvent> = drain(&mut rx)
        .into_iter()
        .filter(|e| matches!(e, GraphEvent::TaskSkipped { .. }))
        .collect();
    assert_eq!(skips.len(), 2);
    for event in skips {
        if let GraphEvent::TaskSkipped { reason, .. } = event {
            assert!(reason.contains("'A'"));
        }
    }

    Ok(())
}

#[tokio::test]
async fn max_parallel_one_runs_independent_tasks_in_separate_rounds() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("A", &[])
        .task("B", &[])
        .task("C", &[])
        .build();
    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new().with_delay(Duration::from_millis(5));

    let report =
        with_timeout(graph.execute(&exec, ExecuteOptions::with_max_parallel(1))).await?;

    assert!(report.success);
    assert_eq!(report.completed_count, 3);
    assert_eq!(report.rounds, 3);
    assert_eq!(exec.peak_concurrency(), 1);
    assert_eq!(exec.started(), vec!["A", "B", "C"]);

    let batches: Vec<(usize, usize)> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            GraphEvent::BatchComplete {
                round, admitted, ..
            } => Some((round, admitted)),
            _ => None,
        })
        .collect();
    assert_eq!(batches, vec![(1, 1), (2, 1), (3, 1)]);

    Ok(())
}

#[tokio::test]
async fn batch_size_is_bounded_by_max_parallel() -> TestResult {
    init_tracing();

    let mut builder = GraphBuilder::new();
    for i in 0..6 {
        builder = builder.task(&format!("t{i}"), &[]);
    }
    let mut graph = builder.build();
    let exec = ScriptedExecutor::new().with_delay(Duration::from_millis(20));

    let report =
        with_timeout(graph.execute(&exec, ExecuteOptions::with_max_parallel(2))).await?;

    assert!(report.success);
    assert_eq!(report.rounds, 3);
    assert_eq!(exec.peak_concurrency(), 2);
    assert_eq!(exec.started(), vec!["t0", "t1", "t2", "t3", "t4", "t5"]);

    Ok(())
}

#[tokio::test]
async fn rounds_are_not_refilled_mid_round() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("slow", &[])
        .task("fast", &[])
        .task("late", &[])
        .build();
    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new()
        .delay_task("slow", Duration::from_millis(80))
        .delay_task("fast", Duration::from_millis(1));

    with_timeout(graph.execute(&exec, ExecuteOptions::with_max_parallel(2))).await?;

    assert_eq!(exec.finished(), vec!["fast", "slow", "late"]);

    let events = drain(&mut rx);
    let slow_done = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskCompleted { id, .. } if id == "slow")
    });
    let late_running = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskRunning { id } if id == "late")
    });
    assert!(slow_done < late_running);

    Ok(())
}

#[tokio::test]
async fn sibling_failure_does_not_cancel_batch() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("bad", &[])
        .task("good", &[])
        .task("after_good", &["good"])
        .build();
    let exec = ScriptedExecutor::new()
        .fail("bad")
        .delay_task("good", Duration::from_millis(30));

    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert!(!report.success);
    assert_eq!(report.failed_count, 1);
    assert_eq!(report.completed_count, 2);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(status_of(&graph, "good"), TaskStatus::Completed);
    assert_eq!(status_of(&graph, "after_good"), TaskStatus::Completed);

    Ok(())
}

#[tokio::test]
async fn executor_errors_and_panics_fail_the_task_only() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("errs", &[])
        .task("panics", &[])
        .task("down", &["panics"])
        .task("fine", &[])
        .build();
    let exec = ScriptedExecutor::new()
        .behave("errs", Behaviour::Error("connection reset".into()))
        .behave("panics", Behaviour::Panic("boom".into()));

    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert_eq!(report.failed_count, 2);
    assert_eq!(report.skipped_count, 1);
    assert_eq!(report.completed_count, 1);

    let errs = &report.results["errs"];
    assert!(!errs.success);
    assert_eq!(errs.error.as_deref(), Some("connection reset"));

    let panics = &report.results["panics"];
    assert!(
        panics
            .error
            .as_deref()
            .is_some_and(|e| e.contains("executor panicked") && e.contains("boom"))
    );
    assert_eq!(status_of(&graph, "down"), TaskStatus::Skipped);

    Ok(())
}

#[tokio::test]
async fn unsuccessful_result_without_error_gets_one() -> TestResult {
    let mut graph = GraphBuilder::new().task("A", &[]).build();
    let exec = executor_fn(|_task| async move {
        Ok::<_, anyhow::Error>(TaskResult {
            success: false,
            output: "partial".into(),
            duration: Duration::from_millis(3),
            error: None,
        })
    });

    let report = graph.execute(&exec, ExecuteOptions::default()).await?;

    let result = &report.results["A"];
    assert_eq!(result.output, "partial");
    assert_eq!(result.error.as_deref(), Some("task reported failure"));
    assert_eq!(result.duration, Duration::from_millis(3));

    Ok(())
}

#[tokio::test]
async fn isolated_task_with_missing_dependency_deadlocks_and_fails() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new().task("X", &["ghost"]).build();
    assert!(graph.get_ready().is_empty());

    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new();
    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert!(!report.success);
    assert_eq!(report.rounds, 0);
    assert_eq!(report.failed_count, 1);
    assert!(exec.started().is_empty());
    assert_eq!(status_of(&graph, "X"), TaskStatus::Failed);

    let error = report.results["X"].error.clone().unwrap_or_default();
    assert!(error.contains("unreachable dependency"), "{error}");
    assert!(error.contains("ghost"), "{error}");

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], GraphEvent::TaskFailed { id, .. } if id == "X"));

    Ok(())
}

#[tokio::test]
async fn deadlock_fails_every_stuck_task() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("Y", &["X"])
        .task("X", &["ghost"])
        .task("free", &[])
        .build();
    let mut rx = graph.subscribe();
    let exec = ScriptedExecutor::new();

    let report = with_timeout(graph.execute(&exec, ExecuteOptions::default())).await?;

    assert_eq!(exec.started(), vec!["free"]);
    assert_eq!(report.completed_count, 1);
    assert_eq!(report.failed_count, 2);
    assert_eq!(report.skipped_count, 0);
    assert_eq!(status_of(&graph, "X"), TaskStatus::Failed);
    assert_eq!(status_of(&graph, "Y"), TaskStatus::Failed);

    let x_error = report.results["X"].error.clone().unwrap_or_default();
    assert!(x_error.contains("unreachable dependency"), "{x_error}");
    assert!(x_error.contains("ghost"), "{x_error}");

    let y_error = report.results["Y"].error.clone().unwrap_or_default();
    assert!(y_error.contains("unreachable dependency"), "{y_error}");
    assert!(y_error.contains("\"X\""), "{y_error}");

    let events = drain(&mut rx);
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GraphEvent::TaskSkipped { .. }))
    );
    // Dependents are failed before the task they wait on.
    let y_failed = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskFailed { id, .. } if id == "Y")
    });
    let x_failed = index_of(&events, |e| {
        matches!(e, GraphEvent::TaskFailed { id, .. } if id == "X")
    });
    assert!(y_failed < x_failed);

    Ok(())
}

#[tokio::test]
async fn cyclic_graph_is_rejected_before_anything_runs() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("free", &[])
        .task("A", &["B"])
        .task("B", &["A"])
        .build();
    let exec = ScriptedExecutor::new();

    let result = graph.execute(&exec, ExecuteOptions::default()).await;

    assert!(matches!(result, Err(GraphError::GraphCycle(_))));
    assert!(exec.started().is_empty());
    assert_eq!(graph.get_progress().pending, 3);

    Ok(())
}

// Skipped dependencies are treated as satisfied; a dependent that was not
// pending when the cascade ran still executes.
#[tokio::test]
async fn task_downstream_of_skipped_task_still_runs() -> TestResult {
    init_tracing();

    let mut graph = GraphBuilder::new()
        .task("A", &[])
        .task("B", &["A"])
        .build();
    graph.mark_failed("A", "failed before the run")?;
    graph.add_task(TaskBuilder::new("D").after("B").build());

    let exec = ScriptedExecutor::new();
    let report = graph.execute(&exec, ExecuteOptions::default()).await?;

    assert_eq!(exec.started(), vec!["D"]);
    assert_eq!(status_of(&graph, "D"), TaskStatus::Completed);
    assert!(!report.success);

    Ok(())
}

#[tokio::test]
async fn empty_graph_succeeds_immediately() -> TestResult {
    let mut graph = TaskGraph::new();
    let exec = ScriptedExecutor::new();

    let report = graph.execute(&exec, ExecuteOptions::default()).await?;

    assert!(report.success);
    assert_eq!(report.rounds, 0);
    assert!(report.results.is_empty());

    Ok(())
}

#[tokio::test]
async fn zero_max_parallel_is_treated_as_one() -> TestResult {
    let mut graph = GraphBuilder::new().task("A", &[]).task("B", &[]).build();
    let exec = ScriptedExecutor::new();

    let report = graph
        .execute(&exec, ExecuteOptions::with_max_parallel(0))
        .await?;

    assert!(report.success);
    assert_eq!(report.rounds, 2);

    Ok(())
}

#[tokio::test]
async fn closure_executor_sees_task_metadata() -> TestResult {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_exec = Arc::clone(&seen);

    let mut graph = GraphBuilder::new()
        .with_task(TaskBuilder::new("plan").description("write a plan").build())
        .with_task(TaskBuilder::new("code").after("plan").build())
        .build();

    let exec = executor_fn(move |task| {
        let seen = Arc::clone(&seen_in_exec);
        async move {
            seen.lock().unwrap().push(task.description.clone());
            Ok::<_, anyhow::Error>(TaskResult::success(task.id.to_uppercase(), Duration::ZERO))
        }
    });

    let report = graph.execute(&exec, ExecuteOptions::default()).await?;

    assert!(report.success);
    assert_eq!(report.results["code"].output, "CODE");
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["write a plan".to_string(), "task code".to_string()]
    );

    Ok(())
}

#[tokio::test]
async fn report_serializes_durations_as_millis() -> TestResult {
    let mut graph = GraphBuilder::new().task("A", &[]).build();
    let exec = executor_fn(|_task| async move {
        Ok::<_, anyhow::Error>(TaskResult::success("ok", Duration::from_millis(42)))
    });

    let report = graph.execute(&exec, ExecuteOptions::default()).await?;
    let json: serde_json::Value = serde_json::to_value(&report)?;

    assert_eq!(json["success"], true);
    assert_eq!(json["results"]["A"]["duration_ms"], 42);
    assert!(json["total_duration_ms"].is_u64());
    assert_eq!(json["completed_count"], 1);

    Ok(())
}

#[tokio::test]
async fn report_lists_results_in_graph_order() -> TestResult {
    let mut graph = GraphBuilder::new()
        .task("zeta", &[])
        .task("alpha", &["zeta"])
        .task("mid", &[])
        .build();
    let exec = ScriptedExecutor::new().fail("mid");

    let report = graph.execute(&exec, ExecuteOptions::default()).await?;

    let ids: Vec<&str> = report.results.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
    assert_eq!(report.failed_ids(), vec!["mid"]);

    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;
    let keys: Vec<&str> = json["results"]
        .as_object()
        .map(|o| o.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys.len(), 3);
    assert_eq!(json["results"]["mid"]["error"], "mid failed");

    Ok(())
}
