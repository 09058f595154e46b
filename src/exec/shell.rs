// src/exec/shell.rs

//! Shell command executor used by the `taskgraph` binary.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::dag::{Task, TaskId, TaskResult};
use crate::exec::backend::{ExecFuture, TaskExecutor};

/// Runs each task's configured command through the platform shell.
///
/// - exit status 0: success, stdout becomes the task output
/// - non-zero exit: `success = false`, stderr and exit code go into `error`
/// - timeout: the child is killed (`kill_on_drop`) and the task fails
///
/// Tasks without a command succeed immediately with empty output, so a plan
/// can use them as grouping nodes.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor {
    commands: HashMap<TaskId, String>,
    timeout: Option<Duration>,
}

impl ShellExecutor {
    pub fn new(commands: HashMap<TaskId, String>) -> Self {
        Self {
            commands,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, task: Task) -> Result<TaskResult> {
        let started = Instant::now();

        let Some(cmd_line) = self.commands.get(&task.id) else {
            debug!(task = %task.id, "no command configured; treating as no-op");
            return Ok(TaskResult::success("", started.elapsed()));
        };

        info!(task = %task.id, cmd = %cmd_line, "starting task process");

        let mut cmd = shell_command(cmd_line);
        cmd.env("TASKGRAPH_TASK_ID", &task.id)
            .env("TASKGRAPH_TASK_DESCRIPTION", &task.description)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning process for task '{}'", task.id))?;

        let waiting = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, waiting).await {
                Ok(res) => res,
                Err(_) => {
                    warn!(task = %task.id, ?limit, "task process timed out; killed");
                    return Ok(TaskResult::failure(
                        format!("timed out after {limit:?}"),
                        started.elapsed(),
                    ));
                }
            },
            None => waiting.await,
        }
        .with_context(|| format!("waiting for process of task '{}'", task.id))?;

        let duration = started.elapsed();
        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        let code = output.status.code().unwrap_or(-1);

        info!(
            task = %task.id,
            exit_code = code,
            success = output.status.success(),
            "task process exited"
        );

        if output.status.success() {
            Ok(TaskResult::success(stdout, duration))
        } else {
            let error = if stderr.is_empty() {
                format!("exit code {code}")
            } else {
                format!("exit code {code}: {stderr}")
            };
            Ok(TaskResult {
                success: false,
                output: stdout,
                duration,
                error: Some(error),
            })
        }
    }
}

impl TaskExecutor for ShellExecutor {
    fn execute(&self, task: Task) -> ExecFuture<'_> {
        Box::pin(self.run(task))
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd_line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    }
}
