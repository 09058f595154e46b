// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{PlanFile, RawPlanFile};
use crate::errors::Result;

/// Load a plan file from a given path and return the raw `RawPlanFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPlanFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let plan: RawPlanFile = toml::from_str(&contents)?;

    Ok(plan)
}

/// Load a plan file from path and validate it.
///
/// Checks:
/// - at least one task,
/// - unique, non-empty task ids,
/// - `max_parallel >= 1`,
/// - a parseable `task_timeout`.
///
/// Dependency targets and cycles are left to the engine.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PlanFile> {
    let raw = load_from_path(&path)?;
    let plan = PlanFile::try_from(raw)?;
    Ok(plan)
}

/// Default plan path: `Taskgraph.toml`, or `$TASKGRAPH_PLAN` when set.
pub fn default_plan_path() -> PathBuf {
    std::env::var_os("TASKGRAPH_PLAN")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("Taskgraph.toml"))
}
