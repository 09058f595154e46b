// src/config/mod.rs

//! Plan file loading and validation.
//!
//! - `model.rs`: the TOML-backed data model.
//! - `loader.rs`: reading a plan from disk.
//! - `validate.rs`: `RawPlanFile -> PlanFile` validation.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_plan_path, load_and_validate, load_from_path};
pub use model::{ConfigSection, PlanFile, RawPlanFile, TaskConfig};
pub use validate::parse_duration;
