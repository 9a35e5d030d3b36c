//! Planning and executing versioned migrations against a store.

pub mod engine;
pub mod migrator;
pub mod plan;

pub use engine::apply_plan;
pub use migrator::{MigrationOutcome, Migrator, PlannedRun, VersionInfo};
pub use plan::{Directive, ExecutionPlan, PlanStep, compute_plan};
