//! Runs a computed plan against a store, one recorded step at a time.
//!
//! Each step marks the record dirty, runs its script, then commits the
//! resulting version. A failure stops the run with the record left dirty at
//! the last completed version.

use crate::error::MigrateError;
use crate::migrate::plan::ExecutionPlan;
use crate::migration_tracking::VersionStateAccessor;
use crate::progress::StepReporter;
use crate::store::MigrationStore;
use std::time::Instant;
use tracing::{debug, info};

/// Apply every step of `plan` in order and return the version reached
pub async fn apply_plan<S: MigrationStore + ?Sized>(
    plan: &ExecutionPlan,
    accessor: &mut VersionStateAccessor<'_, S>,
    reporter: &mut StepReporter,
) -> Result<u64, MigrateError> {
    for step in &plan.steps {
        let file = &step.file;
        reporter.start_step(file.version, &file.name, file.direction);

        // Unreadable files stop the run before the record is touched
        let script = tokio::fs::read_to_string(&file.path)
            .await
            .map_err(|source| MigrateError::ScriptRead {
                path: file.path.clone(),
                source,
            })?;

        let start = Instant::now();
        accessor.set_dirty().await?;
        debug!(
            "Running {} ({} bytes)",
            file.path.display(),
            script.len()
        );

        if let Err(cause) = accessor.store_mut().execute(&script).await {
            reporter.fail_step(file.version, &cause);
            return Err(MigrateError::Execution {
                failed_version: file.version,
                path: file.path.clone(),
                cause,
            });
        }

        accessor.commit(step.resulting_version).await?;
        info!(
            "Applied {} {}_{} -> version {}",
            file.direction, file.version, file.name, step.resulting_version
        );
        reporter.complete_step(step.resulting_version, start.elapsed());
    }

    Ok(accessor.current_state().version())
}
