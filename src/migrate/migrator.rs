use crate::error::MigrateError;
use crate::migrate::engine::apply_plan;
use crate::migrate::plan::{Directive, ExecutionPlan, compute_plan};
use crate::migration::{Catalog, Direction};
use crate::migration_tracking::{VersionState, VersionStateAccessor};
use crate::progress::StepReporter;
use crate::store::MigrationStore;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// What a plan-driven run did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied { from: u64, to: u64, steps: usize },
    /// The store already sat where the directive points
    NoChange { version: u64 },
}

/// Snapshot for the `version` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub state: VersionState,
    pub latest: u64,
    pub pending: usize,
}

/// A plan computed against the live record but not executed
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub current: u64,
    pub plan: ExecutionPlan,
}

/// Drives catalog, version record, planner and engine for one store.
///
/// Every operation that touches the record holds the store's advisory lock
/// for its whole duration and gives it back before returning, error or not.
pub struct Migrator<S: MigrationStore> {
    store: S,
    catalog: Catalog,
    quiet: bool,
}

impl<S: MigrationStore> Migrator<S> {
    pub fn new(store: S, catalog: Catalog) -> Self {
        Self {
            store,
            catalog,
            quiet: false,
        }
    }

    /// Suppress per-step progress lines
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Bring the store to the newest version in the catalog
    pub async fn sync(&mut self) -> Result<MigrationOutcome, MigrateError> {
        let latest = self.catalog.max_version();
        self.run(Directive::ToVersion(latest)).await
    }

    pub async fn up(&mut self) -> Result<MigrationOutcome, MigrateError> {
        self.run(Directive::All(Direction::Up)).await
    }

    pub async fn down(&mut self) -> Result<MigrationOutcome, MigrateError> {
        self.run(Directive::All(Direction::Down)).await
    }

    pub async fn steps(&mut self, n: i64) -> Result<MigrationOutcome, MigrateError> {
        self.run(Directive::StepN(n)).await
    }

    pub async fn migrate_to(&mut self, version: u64) -> Result<MigrationOutcome, MigrateError> {
        self.run(Directive::ToVersion(version)).await
    }

    /// Plan against the current record and execute it
    pub async fn run(&mut self, directive: Directive) -> Result<MigrationOutcome, MigrateError> {
        info!("Running {}", directive);
        let mut accessor = VersionStateAccessor::open(&mut self.store).await?;
        let result = run_locked(&self.catalog, &mut accessor, directive, self.quiet).await;
        finish(accessor, result).await
    }

    /// Compute the plan a run would execute without executing it
    pub async fn plan(&mut self, directive: Directive) -> Result<PlannedRun, MigrateError> {
        let accessor = VersionStateAccessor::open(&mut self.store).await?;
        let result = accessor.ensure_clean().and_then(|current| {
            let plan = compute_plan(current, &self.catalog, directive)?;
            Ok(PlannedRun { current, plan })
        });
        finish(accessor, result).await
    }

    /// Overwrite the record as clean at `version`, running nothing.
    ///
    /// This is the only operation allowed on a dirty store.
    pub async fn force(&mut self, version: u64) -> Result<VersionState, MigrateError> {
        let mut accessor = VersionStateAccessor::open(&mut self.store).await?;
        let previous = accessor.current_state();
        let result = accessor.force(version).await.map_err(MigrateError::from);
        if result.is_ok() {
            info!("Forced version {} (was {})", version, previous);
        }
        finish(accessor, result.map(|_| previous)).await
    }

    pub async fn version_info(&mut self) -> Result<VersionInfo, MigrateError> {
        let accessor = VersionStateAccessor::open(&mut self.store).await?;
        let state = accessor.current_state();
        let info = VersionInfo {
            state,
            latest: self.catalog.max_version(),
            pending: self
                .catalog
                .versions()
                .filter(|v| *v > state.version())
                .count(),
        };
        finish(accessor, Ok(info)).await
    }
}

async fn run_locked<S: MigrationStore + ?Sized>(
    catalog: &Catalog,
    accessor: &mut VersionStateAccessor<'_, S>,
    directive: Directive,
    quiet: bool,
) -> Result<MigrationOutcome, MigrateError> {
    let from = accessor.ensure_clean()?;
    let plan = compute_plan(from, catalog, directive)?;
    if plan.is_empty() {
        return Ok(MigrationOutcome::NoChange { version: from });
    }

    let start = Instant::now();
    let mut reporter = StepReporter::new(plan.len(), quiet);
    let to = apply_plan(&plan, accessor, &mut reporter).await?;
    reporter.summary(from, to, start.elapsed());

    Ok(MigrationOutcome::Applied {
        from,
        to,
        steps: plan.len(),
    })
}

/// Release the lock; a release failure only surfaces when nothing else failed
async fn finish<S: MigrationStore + ?Sized, T>(
    accessor: VersionStateAccessor<'_, S>,
    result: Result<T, MigrateError>,
) -> Result<T, MigrateError> {
    match (accessor.release().await, result) {
        (Ok(()), result) => result,
        (Err(release_err), Ok(_)) => Err(release_err.into()),
        (Err(release_err), Err(e)) => {
            warn!("Failed to release migration lock: {}", release_err);
            Err(e)
        }
    }
}
