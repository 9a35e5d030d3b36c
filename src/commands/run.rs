use crate::commands::operation::Operation;
use crate::commands::{RunOptions, close_store, open_store};
use crate::config::Config;
use crate::migrate::{ExecutionPlan, MigrationOutcome, Migrator, PlannedRun};
use crate::migration::{Direction, discover_migrations};
use anyhow::{Result, anyhow};
use console::style;
use tracing::info;

/// Plan-driven operations: up, down, sync, step and migrate
pub async fn cmd_run(config: &Config, operation: &Operation, options: &RunOptions) -> Result<()> {
    let catalog = discover_migrations(&config.migrations.dir)?;
    let directive = operation
        .directive(catalog.max_version())
        .ok_or_else(|| anyhow!("'{}' does not run migrations", operation))?;
    info!(
        "Found {} migration file(s) in {}",
        catalog.file_count(),
        config.migrations.dir.display()
    );

    let store = open_store(config).await?;
    let mut migrator = Migrator::new(store, catalog).quiet(options.quiet);

    let result = if options.dry_run {
        migrator.plan(directive).await.map(|planned| print_plan(&planned))
    } else {
        migrator.run(directive).await.map(print_outcome)
    };

    close_store(migrator.into_store()).await;
    Ok(result?)
}

fn print_outcome(outcome: MigrationOutcome) {
    match outcome {
        MigrationOutcome::NoChange { version } => {
            println!("No change: already at version {}", version);
        }
        MigrationOutcome::Applied { from, to, steps } => {
            info!("Applied {} step(s), {} -> {}", steps, from, to);
        }
    }
}

fn print_plan(planned: &PlannedRun) {
    if planned.plan.is_empty() {
        println!("No change: already at version {}", planned.current);
        return;
    }

    println!(
        "Dry run from version {} ({} step(s), nothing executed):",
        planned.current,
        planned.plan.len()
    );
    for line in plan_lines(&planned.plan) {
        println!("{}", line);
    }
}

fn plan_lines(plan: &ExecutionPlan) -> Vec<String> {
    plan.steps
        .iter()
        .map(|step| {
            let arrow = match step.file.direction {
                Direction::Up => style("↑").cyan(),
                Direction::Down => style("↓").magenta(),
            };
            let file_name = step
                .file
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| step.file.path.display().to_string());
            format!("  {} {} → {}", arrow, file_name, step.resulting_version)
        })
        .collect()
}
