use crate::commands::{close_store, open_store};
use crate::config::Config;
use crate::migrate::Migrator;
use crate::migration::discover_migrations;
use anyhow::Result;
use console::style;
use tracing::warn;

/// Overwrite the version record without running any script
pub async fn cmd_force(config: &Config, version: u64) -> Result<()> {
    let catalog = discover_migrations(&config.migrations.dir)?;
    if version != 0 && !catalog.contains(version) {
        warn!(
            "Version {} has no migration files in {}",
            version,
            config.migrations.dir.display()
        );
    }

    let store = open_store(config).await?;
    let mut migrator = Migrator::new(store, catalog);
    let result = migrator.force(version).await;
    close_store(migrator.into_store()).await;

    let previous = result?;
    println!(
        "{} Forced version {} (was {})",
        style("✓").green(),
        version,
        previous
    );
    Ok(())
}
