use crate::config::Config;
use crate::migration::discover_migrations;
use anyhow::Result;
use console::style;

/// Validate the migrations directory without touching the database
pub fn cmd_check(config: &Config) -> Result<()> {
    let catalog = discover_migrations(&config.migrations.dir)?;

    println!(
        "{} All migration files are unique ({} file(s), {} version(s), latest {})",
        style("✓").green(),
        catalog.file_count(),
        catalog.len(),
        catalog.max_version()
    );
    Ok(())
}
