use crate::commands::{close_store, open_store};
use crate::config::Config;
use crate::migrate::{Migrator, VersionInfo};
use crate::migration::discover_migrations;
use anyhow::Result;
use console::style;

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON for scripts
    Json,
}

/// Show the recorded version, the newest file, and how far behind the store is
pub async fn cmd_version(config: &Config, format: OutputFormat) -> Result<()> {
    let catalog = discover_migrations(&config.migrations.dir)?;
    let store = open_store(config).await?;
    let mut migrator = Migrator::new(store, catalog);
    let result = migrator.version_info().await;
    close_store(migrator.into_store()).await;

    let info = result?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info)?),
        OutputFormat::Text => println!("{}", render_text(&info)),
    }
    Ok(())
}

fn render_text(info: &VersionInfo) -> String {
    let state = if info.state.is_dirty() {
        style(info.state.to_string()).red().to_string()
    } else {
        info.state.to_string()
    };
    format!(
        "Current version: {}\nLatest migration: {}\nPending: {}",
        state, info.latest, info.pending
    )
}
