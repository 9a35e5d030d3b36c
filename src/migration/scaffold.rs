use crate::constants::{DOWN_PLACEHOLDER, UP_PLACEHOLDER};
use crate::migration::catalog::discover_migrations;
use crate::migration::parsing::{Direction, format_migration_filename};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Paths written by [`create_migration_pair`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedMigration {
    pub version: u64,
    pub up: PathBuf,
    pub down: PathBuf,
}

/// Check a migration name before it becomes part of a filename
pub fn validate_migration_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Migration name cannot be empty".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("Migration name cannot contain path separators".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err("Migration name cannot contain whitespace".to_string());
    }
    if name.len() > 100 {
        return Err("Migration name must be 100 characters or less".to_string());
    }
    Ok(())
}

/// Write an empty up/down pair numbered one past the current maximum version.
///
/// The catalog is validated first, so a directory with duplicate versions
/// refuses to grow until it is fixed.
pub fn create_migration_pair(migrations_dir: &Path, name: &str) -> Result<CreatedMigration> {
    validate_migration_name(name).map_err(|e| anyhow::anyhow!("Invalid name '{}': {}", name, e))?;

    let catalog = discover_migrations(migrations_dir)?;
    let version = catalog
        .max_version()
        .checked_add(1)
        .context("Migration version space exhausted")?;

    std::fs::create_dir_all(migrations_dir).with_context(|| {
        format!(
            "Failed to create migrations directory {}",
            migrations_dir.display()
        )
    })?;

    let up = migrations_dir.join(format_migration_filename(version, name, Direction::Up));
    let down = migrations_dir.join(format_migration_filename(version, name, Direction::Down));

    write_new_file(&up, UP_PLACEHOLDER)?;
    if let Err(e) = write_new_file(&down, DOWN_PLACEHOLDER) {
        let _ = std::fs::remove_file(&up);
        return Err(e);
    }

    Ok(CreatedMigration { version, up, down })
}

fn write_new_file(path: &Path, contents: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
