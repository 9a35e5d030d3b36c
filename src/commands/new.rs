use crate::commands::UsageError;
use crate::config::Config;
use crate::migration::{create_migration_pair, validate_migration_name};
use crate::prompts::prompt_required_string_with_validation;
use anyhow::Result;
use std::io::IsTerminal;

/// Write the next up/down placeholder pair
pub fn cmd_new(config: &Config, name: Option<&str>) -> Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None if std::io::stdin().is_terminal() => prompt_required_string_with_validation(
            None,
            "Migration name",
            validate_migration_name,
        )?,
        None => {
            return Err(UsageError("Please specify a migration name".to_string()).into());
        }
    };

    validate_migration_name(&name)
        .map_err(|e| UsageError(format!("Invalid name '{}': {}", name, e)))?;

    let created = create_migration_pair(&config.migrations.dir, &name)?;

    println!("Created migration files:");
    println!("{}", created.up.display());
    println!("{}", created.down.display());
    Ok(())
}
