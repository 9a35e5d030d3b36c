pub mod check;
pub mod exit;
pub mod force;
pub mod new;
pub mod operation;
pub mod run;
pub mod version;

pub use check::cmd_check;
pub use exit::{FailureKind, StoreUnavailable};
pub use force::cmd_force;
pub use new::cmd_new;
pub use operation::{Operation, UsageError};
pub use run::cmd_run;
pub use version::{OutputFormat, cmd_version};

use crate::config::Config;
use crate::db::connection::mask_url_password;
use crate::store::MySqlStore;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Flags shared by every operation
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
    pub quiet: bool,
    pub format: OutputFormat,
}

/// Run one operation to completion
pub async fn dispatch(operation: Operation, config: &Config, options: &RunOptions) -> Result<()> {
    info!("Running operation: {}", operation);
    match operation {
        Operation::New(name) => cmd_new(config, name.as_deref()),
        Operation::Check => cmd_check(config),
        Operation::Force(version) => cmd_force(config, version).await,
        Operation::Version => cmd_version(config, options.format).await,
        other => cmd_run(config, &other, options).await,
    }
}

/// Connect to the configured database and prepare the version table
pub async fn open_store(config: &Config) -> Result<MySqlStore> {
    let url = config.database_url().map_err(|e| UsageError(e.to_string()))?;
    info!("Connecting to {}", mask_url_password(url));

    MySqlStore::connect(url, &config.store_options())
        .await
        .context(StoreUnavailable)
}

/// Close the session, logging rather than failing on errors
pub async fn close_store(store: MySqlStore) {
    if let Err(e) = store.close().await {
        warn!("Failed to close database connection: {}", e);
    }
}
