use crate::config::{merge::Merge, types::*};
use crate::constants::{ENV_DATABASE_URL, ENV_MIGRATION_COMMAND, ENV_MIGRATION_URL, ENV_SKIP_ALL};
use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

impl EnvOverrides {
    /// Read the fallbacks from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            database_url: non_empty(ENV_DATABASE_URL),
            migration_url: non_empty(ENV_MIGRATION_URL)
                .map(|url| strip_file_scheme(&url).to_string()),
            command: non_empty(ENV_MIGRATION_COMMAND),
            skip_all: lookup(ENV_SKIP_ALL)
                .map(|v| v.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    fn as_config_input(&self) -> ConfigInput {
        ConfigInput {
            database: Some(DatabaseInput {
                url: self.database_url.clone(),
                ..DatabaseInput::default()
            }),
            migrations: Some(MigrationsInput {
                dir: self.migration_url.clone(),
                ..MigrationsInput::default()
            }),
        }
    }
}

/// Migration roots may be given as `file://` URLs
pub fn strip_file_scheme(url: &str) -> &str {
    url.strip_prefix("file://").unwrap_or(url)
}

/// Layers file, environment and CLI input; later layers win
pub struct ConfigBuilder {
    config_input: ConfigInput,
    env: EnvOverrides,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
            env: EnvOverrides::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    pub fn with_env(mut self, env: EnvOverrides) -> Self {
        self.config_input = self.config_input.merge(env.as_config_input());
        self.env = env;
        self
    }

    pub fn with_cli_args(mut self, cli_input: ConfigInput) -> Self {
        self.warn_ignored_env(&cli_input);
        self.config_input = self.config_input.merge(cli_input);
        self
    }

    fn warn_ignored_env(&self, cli_input: &ConfigInput) {
        let cli_url = cli_input.database.as_ref().and_then(|d| d.url.as_ref());
        if cli_url.is_some() && self.env.database_url.is_some() {
            warn!("Both --database-url and {} are set; using --database-url", ENV_DATABASE_URL);
        }

        let cli_dir = cli_input.migrations.as_ref().and_then(|m| m.dir.as_ref());
        if cli_dir.is_some() && self.env.migration_url.is_some() {
            warn!("Both --migrations-dir and {} are set; using --migrations-dir", ENV_MIGRATION_URL);
        }
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            database: self.resolve_database(&defaults.database),
            migrations: self.resolve_migrations(&defaults.migrations)?,
        })
    }

    fn resolve_database(&self, defaults: &Database) -> Database {
        let db_input = self.config_input.database.as_ref();

        Database {
            url: db_input
                .and_then(|d| d.url.as_ref())
                .cloned()
                .or_else(|| defaults.url.clone()),
            connect_retries: db_input
                .and_then(|d| d.connect_retries)
                .unwrap_or(defaults.connect_retries),
            retry_delay: db_input
                .and_then(|d| d.retry_delay_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry_delay),
        }
    }

    fn resolve_migrations(&self, defaults: &Migrations) -> Result<Migrations> {
        let mig_input = self.config_input.migrations.as_ref();

        let dir = match mig_input.and_then(|m| m.dir.as_deref()) {
            Some(dir) => PathBuf::from(strip_file_scheme(dir)),
            None => defaults.dir.clone(),
        };

        let lock_timeout = mig_input
            .and_then(|m| m.lock_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.lock_timeout);
        if lock_timeout.is_zero() {
            return Err(anyhow!("migrations.lock_timeout_secs must be at least 1"));
        }
        // GET_LOCK takes a signed timeout and waits forever on negatives
        if i64::try_from(lock_timeout.as_secs()).is_err() {
            return Err(anyhow!(
                "migrations.lock_timeout_secs must be at most {}",
                i64::MAX
            ));
        }

        Ok(Migrations {
            dir,
            table: mig_input
                .and_then(|m| m.table.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.table.clone()),
            lock_timeout,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
