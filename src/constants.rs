use std::time::Duration;

// Migration file naming conventions
pub const UP_SUFFIX: &str = ".up.sql";
pub const DOWN_SUFFIX: &str = ".down.sql";
pub const VERSION_WIDTH: usize = 5;

// Placeholder bodies written by `new`
pub const UP_PLACEHOLDER: &str = "-- write your UP migration here\n";
pub const DOWN_PLACEHOLDER: &str = "-- write your DOWN migration here\n";

// Version tracking
pub const DEFAULT_TRACKING_TABLE: &str = "schema_migrations";
pub const LOCK_NAME_PREFIX: &str = "migrate-mariadb";
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

// Configuration file name
pub const CONFIG_FILENAME: &str = "migrate.yaml";

// Environment fallbacks
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_MIGRATION_URL: &str = "MIGRATION_URL";
pub const ENV_MIGRATION_COMMAND: &str = "MIGRATION_COMMAND";
pub const ENV_SKIP_ALL: &str = "SKIP_ALL";
