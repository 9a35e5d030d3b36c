use crate::config::types::*;
use crate::constants::{DEFAULT_LOCK_TIMEOUT, DEFAULT_TRACKING_TABLE};
use crate::db::connection::ConnectionConfig;
use std::path::PathBuf;

impl Default for Database {
    fn default() -> Self {
        let connection = ConnectionConfig::default();
        Self {
            url: None,
            connect_retries: connection.max_retries,
            retry_delay: connection.retry_delay,
        }
    }
}

impl Default for Migrations {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("migrations"),
            table: DEFAULT_TRACKING_TABLE.to_string(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}
