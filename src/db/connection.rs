use anyhow::Result;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;
use tracing::log::LevelFilter;

/// Mask password in database URL for display
pub fn mask_url_password(url: &str) -> String {
    // Handle case where URL doesn't contain ://
    if !url.contains("://") {
        return url.to_string();
    }

    let parts: Vec<&str> = url.splitn(2, "://").collect();
    if parts.len() != 2 {
        return url.to_string();
    }

    let protocol = parts[0];
    let rest = parts[1];

    // Check if there's user info (user:pass@host or user@host)
    if let Some(at_pos) = rest.rfind('@') {
        let user_info = &rest[..at_pos];
        let host_and_path = &rest[at_pos + 1..];

        if let Some(colon_pos) = user_info.find(':') {
            let username = &user_info[..colon_pos];
            return format!("{}://{}:***@{}", protocol, username, host_and_path);
        }
    }

    url.to_string()
}

/// Database connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Maximum number of retries for database connections
    pub max_retries: u32,
    /// Delay between connection retries
    pub retry_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Parse a MySQL/MariaDB URL with slow statement logging switched off.
///
/// Migration scripts are routinely slow and sqlx would otherwise log their
/// whole text once they pass its threshold.
pub fn parse_connect_options(url: &str) -> Result<MySqlConnectOptions> {
    let options = MySqlConnectOptions::from_str(url)
        .map_err(|e| anyhow::anyhow!("Invalid database URL {}: {}", mask_url_password(url), e))?
        .log_slow_statements(LevelFilter::Off, Duration::from_secs(0))
        .log_statements(LevelFilter::Debug);
    Ok(options)
}

/// Open a single dedicated connection, retrying transient failures.
///
/// Advisory locks belong to a session, so the whole run must use the
/// connection returned here rather than a pool.
pub async fn connect_with_retry(url: &str, config: &ConnectionConfig) -> Result<MySqlConnection> {
    let options = parse_connect_options(url)?;
    let mut last_error = None;

    for attempt in 0..=config.max_retries {
        match options.connect().await {
            Ok(conn) => {
                if attempt > 0 {
                    info!(
                        "Connected to database (after {} retr{})",
                        attempt,
                        if attempt == 1 { "y" } else { "ies" }
                    );
                } else {
                    info!("Connected to database");
                }
                return Ok(conn);
            }
            Err(e) => {
                last_error = Some(e);
                if attempt < config.max_retries {
                    if attempt == 0 {
                        info!("Database not ready, retrying...");
                    }
                    tokio::time::sleep(config.retry_delay).await;
                }
            }
        }
    }

    let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
    Err(anyhow::anyhow!(
        "Failed to connect to database at {} after {} attempts: {}",
        mask_url_password(url),
        config.max_retries + 1,
        last_error
    ))
}
