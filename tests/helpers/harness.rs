use migrate_mariadb::db::connection::ConnectionConfig;
use migrate_mariadb::store::mysql::{MySqlStore, MySqlStoreOptions};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// External MySQL/MariaDB server taken from DATABASE_URL.
/// Tests that need one return early when it is not configured.
pub struct MySqlTestInstance {
    options: MySqlConnectOptions,
}

/// An isolated database created for a single test
pub struct TestDatabase {
    name: String,
    server: MySqlConnectOptions,
    options: MySqlConnectOptions,
}

impl MySqlTestInstance {
    pub fn from_env() -> Option<Self> {
        dotenv::dotenv().ok();

        let url = std::env::var("DATABASE_URL").ok()?;
        if !(url.starts_with("mysql://") || url.starts_with("mariadb://")) {
            eprintln!("DATABASE_URL is not a MySQL/MariaDB URL, skipping store test");
            return None;
        }
        let options = MySqlConnectOptions::from_str(&url)
            .expect("DATABASE_URL is not a valid MySQL connection URL");
        Some(Self { options })
    }

    pub async fn create_test_database(&self) -> TestDatabase {
        let name = format!("test_{}", Uuid::new_v4().simple());

        let mut conn = self
            .options
            .connect()
            .await
            .expect("Failed to connect to MySQL. Make sure the server is running and DATABASE_URL is correct.");
        sqlx::query(&format!("CREATE DATABASE `{}`", name))
            .execute(&mut conn)
            .await
            .expect("Failed to create test database");
        let _ = conn.close().await;

        TestDatabase {
            options: self.options.clone().database(&name),
            server: self.options.clone(),
            name,
        }
    }
}

impl TestDatabase {
    /// A fresh session on the test database
    pub async fn connect(&self) -> MySqlConnection {
        self.options
            .connect()
            .await
            .expect("Failed to connect to test database")
    }

    pub fn store_options(&self, lock_timeout: Duration) -> MySqlStoreOptions {
        MySqlStoreOptions {
            tracking_table: "schema_migrations".to_string(),
            lock_timeout,
            connection: ConnectionConfig::default(),
        }
    }

    /// A store on its own session, so two stores compete for the lock
    pub async fn store(&self, lock_timeout: Duration) -> MySqlStore {
        MySqlStore::from_connection(self.connect().await, &self.store_options(lock_timeout))
            .await
            .expect("Failed to open MySQL store")
    }

    pub async fn row_count(&self, table: &str) -> i64 {
        let mut conn = self.connect().await;
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM `{}`", table))
            .fetch_one(&mut conn)
            .await
            .unwrap_or_else(|e| panic!("Failed to count rows in {}: {}", table, e));
        let _ = conn.close().await;
        count
    }

    pub async fn table_exists(&self, table: &str) -> bool {
        let mut conn = self.connect().await;
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
        )
        .bind(&self.name)
        .bind(table)
        .fetch_one(&mut conn)
        .await
        .expect("Failed to query information_schema");
        let _ = conn.close().await;
        count > 0
    }

    /// Drop the test database - best effort async cleanup
    pub async fn cleanup(self) {
        let drop_sql = format!("DROP DATABASE IF EXISTS `{}`", self.name);
        let server = self.server;

        let cleanup_future = async move {
            if let Ok(mut conn) = server.connect().await {
                let _ = sqlx::query(&drop_sql).execute(&mut conn).await;
                let _ = conn.close().await;
            }
        };

        let _ = tokio::time::timeout(Duration::from_secs(5), cleanup_future).await;
    }
}
