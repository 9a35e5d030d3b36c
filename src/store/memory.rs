//! In-process store used by the test suites.
//!
//! It understands just enough SQL to model a schema as a set of table names
//! (`CREATE TABLE x` / `DROP TABLE x`), which makes up/down round trips
//! observable without a server.

use crate::error::StoreError;
use crate::migration_tracking::VersionState;
use crate::store::{LockToken, MigrationStore};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const MEMORY_LOCK_NAME: &str = "memory";

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Option<VersionState>,
    state_history: Vec<VersionState>,
    executed: Vec<String>,
    tables: BTreeSet<String>,
    fail_marker: Option<String>,
    lock: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: VersionState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// A second, empty store contending for the same advisory lock
    pub fn sharing_lock(&self) -> Self {
        Self {
            lock: Arc::clone(&self.lock),
            ..Self::default()
        }
    }

    /// Make any script containing `marker` fail
    pub fn fail_on(mut self, marker: impl Into<String>) -> Self {
        self.fail_marker = Some(marker.into());
        self
    }

    pub fn state(&self) -> Option<VersionState> {
        self.state
    }

    /// Every record written, oldest first
    pub fn state_history(&self) -> &[VersionState] {
        &self.state_history
    }

    /// Scripts that ran successfully, in order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn tables(&self) -> &BTreeSet<String> {
        &self.tables
    }

    pub fn is_locked(&self) -> bool {
        self.lock.load(Ordering::SeqCst)
    }

    fn apply_statement(&mut self, statement: &str) -> Result<(), StoreError> {
        let words: Vec<&str> = statement.split_whitespace().collect();
        match words.as_slice() {
            [create, table, name, ..]
                if create.eq_ignore_ascii_case("CREATE") && table.eq_ignore_ascii_case("TABLE") =>
            {
                if !self.tables.insert(name.to_string()) {
                    return Err(StoreError::Script {
                        message: format!("Table '{}' already exists", name),
                    });
                }
            }
            [drop, table, name, ..]
                if drop.eq_ignore_ascii_case("DROP") && table.eq_ignore_ascii_case("TABLE") =>
            {
                if !self.tables.remove(*name) {
                    return Err(StoreError::Script {
                        message: format!("Unknown table '{}'", name),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[async_trait]
impl MigrationStore for MemoryStore {
    async fn execute(&mut self, script: &str) -> Result<(), StoreError> {
        if let Some(marker) = &self.fail_marker
            && script.contains(marker.as_str())
        {
            return Err(StoreError::Script {
                message: format!("Injected failure on '{}'", marker),
            });
        }

        let statements = script
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        for statement in statements.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            self.apply_statement(statement)?;
        }

        self.executed.push(script.to_string());
        Ok(())
    }

    async fn read_version_state(&mut self) -> Result<Option<VersionState>, StoreError> {
        Ok(self.state)
    }

    async fn write_version_state(&mut self, state: VersionState) -> Result<(), StoreError> {
        self.state = Some(state);
        self.state_history.push(state);
        Ok(())
    }

    async fn acquire_lock(&mut self) -> Result<LockToken, StoreError> {
        self.lock
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| StoreError::LockTimeout {
                name: MEMORY_LOCK_NAME.to_string(),
                timeout_secs: 0,
            })?;
        Ok(LockToken {
            name: MEMORY_LOCK_NAME.to_string(),
        })
    }

    async fn release_lock(&mut self, _token: LockToken) -> Result<(), StoreError> {
        self.lock.store(false, Ordering::SeqCst);
        Ok(())
    }
}
