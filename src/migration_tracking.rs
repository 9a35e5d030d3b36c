use crate::error::{MigrateError, StoreError};
use crate::store::{LockToken, MigrationStore};
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, warn};

/// Persisted version record as a state machine.
///
/// `Dirty(v)` means a step starting from version `v` began but never
/// confirmed completion, so the schema is somewhere between `v` and the
/// step's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "version", rename_all = "lowercase")]
pub enum VersionState {
    Clean(u64),
    Dirty(u64),
}

impl VersionState {
    pub fn version(self) -> u64 {
        match self {
            VersionState::Clean(v) | VersionState::Dirty(v) => v,
        }
    }

    pub fn is_dirty(self) -> bool {
        matches!(self, VersionState::Dirty(_))
    }

    /// A step is about to run
    pub fn begin_step(self) -> VersionState {
        VersionState::Dirty(self.version())
    }

    /// A step finished and left the schema at `version`
    pub fn complete_step(self, version: u64) -> VersionState {
        VersionState::Clean(version)
    }
}

impl Default for VersionState {
    fn default() -> Self {
        VersionState::Clean(0)
    }
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionState::Clean(v) => write!(f, "{}", v),
            VersionState::Dirty(v) => write!(f, "{} (dirty)", v),
        }
    }
}

/// Safely convert migration version from u64 to i64 for database storage
pub fn version_to_db(version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| {
        StoreError::InvalidState(format!(
            "Migration version {} is too large for database storage (exceeds i64::MAX)",
            version
        ))
    })
}

/// Safely convert migration version from i64 database storage to u64
pub fn version_from_db(version: i64) -> Result<u64, StoreError> {
    u64::try_from(version).map_err(|_| {
        StoreError::InvalidState(format!(
            "Found negative migration version {} in the database",
            version
        ))
    })
}

/// Validate and backtick-quote a tracking table name for MySQL
pub fn format_tracking_table_name(name: &str) -> Result<String> {
    fn is_valid_sql_identifier(name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return false;
        }
        name.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
    }

    if name.len() > 64 || !is_valid_sql_identifier(name) {
        return Err(anyhow::anyhow!(
            "Invalid tracking table name '{}': must be at most 64 letters, numbers, underscores, and dollar signs, starting with a letter or underscore",
            name
        ));
    }

    Ok(format!("`{}`", name))
}

/// Reads and conditionally writes the version record for one run.
///
/// Opening takes the store's advisory lock; [`release`](Self::release) gives
/// it back. Every write goes straight to the store so a crash never leaves a
/// stale record behind.
pub struct VersionStateAccessor<'s, S: MigrationStore + ?Sized> {
    store: &'s mut S,
    state: VersionState,
    lock: Option<LockToken>,
}

impl<'s, S: MigrationStore + ?Sized> VersionStateAccessor<'s, S> {
    /// Take the lock and read the current state.
    pub async fn open(store: &'s mut S) -> Result<Self, StoreError> {
        let token = store.acquire_lock().await?;
        debug!("Acquired migration lock '{}'", token.name);

        let state = match store.read_version_state().await {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                if let Err(release_err) = store.release_lock(token).await {
                    warn!("Failed to release migration lock: {}", release_err);
                }
                return Err(e);
            }
        };
        debug!("Current version state: {}", state);

        Ok(Self {
            store,
            state,
            lock: Some(token),
        })
    }

    pub fn current_state(&self) -> VersionState {
        self.state
    }

    /// The clean version to plan from, or `DirtyState` if a previous run broke off
    pub fn ensure_clean(&self) -> Result<u64, MigrateError> {
        match self.state {
            VersionState::Clean(v) => Ok(v),
            VersionState::Dirty(version) => Err(MigrateError::DirtyState { version }),
        }
    }

    /// Record that a step is starting, before its script runs
    pub async fn set_dirty(&mut self) -> Result<(), StoreError> {
        self.write(self.state.begin_step()).await
    }

    /// Record that a step finished at `version`
    pub async fn commit(&mut self, version: u64) -> Result<(), StoreError> {
        self.write(self.state.complete_step(version)).await
    }

    /// Overwrite the record without running anything
    pub async fn force(&mut self, version: u64) -> Result<(), StoreError> {
        if self.state.is_dirty() {
            warn!("Clearing dirty state at {} by forcing {}", self.state, version);
        }
        self.write(VersionState::Clean(version)).await
    }

    pub(crate) fn store_mut(&mut self) -> &mut S {
        self.store
    }

    /// Give the advisory lock back
    pub async fn release(mut self) -> Result<(), StoreError> {
        if let Some(token) = self.lock.take() {
            debug!("Releasing migration lock '{}'", token.name);
            self.store.release_lock(token).await?;
        }
        Ok(())
    }

    async fn write(&mut self, next: VersionState) -> Result<(), StoreError> {
        self.store.write_version_state(next).await?;
        debug!("Version state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}
