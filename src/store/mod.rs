//! The capability the migration core needs from a target datastore.
//!
//! A store runs raw script text, persists the single version-state record,
//! and provides an exclusive advisory lock for the duration of a run.

pub mod memory;
pub mod mysql;

use crate::error::StoreError;
use crate::migration_tracking::VersionState;
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Proof that the advisory lock is held; handed back on release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockToken {
    pub name: String,
}

#[async_trait]
pub trait MigrationStore: Send {
    /// Run a script's full text as one logical operation
    async fn execute(&mut self, script: &str) -> Result<(), StoreError>;

    /// `None` when no version has ever been recorded
    async fn read_version_state(&mut self) -> Result<Option<VersionState>, StoreError>;

    /// Atomically replace the persisted record
    async fn write_version_state(&mut self, state: VersionState) -> Result<(), StoreError>;

    async fn acquire_lock(&mut self) -> Result<LockToken, StoreError>;

    async fn release_lock(&mut self, token: LockToken) -> Result<(), StoreError>;
}
