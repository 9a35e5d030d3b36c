//! Typed errors for the migration core.
//!
//! Each class maps onto a distinct operator response: discovery errors mean the
//! files need fixing, dirty-state errors need a `force`, plan errors name the
//! offending version, and execution errors leave the store dirty.

use crate::migration::Direction;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(
        "Duplicate migration version {version} ({direction}): {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateVersion {
        version: u64,
        direction: Direction,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Invalid migration version in '{}': {reason}", path.display())]
    InvalidVersion { path: PathBuf, reason: String },

    #[error("Failed to read migrations directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Missing {direction} script for migration version {version}")]
    MissingScript { version: u64, direction: Direction },

    #[error("Requested {requested} {direction} step(s) but only {available} available")]
    InsufficientSteps {
        requested: u64,
        available: u64,
        direction: Direction,
    },

    #[error("Migration version {0} does not exist in the migrations directory")]
    UnknownVersion(u64),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{message}")]
    Script { message: String },

    #[error("Could not acquire migration lock '{name}' within {timeout_secs}s")]
    LockTimeout { name: String, timeout_secs: u64 },

    #[error("Invalid version state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error(transparent)]
    Discovery(#[from] CatalogError),

    #[error(
        "Database is dirty at version {version}. A previous migration failed or was interrupted.\n\
         Fix the schema manually, then run `force {version}` (or the version you repaired to)"
    )]
    DirtyState { version: u64 },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Migration {failed_version} failed ({}): {cause}", path.display())]
    Execution {
        failed_version: u64,
        path: PathBuf,
        #[source]
        cause: StoreError,
    },

    #[error("Failed to read migration script {}: {source}", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
