//! Process exit codes by failure class.

use crate::commands::operation::UsageError;
use crate::error::{CatalogError, MigrateError, PlanError, StoreError};
use thiserror::Error;

/// Context attached when the store cannot be reached or prepared
#[derive(Debug, Error)]
#[error("Could not open the migration store")]
pub struct StoreUnavailable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Other,
    Usage,
    Validation,
    Plan,
    Execution,
    Store,
}

impl FailureKind {
    pub fn code(self) -> i32 {
        match self {
            FailureKind::Other => 1,
            FailureKind::Usage => 2,
            FailureKind::Validation => 3,
            FailureKind::Plan => 4,
            FailureKind::Execution => 5,
            FailureKind::Store => 6,
        }
    }

    /// Classify by the first typed error found in the chain
    pub fn of(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<StoreUnavailable>().is_some() {
            return FailureKind::Store;
        }

        error
            .chain()
            .find_map(|cause| {
                if cause.is::<UsageError>() {
                    Some(FailureKind::Usage)
                } else if let Some(e) = cause.downcast_ref::<MigrateError>() {
                    Some(Self::of_migrate_error(e))
                } else if cause.is::<CatalogError>() {
                    Some(FailureKind::Validation)
                } else if cause.is::<PlanError>() {
                    Some(FailureKind::Plan)
                } else if cause.is::<StoreError>() {
                    Some(FailureKind::Store)
                } else {
                    None
                }
            })
            .unwrap_or(FailureKind::Other)
    }

    fn of_migrate_error(error: &MigrateError) -> Self {
        match error {
            MigrateError::Discovery(_) | MigrateError::ScriptRead { .. } => FailureKind::Validation,
            MigrateError::DirtyState { .. } | MigrateError::Plan(_) => FailureKind::Plan,
            MigrateError::Execution { .. } => FailureKind::Execution,
            MigrateError::Store(_) => FailureKind::Store,
        }
    }
}
