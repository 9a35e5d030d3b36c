//! Versioned up/down SQL migrations for MySQL and MariaDB.
//!
//! Migration files live in one directory as `<version>_<name>.<up|down>.sql`.
//! A run reads the version record from the target database under an advisory
//! lock, plans the scripts that take it to the requested version, and applies
//! them one at a time, marking the record dirty while each script runs.

pub mod commands;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod migrate;
pub mod migration;
pub mod migration_tracking;
pub mod progress;
pub mod prompts;
pub mod store;
