use crate::constants::{DOWN_SUFFIX, UP_SUFFIX, VERSION_WIDTH};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which way a script moves the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Up => UP_SUFFIX,
            Direction::Down => DOWN_SUFFIX,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A single versioned migration script on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    pub version: u64,
    pub name: String,
    pub direction: Direction,
    pub path: PathBuf,
}

/// Outcome of looking at a single filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFilename {
    /// `<digits>_<name>.<up|down>.sql`
    Migration {
        version: u64,
        name: String,
        direction: Direction,
    },
    /// Shaped like a migration but the digit run does not fit a u64
    VersionOverflow(String),
    /// Anything else; skipped during discovery
    Ignored,
}

/// Parse a migration filename like "00012_add_users.up.sql"
pub fn parse_migration_filename(filename: &str) -> ParsedFilename {
    let (stem, direction) = if let Some(stem) = filename.strip_suffix(UP_SUFFIX) {
        (stem, Direction::Up)
    } else if let Some(stem) = filename.strip_suffix(DOWN_SUFFIX) {
        (stem, Direction::Down)
    } else {
        return ParsedFilename::Ignored;
    };

    let Some((digits, name)) = stem.split_once('_') else {
        return ParsedFilename::Ignored;
    };

    if digits.is_empty() || name.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return ParsedFilename::Ignored;
    }

    match digits.parse::<u64>() {
        Ok(version) => ParsedFilename::Migration {
            version,
            name: name.to_string(),
            direction,
        },
        Err(_) => ParsedFilename::VersionOverflow(digits.to_string()),
    }
}

/// Generate a migration filename, zero-padding the version
pub fn format_migration_filename(version: u64, name: &str, direction: Direction) -> String {
    format!(
        "{:0width$}_{}{}",
        version,
        name,
        direction.suffix(),
        width = VERSION_WIDTH
    )
}
