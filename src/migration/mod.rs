pub mod catalog;
pub mod parsing;
pub mod scaffold;

pub use catalog::{Catalog, VersionScripts, discover_migrations};

pub use parsing::{
    Direction, MigrationFile, ParsedFilename, format_migration_filename, parse_migration_filename,
};

pub use scaffold::{CreatedMigration, create_migration_pair, validate_migration_name};
