use anyhow::Result;
use migrate_mariadb::migration::{Catalog, discover_migrations};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary migrations directory populated with table create/drop pairs
pub struct MigrationDir {
    pub temp_dir: TempDir,
}

impl MigrationDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// Versions 1..=n, each creating and dropping `table_<v>`
    pub fn with_tables(n: u64) -> Result<Self> {
        let dir = Self::new()?;
        for version in 1..=n {
            dir.write_table_pair(version, &format!("table_{}", version))?;
        }
        Ok(dir)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, file_name: &str, body: &str) -> Result<PathBuf> {
        let path = self.path().join(file_name);
        fs::write(&path, body)?;
        Ok(path)
    }

    pub fn write_table_pair(&self, version: u64, table: &str) -> Result<()> {
        self.write(
            &format!("{:05}_create_{}.up.sql", version, table),
            &format!("CREATE TABLE {} (id INT PRIMARY KEY);\n", table),
        )?;
        self.write(
            &format!("{:05}_create_{}.down.sql", version, table),
            &format!("DROP TABLE {};\n", table),
        )?;
        Ok(())
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Ok(discover_migrations(self.path())?)
    }
}
