use crate::error::CatalogError;
use crate::migration::parsing::{Direction, MigrationFile, ParsedFilename, parse_migration_filename};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Up and down scripts registered for one version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionScripts {
    pub up: Option<MigrationFile>,
    pub down: Option<MigrationFile>,
}

impl VersionScripts {
    pub fn get(&self, direction: Direction) -> Option<&MigrationFile> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }

    fn slot(&mut self, direction: Direction) -> &mut Option<MigrationFile> {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
        }
    }
}

/// Validated set of migration files, ordered by version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    versions: BTreeMap<u64, VersionScripts>,
}

impl Catalog {
    /// Build a catalog from a directory listing.
    ///
    /// Entries that do not look like migrations are skipped. The listing is
    /// sorted by filename first so the result (and which pair a duplicate error
    /// names) does not depend on traversal order.
    pub fn from_paths<I>(paths: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut versions: BTreeMap<u64, VersionScripts> = BTreeMap::new();

        let named = paths
            .into_iter()
            .filter_map(|path| {
                let filename = path.file_name()?.to_str()?.to_string();
                Some((filename, path))
            })
            .sorted_by(|a, b| a.0.cmp(&b.0));

        for (filename, path) in named {
            let (version, name, direction) = match parse_migration_filename(&filename) {
                ParsedFilename::Migration {
                    version,
                    name,
                    direction,
                } => (version, name, direction),
                ParsedFilename::VersionOverflow(digits) => {
                    return Err(CatalogError::InvalidVersion {
                        path,
                        reason: format!("{} does not fit in an unsigned 64-bit integer", digits),
                    });
                }
                ParsedFilename::Ignored => {
                    debug!("Ignoring non-migration file {}", filename);
                    continue;
                }
            };

            let slot = versions.entry(version).or_default().slot(direction);
            if let Some(existing) = slot {
                return Err(CatalogError::DuplicateVersion {
                    version,
                    direction,
                    first: existing.path.clone(),
                    second: path,
                });
            }

            *slot = Some(MigrationFile {
                version,
                name,
                direction,
                path,
            });
        }

        Ok(Self { versions })
    }

    /// Highest version across both directions, 0 when empty
    pub fn max_version(&self) -> u64 {
        self.versions.keys().next_back().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Number of distinct versions
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Total number of script files
    pub fn file_count(&self) -> usize {
        self.versions
            .values()
            .map(|s| s.up.is_some() as usize + s.down.is_some() as usize)
            .sum()
    }

    pub fn contains(&self, version: u64) -> bool {
        self.versions.contains_key(&version)
    }

    pub fn get(&self, version: u64, direction: Direction) -> Option<&MigrationFile> {
        self.versions.get(&version).and_then(|s| s.get(direction))
    }

    /// All versions in ascending order
    pub fn versions(&self) -> impl DoubleEndedIterator<Item = u64> + '_ {
        self.versions.keys().copied()
    }

    /// Largest catalog version strictly below `version`, or 0
    pub fn previous_version(&self, version: u64) -> u64 {
        self.versions
            .range(..version)
            .next_back()
            .map(|(v, _)| *v)
            .unwrap_or(0)
    }

    /// Register a file directly; used by tests building catalogs by hand
    #[cfg(test)]
    pub(crate) fn insert(&mut self, file: MigrationFile) -> Result<(), CatalogError> {
        let slot = self.versions.entry(file.version).or_default().slot(file.direction);
        if let Some(existing) = slot {
            return Err(CatalogError::DuplicateVersion {
                version: file.version,
                direction: file.direction,
                first: existing.path.clone(),
                second: file.path,
            });
        }
        *slot = Some(file);
        Ok(())
    }
}

/// Scan the top level of `migrations_dir` and build a catalog.
///
/// A missing directory is treated as an empty catalog.
pub fn discover_migrations(migrations_dir: &Path) -> Result<Catalog, CatalogError> {
    if !migrations_dir.exists() {
        debug!(
            "Migrations directory {} does not exist",
            migrations_dir.display()
        );
        return Ok(Catalog::default());
    }

    let io_err = |source| CatalogError::Io {
        path: migrations_dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(migrations_dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            paths.push(entry.path());
        }
    }

    let catalog = Catalog::from_paths(paths)?;
    debug!(
        "Discovered {} migration files across {} versions in {}",
        catalog.file_count(),
        catalog.len(),
        migrations_dir.display()
    );
    Ok(catalog)
}
