use anyhow::Result;
use migrate_mariadb::error::CatalogError;
use migrate_mariadb::migration::{Direction, discover_migrations};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_discovers_pairs_and_ignores_other_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path();

    fs::write(dir.join("00001_init.up.sql"), "CREATE TABLE a (id INT);")?;
    fs::write(dir.join("00001_init.down.sql"), "DROP TABLE a;")?;
    fs::write(dir.join("00002_users.up.sql"), "CREATE TABLE users (id INT);")?;
    fs::write(dir.join("README.md"), "# migrations")?;
    fs::write(dir.join("seed.sql"), "INSERT INTO a VALUES (1);")?;
    fs::write(dir.join("00003_notes.sql"), "-- no direction")?;

    let catalog = discover_migrations(dir)?;

    assert_eq!(catalog.versions().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(catalog.file_count(), 3);
    assert_eq!(catalog.max_version(), 2);
    assert_eq!(catalog.get(2, Direction::Up).unwrap().name, "users");
    assert!(catalog.get(2, Direction::Down).is_none());
    Ok(())
}

#[test]
fn test_subdirectories_are_not_scanned() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("archive");
    fs::create_dir_all(&nested)?;
    fs::write(nested.join("00009_old.up.sql"), "SELECT 1;")?;
    fs::write(temp_dir.path().join("00001_a.up.sql"), "SELECT 1;")?;

    let catalog = discover_migrations(temp_dir.path())?;
    assert_eq!(catalog.max_version(), 1);
    Ok(())
}

#[test]
fn test_duplicate_version_identifies_version_three() -> Result<()> {
    let temp_dir = TempDir::new()?;
    fs::write(temp_dir.path().join("00003_a.up.sql"), "SELECT 1;")?;
    fs::write(temp_dir.path().join("00003_b.up.sql"), "SELECT 2;")?;

    let err = discover_migrations(temp_dir.path()).unwrap_err();
    match &err {
        CatalogError::DuplicateVersion {
            version, direction, ..
        } => {
            assert_eq!(*version, 3);
            assert_eq!(*direction, Direction::Up);
        }
        other => panic!("Expected duplicate version error, got {:?}", other),
    }
    assert!(err.to_string().contains("Duplicate migration version 3"));
    Ok(())
}

#[test]
fn test_discovery_is_deterministic() -> Result<()> {
    let temp_dir = TempDir::new()?;
    for name in ["00010_j.up.sql", "00002_b.up.sql", "00007_g.down.sql", "00002_b.down.sql"] {
        fs::write(temp_dir.path().join(name), "SELECT 1;")?;
    }

    let first = discover_migrations(temp_dir.path())?;
    let second = discover_migrations(temp_dir.path())?;
    assert_eq!(first, second);
    assert_eq!(first.versions().collect::<Vec<_>>(), vec![2, 7, 10]);
    Ok(())
}
