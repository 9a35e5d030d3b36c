use crate::helpers::migration::MigrationDir;
use anyhow::Result;
use migrate_mariadb::migrate::{MigrationOutcome, Migrator};
use migrate_mariadb::migration_tracking::VersionState;
use migrate_mariadb::store::MemoryStore;
use rstest::rstest;
use std::collections::BTreeSet;

/// Moving to `target` and back to `start` restores the schema when each
/// down script reverses its up script.
#[rstest]
#[case(0, 4)]
#[case(1, 3)]
#[case(2, 2)]
#[case(0, 1)]
#[tokio::test]
async fn test_round_trip_restores_schema(#[case] start: u64, #[case] target: u64) -> Result<()> {
    let dir = MigrationDir::with_tables(4)?;
    let mut migrator = Migrator::new(MemoryStore::new(), dir.catalog()?).quiet(true);

    if start > 0 {
        migrator.migrate_to(start).await?;
    }
    let before: BTreeSet<String> = migrator.store().tables().clone();

    let outcome = migrator.migrate_to(target).await?;
    if start == target {
        assert_eq!(outcome, MigrationOutcome::NoChange { version: start });
    }
    migrator.migrate_to(start).await?;

    let store = migrator.into_store();
    assert_eq!(store.tables(), &before);
    assert_eq!(store.state(), Some(VersionState::Clean(start)));
    Ok(())
}

#[tokio::test]
async fn test_down_then_up_through_gaps() -> Result<()> {
    let dir = MigrationDir::new()?;
    dir.write_table_pair(2, "alpha")?;
    dir.write_table_pair(5, "beta")?;
    dir.write_table_pair(9, "gamma")?;

    let mut migrator = Migrator::new(MemoryStore::new(), dir.catalog()?).quiet(true);
    migrator.sync().await?;
    assert_eq!(migrator.store().tables().len(), 3);

    migrator.steps(-1).await?;
    assert_eq!(migrator.store().state(), Some(VersionState::Clean(5)));

    migrator.down().await?;
    assert!(migrator.store().tables().is_empty());
    assert_eq!(migrator.store().state(), Some(VersionState::Clean(0)));
    Ok(())
}
