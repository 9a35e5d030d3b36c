use crate::helpers::harness::MySqlTestInstance;
use crate::helpers::migration::MigrationDir;
use anyhow::Result;
use migrate_mariadb::error::{MigrateError, StoreError};
use migrate_mariadb::migrate::{MigrationOutcome, Migrator};
use migrate_mariadb::migration_tracking::VersionState;
use migrate_mariadb::store::MigrationStore;
use std::time::Duration;

const LOCK_TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn test_version_state_round_trip() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let mut store = db.store(LOCK_TIMEOUT).await;

    assert_eq!(store.read_version_state().await?, None);

    store.write_version_state(VersionState::Clean(3)).await?;
    assert_eq!(store.read_version_state().await?, Some(VersionState::Clean(3)));
    assert_eq!(db.row_count("schema_migrations").await, 1);

    store.write_version_state(VersionState::Dirty(3)).await?;
    assert_eq!(store.read_version_state().await?, Some(VersionState::Dirty(3)));
    assert_eq!(db.row_count("schema_migrations").await, 1);

    // Before the first migration is an empty table
    store.write_version_state(VersionState::Clean(0)).await?;
    assert_eq!(store.read_version_state().await?, None);
    assert_eq!(db.row_count("schema_migrations").await, 0);

    store.close().await?;
    db.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_lock_excludes_second_session() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let mut first = db.store(LOCK_TIMEOUT).await;
    let mut second = db.store(LOCK_TIMEOUT).await;

    let token = first.acquire_lock().await?;

    let err = second.acquire_lock().await.unwrap_err();
    assert!(
        matches!(err, StoreError::LockTimeout { timeout_secs: 1, .. }),
        "Expected lock timeout, got {:?}",
        err
    );

    first.release_lock(token).await?;
    let token = second.acquire_lock().await?;
    second.release_lock(token).await?;

    first.close().await?;
    second.close().await?;
    db.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_multi_statement_script() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let mut store = db.store(LOCK_TIMEOUT).await;

    store
        .execute("CREATE TABLE accounts (id INT PRIMARY KEY);\nCREATE TABLE invoices (id INT PRIMARY KEY);\n")
        .await?;

    assert!(db.table_exists("accounts").await);
    assert!(db.table_exists("invoices").await);

    store.close().await?;
    db.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_failing_script_reports_server_error() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let mut store = db.store(LOCK_TIMEOUT).await;

    let err = store.execute("CREATE TABL broken (id INT);").await.unwrap_err();
    match err {
        StoreError::Script { message } => {
            assert!(message.contains("1064"), "Unexpected message: {}", message);
            assert!(message.contains("CREATE TABL broken"));
        }
        other => panic!("Expected script error, got {:?}", other),
    }

    store.close().await?;
    db.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_sync_and_down_against_server() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let dir = MigrationDir::with_tables(3)?;

    let store = db.store(LOCK_TIMEOUT).await;
    let mut migrator = Migrator::new(store, dir.catalog()?).quiet(true);

    assert_eq!(
        migrator.sync().await?,
        MigrationOutcome::Applied {
            from: 0,
            to: 3,
            steps: 3
        }
    );
    assert!(db.table_exists("table_3").await);

    assert_eq!(
        migrator.down().await?,
        MigrationOutcome::Applied {
            from: 3,
            to: 0,
            steps: 3
        }
    );
    assert!(!db.table_exists("table_1").await);
    assert_eq!(db.row_count("schema_migrations").await, 0);

    migrator.into_store().close().await?;
    db.cleanup().await;
    Ok(())
}

#[tokio::test]
async fn test_failed_step_is_recorded_dirty() -> Result<()> {
    let Some(instance) = MySqlTestInstance::from_env() else {
        return Ok(());
    };
    let db = instance.create_test_database().await;
    let dir = MigrationDir::with_tables(1)?;
    dir.write("00002_broken.up.sql", "SELEC 1;")?;
    dir.write("00002_broken.down.sql", "SELECT 1;")?;

    let store = db.store(LOCK_TIMEOUT).await;
    let mut migrator = Migrator::new(store, dir.catalog()?).quiet(true);

    let err = migrator.up().await.unwrap_err();
    assert!(matches!(err, MigrateError::Execution { failed_version: 2, .. }));

    let mut store = migrator.into_store();
    assert_eq!(store.read_version_state().await?, Some(VersionState::Dirty(1)));

    store.close().await?;
    db.cleanup().await;
    Ok(())
}
