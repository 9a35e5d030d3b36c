use crate::helpers::migration::MigrationDir;
use anyhow::Result;
use migrate_mariadb::error::{MigrateError, PlanError};
use migrate_mariadb::migrate::{MigrationOutcome, Migrator};
use migrate_mariadb::migration_tracking::VersionState;
use migrate_mariadb::store::{MemoryStore, MigrationStore};

#[tokio::test]
async fn test_sync_from_one_applies_two_and_three() -> Result<()> {
    let dir = MigrationDir::with_tables(3)?;
    let mut store = MemoryStore::with_state(VersionState::Clean(1));
    // Version 1 already ran
    store.execute("CREATE TABLE table_1 (id INT);").await?;

    let mut migrator = Migrator::new(store, dir.catalog()?).quiet(true);
    let outcome = migrator.sync().await?;

    assert_eq!(
        outcome,
        MigrationOutcome::Applied {
            from: 1,
            to: 3,
            steps: 2
        }
    );
    let store = migrator.into_store();
    assert_eq!(store.state(), Some(VersionState::Clean(3)));
    assert_eq!(
        store.state_history(),
        &[
            VersionState::Dirty(1),
            VersionState::Clean(2),
            VersionState::Dirty(2),
            VersionState::Clean(3),
        ]
    );
    assert!(store.executed()[1].contains("table_2"));
    assert!(store.executed()[2].contains("table_3"));
    assert!(!store.is_locked());
    Ok(())
}

#[tokio::test]
async fn test_failure_at_third_step_records_second() -> Result<()> {
    let dir = MigrationDir::with_tables(4)?;
    dir.write(
        "00003_create_table_3.up.sql",
        "CREATE TABLE table_3 (id INT);\nSELECT broken_function();",
    )?;
    let store = MemoryStore::new().fail_on("broken_function");

    let mut migrator = Migrator::new(store, dir.catalog()?).quiet(true);
    let err = migrator.up().await.unwrap_err();

    match err {
        MigrateError::Execution {
            failed_version,
            path,
            ..
        } => {
            assert_eq!(failed_version, 3);
            assert!(path.ends_with("00003_create_table_3.up.sql"));
        }
        other => panic!("Expected execution error, got {:?}", other),
    }

    let store = migrator.into_store();
    assert_eq!(store.state(), Some(VersionState::Dirty(2)));
    assert!(store.tables().contains("table_2"));
    assert!(!store.tables().contains("table_4"));
    assert!(!store.is_locked());
    Ok(())
}

#[tokio::test]
async fn test_dirty_store_needs_force_before_continuing() -> Result<()> {
    let dir = MigrationDir::with_tables(2)?;
    let store = MemoryStore::with_state(VersionState::Dirty(1));
    let mut migrator = Migrator::new(store, dir.catalog()?).quiet(true);

    let err = migrator.up().await.unwrap_err();
    assert!(matches!(err, MigrateError::DirtyState { version: 1 }));
    assert!(err.to_string().contains("force 1"));

    migrator.force(1).await?;
    assert_eq!(migrator.store().state(), Some(VersionState::Clean(1)));

    let outcome = migrator.up().await?;
    assert_eq!(
        outcome,
        MigrationOutcome::Applied {
            from: 1,
            to: 2,
            steps: 1
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_too_many_steps_back_changes_nothing() -> Result<()> {
    let dir = MigrationDir::with_tables(2)?;
    let mut migrator = Migrator::new(MemoryStore::new(), dir.catalog()?).quiet(true);
    migrator.up().await?;
    let history_len = migrator.store().state_history().len();

    let err = migrator.steps(-3).await.unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Plan(PlanError::InsufficientSteps {
            requested: 3,
            available: 2,
            ..
        })
    ));
    assert_eq!(migrator.store().state_history().len(), history_len);
    assert_eq!(migrator.store().state(), Some(VersionState::Clean(2)));
    Ok(())
}

#[tokio::test]
async fn test_dry_run_plan_executes_nothing() -> Result<()> {
    let dir = MigrationDir::with_tables(3)?;
    let mut migrator = Migrator::new(MemoryStore::new(), dir.catalog()?).quiet(true);

    let planned = migrator
        .plan(migrate_mariadb::migrate::Directive::StepN(2))
        .await?;
    assert_eq!(planned.current, 0);
    assert_eq!(planned.plan.versions(), vec![1, 2]);

    let store = migrator.into_store();
    assert!(store.executed().is_empty());
    assert!(store.state_history().is_empty());
    assert!(!store.is_locked());
    Ok(())
}

#[tokio::test]
async fn test_unknown_target_version() -> Result<()> {
    let dir = MigrationDir::with_tables(2)?;
    let mut migrator = Migrator::new(MemoryStore::new(), dir.catalog()?).quiet(true);

    let err = migrator.migrate_to(9).await.unwrap_err();
    assert!(matches!(err, MigrateError::Plan(PlanError::UnknownVersion(9))));
    Ok(())
}
