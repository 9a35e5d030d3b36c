pub mod migration_discovery;
