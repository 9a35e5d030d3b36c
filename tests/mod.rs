// Integration tests for migrate-mariadb

pub mod unit;
