//! Shared setup for the integration tests.

#![allow(dead_code)]

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rango::db::{DbPool, establish_connection_pool};
use rango::repository::DieselRepository;
use tempfile::NamedTempFile;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Migrated SQLite database living in a temporary file.
///
/// The file is removed when the value is dropped.
pub struct TestDb {
    _file: NamedTempFile,
    pool: DbPool,
}

impl TestDb {
    pub fn new() -> Self {
        let file = NamedTempFile::new().expect("should create temp database file");
        let path = file.path().to_str().expect("temp path should be UTF-8");
        let pool = establish_connection_pool(path).expect("should open SQLite pool");

        pool.get()
            .expect("should acquire SQLite connection")
            .run_pending_migrations(MIGRATIONS)
            .expect("migrations should apply");

        TestDb { _file: file, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    /// Repository over this database.
    pub fn repository(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }
}
