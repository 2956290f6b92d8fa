use std::path::{Path, PathBuf};

use menu_api::db::{self, DbConfig, DbPool};
use tempfile::TempDir;

/// Helper harness for spinning up a fresh SQLite-backed database with the
/// schema migrated.
#[allow(dead_code)]
pub struct TestDb {
    pub pool: DbPool,
    _dir: TempDir,
}

impl TestDb {
    #[allow(dead_code)]
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("menu_test.db");

        let config = DbConfig {
            url: format!("sqlite://{}?mode=rwc", db_path.display()),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        Self { pool, _dir: dir }
    }
}

/// Writes a JSON document into `dir` and returns its path.
#[allow(dead_code)]
pub fn write_json(dir: &Path, name: &str, value: serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap())
        .expect("failed to write source document");
    path
}
