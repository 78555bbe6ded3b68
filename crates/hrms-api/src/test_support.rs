use hrms_store::{PoolConfig, SqlitePool};
use std::sync::Arc;
use tempfile::TempDir;

/// Read-only pool over a fresh SQLite file initialised with `sql`.
pub(crate) fn fixture_pool(dir: &TempDir, sql: &str) -> Arc<SqlitePool> {
    let path = dir.path().join("api.sqlite3");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(sql).unwrap();
    drop(conn);
    SqlitePool::new(PoolConfig::new(path)).unwrap()
}
