//! Shared fixtures for integration tests.

#![allow(dead_code)]

use hrms_server::config::ServerConfig;
use hrms_server::{bootstrap, ApplicationComponents};
use std::path::PathBuf;
use tempfile::TempDir;

/// HR schema plus a few tables exercising every value kind.
pub const HR_FIXTURE: &str = "
    CREATE TABLE auth_user (id INTEGER PRIMARY KEY, username TEXT NOT NULL, email TEXT);
    CREATE TABLE departments (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
    CREATE TABLE employees (
        id INTEGER PRIMARY KEY, user_id INTEGER NOT NULL, first_name TEXT, last_name TEXT,
        position TEXT, department_id INTEGER, manager_id INTEGER, hire_date TEXT,
        salary NUMERIC, active BOOLEAN, photo BLOB);
    CREATE TABLE tasks (
        id INTEGER PRIMARY KEY, title TEXT, description TEXT, status TEXT,
        deadline TEXT, rejection_comment TEXT, assigned_to INTEGER);
    CREATE TABLE attendance (
        id INTEGER PRIMARY KEY, employee_id INTEGER NOT NULL, date TEXT NOT NULL,
        clock_in TEXT, clock_out TEXT);
    CREATE TABLE orders (id INTEGER, note TEXT);
    CREATE TABLE audit_log (at TEXT, message TEXT);

    INSERT INTO auth_user VALUES (1, 'boss', 'boss@example.com'), (2, 'jdoe', 'jdoe@example.com');
    INSERT INTO departments VALUES (10, 'Mobile');
    INSERT INTO employees VALUES
        (100, 1, 'Ada', 'Lovelace', 'CTO', NULL, NULL, '2019-03-01', 250000.5, 1, NULL),
        (101, 2, 'John', 'Doe', 'Mobile Developer', 10, 100, '2023-06-15', 90000, 0, x'cafe');
    INSERT INTO tasks VALUES
        (1, 'Ship app', 'v1 release', 'in_progress', '2024-01-31', NULL, 101),
        (2, 'Review', NULL, 'submitted', NULL, NULL, 101);
    INSERT INTO attendance VALUES
        (1, 101, '2024-01-08', '2024-01-08 09:00:00', '2024-01-08 17:00:00'),
        (2, 101, '2024-01-09', '2024-01-09 08:30:00', NULL);
    INSERT INTO orders VALUES (1, NULL);
";

pub struct TestStore {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestStore {
    pub fn new(sql: &str) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("hrms.sqlite3");
        let conn = rusqlite::Connection::open(&path).expect("create fixture db");
        conn.execute_batch(sql).expect("load fixture");
        Self { dir, path }
    }

    pub fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::default();
        config.database.path = self.path.to_string_lossy().into_owned();
        config
    }

    pub async fn components(&self) -> ApplicationComponents {
        self.components_with(self.config()).await
    }

    pub async fn components_with(&self, config: ServerConfig) -> ApplicationComponents {
        bootstrap(&config).await.expect("bootstrap")
    }
}

/// Build an actix test service the same way `lifecycle::run` does.
#[macro_export]
macro_rules! test_app {
    ($components:expr) => {{
        let components = $components.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(hrms_server::middleware::request_logger())
                .wrap(hrms_server::middleware::build_cors(
                    &hrms_server::config::CorsSettings::default(),
                ))
                .configure(|cfg| components.configure(cfg)),
        )
        .await
    }};
}
