//! HTTP request handlers
//!
//! - table browsing: `/db`, `/list-columns/{table}`, `/list-table/{table}`
//! - employee directory: `/profile/{username}`, `/tasks`, `/tasks/{username}`,
//!   `/attendance/{username}`
//! - probes: `/healthz`, `/readyz`

pub mod directory;
pub mod health;
pub mod tables;

pub use directory::{get_profile, list_attendance, list_employee_tasks, list_tasks};
pub use health::{healthz_handler, readyz_handler};
pub use tables::{list_columns, list_db_tables, list_table_rows};
