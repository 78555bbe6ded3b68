//! # hrms-store
//!
//! SQLite access for the HRMS service:
//!
//! - [`SqlitePool`]: bounded connection pool; work runs on the blocking pool
//!   and is interrupted when its [`QueryContext`] is cancelled or expires
//! - [`SchemaCatalog`]: table and column discovery from `sqlite_master`
//! - [`DynamicRowReader`]: whole-table scans decoded through [`ColumnDecoder`]

pub mod catalog;
pub mod coercion;
pub mod context;
pub mod error;
pub mod pool;
pub mod reader;

pub use catalog::SchemaCatalog;
pub use coercion::{ColumnDecoder, DeclaredAffinity};
pub use context::{CancelReason, QueryContext};
pub use error::{map_column_error, map_sqlite_error};
pub use pool::{PoolConfig, PoolStatus, PooledConnection, SqlitePool};
pub use reader::{DynamicRowReader, ScanFailure, ScanPhase, TableScan};

pub use tokio_util::sync::CancellationToken;
