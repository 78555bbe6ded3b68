//! Mapping of SQLite failures onto [`HrmsError`] kinds.

use hrms_commons::HrmsError;
use rusqlite::ErrorCode;

/// Classify a rusqlite error.
///
/// - interrupted statements become `Cancelled`
/// - open/IO/lock failures become `Connection`
/// - everything else is `Internal`
pub fn map_sqlite_error(context: &str, err: rusqlite::Error) -> HrmsError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            ErrorCode::OperationInterrupted => {
                HrmsError::Cancelled(format!("{}: statement interrupted", context))
            }
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::SystemIoFailure
            | ErrorCode::PermissionDenied
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::FileLockingProtocolFailed => {
                HrmsError::Connection(format!("{}: {}", context, err))
            }
            _ => HrmsError::Internal(format!("{}: {}", context, err)),
        },
        _ => HrmsError::Internal(format!("{}: {}", context, err)),
    }
}

/// Map a typed column read failure to a scan error naming the column.
pub fn map_column_error(column: &str, err: rusqlite::Error) -> HrmsError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(_, ty, cause) => {
            HrmsError::scan(column, format!("cannot convert {} value: {}", ty, cause))
        }
        rusqlite::Error::InvalidColumnType(_, _, ty) => {
            HrmsError::scan(column, format!("unexpected {} value", ty))
        }
        rusqlite::Error::IntegralValueOutOfRange(_, value) => {
            HrmsError::scan(column, format!("integer {} out of range", value))
        }
        other => map_sqlite_error(&format!("column '{}'", column), other),
    }
}
