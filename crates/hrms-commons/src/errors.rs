// Error types module
use crate::models::IdentifierError;
use thiserror::Error;

/// Main error type for table browsing and directory lookups.
///
/// Each variant is one error kind; the HTTP layer maps kinds to status codes
/// through [`HrmsError::kind`].
#[derive(Error, Debug)]
pub enum HrmsError {
    /// Identifier failed the allow-list grammar. Never reaches the store.
    #[error("Invalid identifier '{input}': {reason}")]
    Validation {
        input: String,
        reason: IdentifierError,
    },

    /// Request input other than an identifier was rejected.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Store unreachable, connection lost, or pool exhausted.
    #[error("Store unavailable: {0}")]
    Connection(String),

    /// A cell could not be coerced into the value model.
    #[error("Cannot decode column '{column}': {reason}")]
    Scan { column: String, reason: String },

    /// Deadline elapsed or caller cancelled; the statement was interrupted.
    #[error("Query cancelled: {0}")]
    Cancelled(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification used for status mapping and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Connection,
    Scan,
    Cancelled,
    Internal,
}

impl HrmsError {
    pub fn validation(input: impl Into<String>, reason: IdentifierError) -> Self {
        HrmsError::Validation {
            input: input.into(),
            reason,
        }
    }

    pub fn scan(column: impl Into<String>, reason: impl Into<String>) -> Self {
        HrmsError::Scan {
            column: column.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            HrmsError::Validation { .. } | HrmsError::InvalidInput(_) => ErrorKind::Validation,
            HrmsError::TableNotFound(_) | HrmsError::NotFound(_) => ErrorKind::NotFound,
            HrmsError::Connection(_) => ErrorKind::Connection,
            HrmsError::Scan { .. } => ErrorKind::Scan,
            HrmsError::Cancelled(_) => ErrorKind::Cancelled,
            HrmsError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// True for kinds whose detail is shown to the caller (4xx class).
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, HrmsError>;
