//! hrms-commons
//!
//! Identifiers, the generic value model and error types shared by every
//! HRMS crate. No store or HTTP dependencies live here.

pub mod errors;
pub mod models;

pub use errors::{ErrorKind, HrmsError, Result};
pub use models::{
    validate_identifier, ColumnDescriptor, GenericRecord, IdentifierError, ResultSet, TableName,
    Value,
};
