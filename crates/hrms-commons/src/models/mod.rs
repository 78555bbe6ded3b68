//! Data model shared by the store, the gateway and the HTTP layer.

pub mod identifier;
pub mod record;
pub mod value;

pub use identifier::{
    is_reserved_keyword, quote_identifier, validate_column_name, validate_identifier,
    IdentifierError, TableName, MAX_IDENTIFIER_LEN,
};
pub use record::{ColumnDescriptor, GenericRecord, ResultSet};
pub use value::Value;
