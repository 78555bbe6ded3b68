//! Bodies of the table browsing endpoints.

use hrms_commons::{GenericRecord, ResultSet};
use serde::Serialize;

/// GET /db
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

/// GET /list-columns/{table}
#[derive(Debug, Serialize)]
pub struct ColumnsResponse {
    pub columns: Vec<String>,
}

/// GET /list-table/{table}
///
/// `rows` keep column order in their keys; values use the cell encoding of
/// [`hrms_commons::Value`] (numbers as decimal strings, blobs as byte arrays).
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub columns: Vec<String>,
    pub rows: Vec<GenericRecord>,
}

impl From<ResultSet> for RowsResponse {
    fn from(result: ResultSet) -> Self {
        let (columns, rows) = result.into_parts();
        Self {
            columns: columns.into_iter().map(|c| c.name).collect(),
            rows,
        }
    }
}
