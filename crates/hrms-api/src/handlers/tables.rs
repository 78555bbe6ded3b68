//! Table browsing endpoints.
//!
//! The table name comes straight from the path and is validated by the
//! gateway before anything is sent to the store.

use actix_web::{get, web, HttpResponse};
use hrms_core::QueryGateway;

use crate::error::ApiError;
use crate::models::{ColumnsResponse, RowsResponse, TablesResponse};

/// GET /db - names of all browsable tables, sorted
#[get("/db")]
pub async fn list_db_tables(gateway: web::Data<QueryGateway>) -> Result<HttpResponse, ApiError> {
    let tables = gateway.list_tables(&gateway.context()).await?;
    Ok(HttpResponse::Ok().json(TablesResponse { tables }))
}

/// GET /list-columns/{table} - column names in ordinal order
#[get("/list-columns/{table}")]
pub async fn list_columns(
    gateway: web::Data<QueryGateway>,
    table: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let columns = gateway.list_columns(&table, &gateway.context()).await?;
    Ok(HttpResponse::Ok().json(ColumnsResponse { columns }))
}

/// GET /list-table/{table} - every row, keyed by column name
///
/// ```json
/// {
///   "columns": ["id", "note"],
///   "rows": [{"id": "1", "note": null}]
/// }
/// ```
#[get("/list-table/{table}")]
pub async fn list_table_rows(
    gateway: web::Data<QueryGateway>,
    table: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let result = gateway.list_rows(&table, &gateway.context()).await?;
    Ok(HttpResponse::Ok().json(RowsResponse::from(result)))
}
