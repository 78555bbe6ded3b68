//! Whole-table scans with runtime-sized decode slots.

use crate::catalog::get_columns_blocking;
use crate::coercion::ColumnDecoder;
use crate::context::QueryContext;
use crate::error::{map_column_error, map_sqlite_error};
use crate::pool::{PooledConnection, SqlitePool};
use hrms_commons::models::quote_identifier;
use hrms_commons::{ColumnDescriptor, GenericRecord, HrmsError, Result, TableName, Value};
use log::debug;
use std::sync::Arc;

/// Step of [`DynamicRowReader::read_table`] that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Existence check or column lookup.
    Introspect,
    /// Statement execution, row decoding, or the checkout itself.
    Fetch,
}

#[derive(Debug)]
pub struct ScanFailure {
    pub phase: ScanPhase,
    pub error: HrmsError,
}

/// Column list and rows read from one snapshot.
#[derive(Debug)]
pub struct TableScan {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<GenericRecord>,
}

/// Reads every row of a table as [`GenericRecord`]s.
#[derive(Clone)]
pub struct DynamicRowReader {
    pool: Arc<SqlitePool>,
}

impl DynamicRowReader {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Scan `table`, decoding exactly the given columns in ordinal order.
    ///
    /// Fails on the first statement or decode error; no partial result is
    /// returned.
    pub async fn read_all(
        &self,
        table: &TableName,
        columns: &[ColumnDescriptor],
        ctx: &QueryContext,
    ) -> Result<Vec<GenericRecord>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        let table = table.clone();
        let columns = columns.to_vec();
        self.pool
            .run(ctx, "reader.read_all", move |conn| {
                read_all_blocking(conn, &table, columns)
            })
            .await
    }

    /// Look up the columns of `table` and scan it on a single checkout.
    ///
    /// Both steps share one read transaction, so a table dropped by another
    /// connection in between still reports `TableNotFound` or a consistent
    /// scan, never a half-seen schema.
    pub async fn read_table(
        &self,
        table: &TableName,
        ctx: &QueryContext,
    ) -> std::result::Result<TableScan, ScanFailure> {
        let table = table.clone();
        let outcome = self
            .pool
            .run(ctx, "reader.read_table", move |conn| {
                conn.read_snapshot(|conn| {
                    let columns = match get_columns_blocking(conn, &table) {
                        Ok(columns) => columns,
                        Err(error) => {
                            return Ok(Err(ScanFailure {
                                phase: ScanPhase::Introspect,
                                error,
                            }))
                        }
                    };
                    if columns.is_empty() {
                        return Ok(Ok(TableScan {
                            columns,
                            rows: Vec::new(),
                        }));
                    }
                    match read_all_blocking(conn, &table, columns.clone()) {
                        Ok(rows) => Ok(Ok(TableScan { columns, rows })),
                        Err(error) => Ok(Err(ScanFailure {
                            phase: ScanPhase::Fetch,
                            error,
                        })),
                    }
                })
            })
            .await;

        match outcome {
            Ok(scan) => scan,
            Err(error) => Err(ScanFailure {
                phase: ScanPhase::Fetch,
                error,
            }),
        }
    }
}

/// `SELECT "c0", "c1", ... FROM "table"`, columns in ordinal order.
pub(crate) fn build_select(table: &TableName, columns: &[ColumnDescriptor]) -> String {
    let projection = columns
        .iter()
        .map(|c| quote_identifier(&c.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {} FROM {}", projection, table.quoted())
}

pub(crate) fn read_all_blocking(
    conn: &PooledConnection,
    table: &TableName,
    mut columns: Vec<ColumnDescriptor>,
) -> Result<Vec<GenericRecord>> {
    columns.sort_by_key(|c| c.ordinal);
    let sql = build_select(table, &columns);
    let decoders: Vec<ColumnDecoder> = columns.iter().map(ColumnDecoder::for_column).collect();

    let mut stmt = conn.prepare(&sql)?;
    if stmt.column_count() != columns.len() {
        return Err(HrmsError::Internal(format!(
            "statement on '{}' yields {} columns, catalog reports {}",
            table,
            stmt.column_count(),
            columns.len()
        )));
    }

    let mut rows = stmt
        .query([])
        .map_err(|e| map_sqlite_error(&format!("scan '{}'", table), e))?;
    let mut records = Vec::new();
    while let Some(row) = rows
        .next()
        .map_err(|e| map_sqlite_error(&format!("scan '{}'", table), e))?
    {
        let mut slots: Vec<Value> = Vec::with_capacity(decoders.len());
        for (idx, decoder) in decoders.iter().enumerate() {
            let raw = row
                .get_ref(idx)
                .map_err(|e| map_column_error(decoder.name(), e))?;
            slots.push(decoder.decode(raw)?);
        }
        let record = GenericRecord::zip(&columns, slots).ok_or_else(|| {
            HrmsError::Internal(format!("row width mismatch on '{}'", table))
        })?;
        records.push(record);
    }

    debug!("[READER] table={} rows={}", table, records.len());
    Ok(records)
}
