//! Schema discovery from SQLite metadata.

use crate::context::QueryContext;
use crate::error::map_sqlite_error;
use crate::pool::{PooledConnection, SqlitePool};
use hrms_commons::models::validate_column_name;
use hrms_commons::{ColumnDescriptor, HrmsError, Result, TableName};
use log::{debug, warn};
use std::sync::Arc;

const LIST_TABLES_SQL: &str = "SELECT name FROM sqlite_master \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\' \
     ORDER BY name";

const TABLE_EXISTS_SQL: &str = "SELECT 1 FROM sqlite_master \
     WHERE type = 'table' AND name = ?1 COLLATE NOCASE";

const TABLE_COLUMNS_SQL: &str = "SELECT cid, name, type, \"notnull\" \
     FROM pragma_table_info(?1) ORDER BY cid";

/// Reads table and column metadata. Nothing is cached between calls.
#[derive(Clone)]
pub struct SchemaCatalog {
    pool: Arc<SqlitePool>,
}

impl SchemaCatalog {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// All browsable user tables, sorted by name.
    pub async fn list_tables(&self, ctx: &QueryContext) -> Result<Vec<TableName>> {
        self.pool
            .run(ctx, "catalog.list_tables", list_tables_blocking)
            .await
    }

    /// Columns of `table` in ordinal order.
    ///
    /// `TableNotFound` when the table does not exist; an existing table with
    /// no columns yields an empty vector.
    pub async fn get_columns(
        &self,
        table: &TableName,
        ctx: &QueryContext,
    ) -> Result<Vec<ColumnDescriptor>> {
        let table = table.clone();
        self.pool
            .run(ctx, "catalog.get_columns", move |conn| {
                get_columns_blocking(conn, &table)
            })
            .await
    }
}

pub(crate) fn list_tables_blocking(conn: &PooledConnection) -> Result<Vec<TableName>> {
    let mut stmt = conn.prepare(LIST_TABLES_SQL)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(|e| map_sqlite_error("list tables", e))?;

    let mut tables = Vec::new();
    for name in names {
        let name = name.map_err(|e| map_sqlite_error("list tables", e))?;
        match TableName::parse(name.as_str()) {
            Ok(table) => tables.push(table),
            Err(reason) => warn!("[CATALOG] skipping table '{}': {}", name, reason),
        }
    }
    debug!("[CATALOG] {} tables", tables.len());
    Ok(tables)
}

pub(crate) fn get_columns_blocking(
    conn: &PooledConnection,
    table: &TableName,
) -> Result<Vec<ColumnDescriptor>> {
    let exists = {
        let mut stmt = conn.prepare(TABLE_EXISTS_SQL)?;
        stmt.exists([table.as_str()])
            .map_err(|e| map_sqlite_error("table lookup", e))?
    };
    if !exists {
        return Err(HrmsError::TableNotFound(table.to_string()));
    }

    let mut stmt = conn.prepare(TABLE_COLUMNS_SQL)?;
    let rows = stmt
        .query_map([table.as_str()], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, i64>(3)?,
            ))
        })
        .map_err(|e| map_sqlite_error("table columns", e))?;

    let mut columns = Vec::new();
    for row in rows {
        let (cid, name, declared_type, not_null) =
            row.map_err(|e| map_sqlite_error("table columns", e))?;
        validate_column_name(&name).map_err(|reason| {
            HrmsError::Internal(format!(
                "column '{}' of table '{}' is not a safe identifier: {}",
                name, table, reason
            ))
        })?;
        let ordinal = usize::try_from(cid).map_err(|_| {
            HrmsError::Internal(format!("negative column position {} in '{}'", cid, table))
        })?;
        columns.push(ColumnDescriptor::new(
            name,
            ordinal,
            declared_type.unwrap_or_default(),
            not_null == 0,
        ));
    }
    debug!("[CATALOG] table={} columns={}", table, columns.len());
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolConfig;
    use hrms_commons::ErrorKind;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, ddl: &str) -> SchemaCatalog {
        let path = dir.path().join("catalog.sqlite3");
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(ddl).unwrap();
        drop(conn);
        SchemaCatalog::new(SqlitePool::new(PoolConfig::new(path)).unwrap())
    }

    #[tokio::test]
    async fn test_list_tables_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let catalog = fixture(
            &dir,
            "CREATE TABLE tasks (id INTEGER PRIMARY KEY);
             CREATE TABLE employees (id INTEGER);
             CREATE TABLE \"bad-name\" (id INTEGER);
             CREATE TABLE \"order\" (id INTEGER);
             CREATE TABLE auto (id INTEGER PRIMARY KEY AUTOINCREMENT);
             CREATE VIEW v_tasks AS SELECT * FROM tasks;",
        );

        let tables = catalog.list_tables(&QueryContext::new()).await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.as_str()).collect();
        // sqlite_sequence, views and unsafe names are left out.
        assert_eq!(names, vec!["auto", "employees", "tasks"]);
    }

    #[tokio::test]
    async fn test_get_columns_in_ordinal_order() {
        let dir = TempDir::new().unwrap();
        let catalog = fixture(
            &dir,
            "CREATE TABLE orders (id INTEGER NOT NULL, note TEXT, total NUMERIC(10,2), raw);",
        );
        let table = TableName::parse("orders").unwrap();

        let columns = catalog
            .get_columns(&table, &QueryContext::new())
            .await
            .unwrap();
        assert_eq!(
            columns,
            vec![
                ColumnDescriptor::new("id", 0, "INTEGER", false),
                ColumnDescriptor::new("note", 1, "TEXT", true),
                ColumnDescriptor::new("total", 2, "NUMERIC(10,2)", true),
                ColumnDescriptor::new("raw", 3, "", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_absent_table_is_not_found() {
        let dir = TempDir::new().unwrap();
        let catalog = fixture(&dir, "CREATE TABLE orders (id INTEGER);");
        let table = TableName::parse("nonexistent_table").unwrap();

        let err = catalog
            .get_columns(&table, &QueryContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_keyword_column_names_are_listed() {
        let dir = TempDir::new().unwrap();
        let catalog = fixture(
            &dir,
            "CREATE TABLE shipments (id INTEGER, \"order\" INTEGER, \"group\" TEXT);",
        );
        let table = TableName::parse("shipments").unwrap();

        let columns = catalog
            .get_columns(&table, &QueryContext::new())
            .await
            .unwrap();
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "order", "group"]);
    }

    #[tokio::test]
    async fn test_unsafe_column_name_is_internal() {
        let dir = TempDir::new().unwrap();
        let catalog = fixture(&dir, "CREATE TABLE weird (\"a b\" TEXT);");
        let table = TableName::parse("weird").unwrap();

        let err = catalog
            .get_columns(&table, &QueryContext::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }
}
