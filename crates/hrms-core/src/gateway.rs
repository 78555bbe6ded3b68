//! Table browsing entry point used by the HTTP layer.
//!
//! Each request walks a fixed sequence of stages:
//!
//! ```text
//! Validate -> Introspect -> Fetch -> Coerce -> Respond
//! ```
//!
//! The first failing stage ends the request with its error; nothing is
//! retried. Identifier validation happens before any statement is built, so
//! rejected input never reaches the store.

use hrms_commons::{HrmsError, Result, ResultSet, TableName};
use hrms_store::{
    DynamicRowReader, QueryContext, ScanPhase, SchemaCatalog, SqlitePool, TableScan,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Request lifecycle stage, recorded on the request span and in failure logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Validate,
    Introspect,
    Fetch,
    Coerce,
    Respond,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Validate => "validate",
            RequestStage::Introspect => "introspect",
            RequestStage::Fetch => "fetch",
            RequestStage::Coerce => "coerce",
            RequestStage::Respond => "respond",
        }
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct QueryGateway {
    pool: Arc<SqlitePool>,
    catalog: SchemaCatalog,
    reader: DynamicRowReader,
    default_timeout: Duration,
}

impl QueryGateway {
    /// `default_timeout` bounds contexts made by [`context`](Self::context);
    /// zero disables the deadline.
    pub fn new(pool: Arc<SqlitePool>, default_timeout: Duration) -> Self {
        Self {
            catalog: SchemaCatalog::new(Arc::clone(&pool)),
            reader: DynamicRowReader::new(Arc::clone(&pool)),
            pool,
            default_timeout,
        }
    }

    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Fresh context carrying the configured query deadline.
    pub fn context(&self) -> QueryContext {
        QueryContext::with_timeout(self.default_timeout)
    }

    /// Browsable table names, sorted.
    pub async fn list_tables(&self, ctx: &QueryContext) -> Result<Vec<String>> {
        let span = tracing::info_span!(
            "gateway.list_tables",
            stage = tracing::field::Empty,
            tables = tracing::field::Empty,
        );
        async {
            record_stage(RequestStage::Introspect);
            let tables = self
                .catalog
                .list_tables(ctx)
                .await
                .map_err(|e| stage_failed(RequestStage::Introspect, "*", e))?;

            record_stage(RequestStage::Respond);
            tracing::Span::current().record("tables", tables.len());
            Ok::<_, HrmsError>(tables.into_iter().map(TableName::into_string).collect())
        }
        .instrument(span)
        .await
    }

    /// Column names of `raw_table` in ordinal order.
    pub async fn list_columns(&self, raw_table: &str, ctx: &QueryContext) -> Result<Vec<String>> {
        let span = tracing::info_span!(
            "gateway.list_columns",
            table = %raw_table,
            stage = tracing::field::Empty,
        );
        async {
            let table = validate(raw_table)?;

            record_stage(RequestStage::Introspect);
            let columns = self
                .catalog
                .get_columns(&table, ctx)
                .await
                .map_err(|e| stage_failed(RequestStage::Introspect, raw_table, e))?;

            record_stage(RequestStage::Respond);
            Ok::<_, HrmsError>(columns.into_iter().map(|c| c.name).collect())
        }
        .instrument(span)
        .await
    }

    /// Every row of `raw_table`, keyed by column name.
    pub async fn list_rows(&self, raw_table: &str, ctx: &QueryContext) -> Result<ResultSet> {
        let span = tracing::info_span!(
            "gateway.list_rows",
            table = %raw_table,
            stage = tracing::field::Empty,
            rows = tracing::field::Empty,
        );
        async {
            let table = validate(raw_table)?;

            // Columns and rows come from one checkout and one snapshot; rows
            // are decoded while they are fetched.
            record_stage(RequestStage::Introspect);
            let TableScan { columns, rows } =
                self.reader.read_table(&table, ctx).await.map_err(|failure| {
                    let stage = match (failure.phase, &failure.error) {
                        (ScanPhase::Introspect, _) => RequestStage::Introspect,
                        (ScanPhase::Fetch, HrmsError::Scan { .. }) => RequestStage::Coerce,
                        (ScanPhase::Fetch, _) => RequestStage::Fetch,
                    };
                    record_stage(stage);
                    stage_failed(stage, raw_table, failure.error)
                })?;

            record_stage(RequestStage::Respond);
            let row_count = rows.len();
            let result = ResultSet::new(columns, rows).ok_or_else(|| {
                stage_failed(
                    RequestStage::Respond,
                    raw_table,
                    HrmsError::Internal("record keys do not match column list".to_string()),
                )
            })?;
            tracing::Span::current().record("rows", row_count);
            log::debug!("[GATEWAY] table={} rows={}", table, row_count);
            Ok::<_, HrmsError>(result)
        }
        .instrument(span)
        .await
    }

    /// `SELECT 1` through the pool; used by readiness checks.
    pub async fn ping(&self, ctx: &QueryContext) -> Result<()> {
        self.pool.ping(ctx).await
    }
}

fn record_stage(stage: RequestStage) {
    tracing::Span::current().record("stage", stage.as_str());
}

fn validate(raw_table: &str) -> Result<TableName> {
    record_stage(RequestStage::Validate);
    TableName::parse(raw_table).map_err(|reason| {
        log::debug!("[GATEWAY] rejected identifier {:?}: {}", raw_table, reason);
        HrmsError::validation(raw_table, reason)
    })
}

fn stage_failed(stage: RequestStage, table: &str, err: HrmsError) -> HrmsError {
    if err.is_client_error() {
        log::debug!("[GATEWAY] {} failed for '{}': {}", stage, table, err);
    } else {
        log::error!("[GATEWAY] {} failed for '{}': {}", stage, table, err);
    }
    err
}
