//! Bounded pool of SQLite connections.
//!
//! At most `max_connections` connections exist at once. A caller that finds
//! every slot busy waits on a semaphore (queued, not rejected) until one is
//! returned or `acquire_timeout` elapses. Connections are opened lazily and
//! handed back on drop, so every exit path of a caller releases its slot.
//!
//! Store work runs on tokio's blocking pool via [`SqlitePool::run`], which
//! also honours the caller's [`QueryContext`]: when it is cancelled or its
//! deadline passes the running statement is interrupted and the call fails
//! with `Cancelled`.
//!
//! Cancellation is scoped to one checkout. A signalled checkout refuses to
//! prepare new statements and its progress handler aborts the running one,
//! so a cancel that lands between two statements is not lost. The interrupt
//! handle is detached before the connection returns to the idle list, so a
//! late cancel never reaches the next borrower.

use crate::context::QueryContext;
use crate::error::map_sqlite_error;
use hrms_commons::{HrmsError, Result};
use hrms_configs::DatabaseSettings;
use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::{Connection, InterruptHandle, OpenFlags, Statement};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// VM instructions between two checks of the cancel flag.
const PROGRESS_CHECK_OPS: i32 = 1_000;

/// Pool construction parameters.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub path: PathBuf,
    pub max_connections: usize,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
    pub read_only: bool,
}

impl PoolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 4,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(2),
            read_only: true,
        }
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

impl From<&DatabaseSettings> for PoolConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            path: PathBuf::from(&settings.path),
            max_connections: settings.max_connections,
            acquire_timeout: Duration::from_millis(settings.acquire_timeout_ms),
            busy_timeout: Duration::from_millis(settings.busy_timeout_ms),
            read_only: settings.read_only,
        }
    }
}

/// Point-in-time pool usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub max_connections: usize,
    pub open: usize,
    pub idle: usize,
    pub in_use: usize,
}

pub struct SqlitePool {
    config: PoolConfig,
    idle: Mutex<Vec<Connection>>,
    permits: Arc<Semaphore>,
    open: AtomicUsize,
    statements: AtomicU64,
}

impl SqlitePool {
    /// Create the pool. No connection is opened until first use; call
    /// [`ping`](Self::ping) to verify the store is reachable.
    pub fn new(config: PoolConfig) -> Result<Arc<Self>> {
        if config.max_connections == 0 {
            return Err(HrmsError::Internal(
                "connection pool needs at least one slot".to_string(),
            ));
        }
        debug!(
            "[POOL] path={} max_connections={} read_only={}",
            config.path.display(),
            config.max_connections,
            config.read_only
        );
        Ok(Arc::new(Self {
            permits: Arc::new(Semaphore::new(config.max_connections)),
            idle: Mutex::new(Vec::with_capacity(config.max_connections)),
            open: AtomicUsize::new(0),
            statements: AtomicU64::new(0),
            config,
        }))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of statements prepared through this pool since creation.
    pub fn statements_executed(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> PoolStatus {
        let idle = self.idle.lock().len();
        let available = self.permits.available_permits();
        PoolStatus {
            max_connections: self.config.max_connections,
            open: self.open.load(Ordering::Relaxed),
            idle,
            in_use: self.config.max_connections.saturating_sub(available),
        }
    }

    /// Wait for a free slot and hand out a connection.
    pub async fn acquire(self: &Arc<Self>) -> Result<PooledConnection> {
        let permit = tokio::time::timeout(
            self.config.acquire_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| {
            HrmsError::Connection(format!(
                "no free connection after {:?} (max_connections={})",
                self.config.acquire_timeout, self.config.max_connections
            ))
        })?
        .map_err(|_| HrmsError::Connection("connection pool is closed".to_string()))?;

        let reused = self.idle.lock().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => self.open_connection()?,
        };

        let signal = Arc::new(CheckoutSignal::new(conn.get_interrupt_handle()));
        let cancelled = Arc::clone(&signal.cancelled);
        conn.progress_handler(
            PROGRESS_CHECK_OPS,
            Some(move || cancelled.load(Ordering::Acquire)),
        );

        Ok(PooledConnection {
            conn: Some(conn),
            signal,
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Run `op` on a pooled connection on the blocking thread pool.
    ///
    /// The connection goes back to the pool when `op` returns, whatever the
    /// outcome. If `ctx` finishes first, the statement is interrupted and
    /// the call waits for `op` to unwind before returning `Cancelled`.
    pub async fn run<T, F>(self: &Arc<Self>, ctx: &QueryContext, label: &str, op: F) -> Result<T>
    where
        F: FnOnce(&PooledConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        ctx.check()?;

        let conn = tokio::select! {
            conn = self.acquire() => conn?,
            reason = ctx.done() => {
                return Err(HrmsError::Cancelled(format!("{} while waiting for a connection", reason)));
            }
        };

        let mut interrupt = InterruptOnDrop(Some(conn.signal()));
        let mut task = tokio::task::spawn_blocking(move || op(&conn));

        tokio::select! {
            // A finished task wins over a deadline that expired at the same time.
            biased;
            joined = &mut task => {
                interrupt.disarm();
                joined.map_err(|e| {
                    HrmsError::Internal(format!("{}: blocking task failed: {}", label, e))
                })?
            }
            reason = ctx.done() => {
                warn!("[POOL] {} {}; interrupting statement", label, reason);
                interrupt.fire();
                // Wait so the cursor and connection are released before returning.
                let _ = task.await;
                Err(HrmsError::Cancelled(format!("{}: {}", label, reason)))
            }
        }
    }

    /// Round-trip `SELECT 1` through the pool.
    pub async fn ping(self: &Arc<Self>, ctx: &QueryContext) -> Result<()> {
        self.run(ctx, "pool.ping", |conn| {
            let mut stmt = conn.prepare("SELECT 1")?;
            let one: i64 = stmt
                .query_row([], |row| row.get(0))
                .map_err(|e| map_sqlite_error("ping", e))?;
            if one == 1 {
                Ok(())
            } else {
                Err(HrmsError::Internal(format!("ping returned {}", one)))
            }
        })
        .await
    }

    fn open_connection(&self) -> Result<Connection> {
        let flags = if self.config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI
        };

        let conn = Connection::open_with_flags(&self.config.path, flags).map_err(|e| {
            map_sqlite_error(&format!("open {}", self.config.path.display()), e)
        })?;
        conn.busy_timeout(self.config.busy_timeout)
            .map_err(|e| map_sqlite_error("busy_timeout", e))?;

        let open = self.open.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("[POOL] opened connection ({} of {})", open, self.config.max_connections);
        Ok(conn)
    }

    fn release(&self, conn: Connection) {
        self.idle.lock().push(conn);
    }
}

/// Cancel state of a single checkout.
struct CheckoutSignal {
    cancelled: Arc<AtomicBool>,
    // `None` once the checkout has ended.
    handle: Mutex<Option<InterruptHandle>>,
}

impl CheckoutSignal {
    fn new(handle: InterruptHandle) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(Some(handle)),
        }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        // Held across `interrupt` so `detach` cannot hand the connection on
        // while the interrupt is in flight.
        if let Some(handle) = self.handle.lock().as_ref() {
            handle.interrupt();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    fn detach(&self) {
        self.handle.lock().take();
    }
}

/// Cancels the checkout if the awaiting future is dropped (e.g. the HTTP
/// client went away) before the blocking task finished.
struct InterruptOnDrop(Option<Arc<CheckoutSignal>>);

impl InterruptOnDrop {
    fn disarm(&mut self) {
        self.0 = None;
    }

    fn fire(&mut self) {
        if let Some(signal) = self.0.take() {
            signal.cancel();
        }
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        self.fire();
    }
}

/// A connection checked out of the pool; returned on drop.
pub struct PooledConnection {
    conn: Option<Connection>,
    signal: Arc<CheckoutSignal>,
    pool: Arc<SqlitePool>,
    // Dropped after `conn` has been pushed back, so a waiter always finds it.
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Prepare `sql`, counting it against the pool's statement counter.
    ///
    /// The returned statement borrows the connection, so its cursor cannot
    /// outlive the pooled checkout.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        if self.signal.is_cancelled() {
            return Err(HrmsError::Cancelled(
                "query cancelled before statement start".to_string(),
            ));
        }
        self.pool.statements.fetch_add(1, Ordering::Relaxed);
        log::trace!("[POOL] prepare: {}", sql);
        self.connection()
            .prepare(sql)
            .map_err(|e| map_sqlite_error("prepare", e))
    }

    /// Run `f` inside one deferred read transaction, so every statement it
    /// issues sees the same snapshot of the schema and data.
    pub fn read_snapshot<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.connection()
            .execute_batch("BEGIN DEFERRED")
            .map_err(|e| map_sqlite_error("begin snapshot", e))?;
        let result = f(self);
        if self.connection().is_autocommit() {
            // SQLite already rolled back (e.g. after an interrupt).
            return result;
        }
        let end = if result.is_ok() { "COMMIT" } else { "ROLLBACK" };
        match self.connection().execute_batch(end) {
            Ok(()) => result,
            Err(e) if result.is_ok() => Err(map_sqlite_error("end snapshot", e)),
            Err(e) => {
                warn!("[POOL] {} after failed snapshot: {}", end, e);
                result
            }
        }
    }

    fn signal(&self) -> Arc<CheckoutSignal> {
        Arc::clone(&self.signal)
    }

    fn connection(&self) -> &Connection {
        // Only `Drop` takes the connection out.
        self.conn.as_ref().expect("pooled connection already released")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        self.signal.detach();
        if let Some(conn) = self.conn.take() {
            conn.progress_handler(0, None::<fn() -> bool>);
            if !conn.is_autocommit() {
                if let Err(e) = conn.execute_batch("ROLLBACK") {
                    warn!("[POOL] rollback on release failed: {}", e);
                }
            }
            self.pool.release(conn);
        }
    }
}
