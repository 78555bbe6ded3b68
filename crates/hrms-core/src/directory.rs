//! Fixed-schema employee lookups (`employees`, `departments`, `auth_user`,
//! `tasks`, `attendance`). Values are always bound as parameters.

use hrms_commons::{HrmsError, Result};
use hrms_store::{map_column_error, map_sqlite_error, PooledConnection, QueryContext, SqlitePool};
use rusqlite::{OptionalExtension, Row};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Longest username accepted (Django `auth_user.username`).
pub const MAX_USERNAME_LEN: usize = 150;

const PROFILE_SQL: &str = "SELECT e.id, e.first_name, e.last_name, e.position, \
            d.name AS department_name, \
            m.first_name || ' ' || m.last_name AS manager_name, \
            u.email AS manager_email, e.hire_date \
     FROM employees e \
     JOIN auth_user au ON e.user_id = au.id \
     LEFT JOIN departments d ON e.department_id = d.id \
     LEFT JOIN employees m ON e.manager_id = m.id \
     LEFT JOIN auth_user u ON m.user_id = u.id \
     WHERE au.username = ?1";

const TASKS_SQL: &str = "SELECT t.id, t.title, t.description, t.status, t.deadline, \
            t.rejection_comment, t.assigned_to \
     FROM tasks t ORDER BY t.id";

const EMPLOYEE_ID_SQL: &str = "SELECT e.id FROM employees e \
     JOIN auth_user au ON e.user_id = au.id \
     WHERE au.username = ?1";

const EMPLOYEE_TASKS_SQL: &str = "SELECT t.id, t.title, t.description, t.status, t.deadline, \
            t.rejection_comment, t.assigned_to \
     FROM tasks t WHERE t.assigned_to = ?1 \
     ORDER BY t.deadline IS NULL, t.deadline, t.id";

/// Most recent days returned by [`EmployeeDirectory::attendance`].
pub const ATTENDANCE_DAYS: i64 = 30;

// Hours between clock-in and clock-out, two decimals; 0 while a day is open.
const ATTENDANCE_SQL: &str = "SELECT date, clock_in, clock_out, \
            CASE WHEN clock_in IS NOT NULL AND clock_out IS NOT NULL \
                 THEN round((julianday(clock_out) - julianday(clock_in)) * 24.0, 2) \
                 ELSE 0.0 END AS hours_worked \
     FROM attendance WHERE employee_id = ?1 \
     ORDER BY date DESC LIMIT ?2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub position: String,
    pub department_name: Option<String>,
    pub manager_name: Option<String>,
    pub manager_email: Option<String>,
    pub hire_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub deadline: Option<String>,
    pub rejection_comment: Option<String>,
    pub assigned_to: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceDay {
    pub date: String,
    pub clock_in: Option<String>,
    pub clock_out: Option<String>,
    pub hours_worked: f64,
}

#[derive(Clone)]
pub struct EmployeeDirectory {
    pool: Arc<SqlitePool>,
    default_timeout: Duration,
}

impl EmployeeDirectory {
    pub fn new(pool: Arc<SqlitePool>, default_timeout: Duration) -> Self {
        Self {
            pool,
            default_timeout,
        }
    }

    pub fn context(&self) -> QueryContext {
        QueryContext::with_timeout(self.default_timeout)
    }

    /// Profile of the employee whose login is `username`.
    pub async fn profile(&self, username: &str, ctx: &QueryContext) -> Result<EmployeeProfile> {
        validate_username(username)?;
        let username = username.to_string();
        self.pool
            .run(ctx, "directory.profile", move |conn| {
                profile_blocking(conn, &username)
            })
            .await
    }

    /// All tasks, ordered by id.
    pub async fn tasks(&self, ctx: &QueryContext) -> Result<Vec<Task>> {
        self.pool.run(ctx, "directory.tasks", tasks_blocking).await
    }

    /// Tasks assigned to the employee whose login is `username`, earliest
    /// deadline first (tasks without a deadline last).
    pub async fn employee_tasks(&self, username: &str, ctx: &QueryContext) -> Result<Vec<Task>> {
        validate_username(username)?;
        let username = username.to_string();
        self.pool
            .run(ctx, "directory.employee_tasks", move |conn| {
                conn.read_snapshot(|conn| {
                    let employee_id = employee_id_blocking(conn, &username)?;
                    let mut stmt = conn.prepare(EMPLOYEE_TASKS_SQL)?;
                    let rows = stmt
                        .query_map([employee_id], task_from_row)
                        .map_err(|e| map_sqlite_error("employee tasks", e))?;
                    rows.map(|row| row.map_err(|e| map_column_error("tasks", e)))
                        .collect()
                })
            })
            .await
    }

    /// Last [`ATTENDANCE_DAYS`] attendance days of `username`, newest first.
    pub async fn attendance(
        &self,
        username: &str,
        ctx: &QueryContext,
    ) -> Result<Vec<AttendanceDay>> {
        validate_username(username)?;
        let username = username.to_string();
        self.pool
            .run(ctx, "directory.attendance", move |conn| {
                conn.read_snapshot(|conn| attendance_blocking(conn, &username))
            })
            .await
    }
}

fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(HrmsError::InvalidInput("username cannot be empty".to_string()));
    }
    let len = username.chars().count();
    if len > MAX_USERNAME_LEN {
        return Err(HrmsError::InvalidInput(format!(
            "username is {} characters, maximum is {}",
            len, MAX_USERNAME_LEN
        )));
    }
    Ok(())
}

fn profile_blocking(conn: &PooledConnection, username: &str) -> Result<EmployeeProfile> {
    let mut stmt = conn.prepare(PROFILE_SQL)?;
    let row = stmt
        .query_row([username], |row| {
            Ok(EmployeeProfile {
                id: row.get("id")?,
                first_name: row.get("first_name")?,
                last_name: row.get("last_name")?,
                position: row.get("position")?,
                department_name: row.get("department_name")?,
                manager_name: row.get("manager_name")?,
                manager_email: row.get("manager_email")?,
                hire_date: row.get("hire_date")?,
            })
        })
        .optional()
        .map_err(|e| map_column_error("employees", e))?;

    row.ok_or_else(|| HrmsError::NotFound(format!("employee '{}'", username)))
}

fn employee_id_blocking(conn: &PooledConnection, username: &str) -> Result<i64> {
    let mut stmt = conn.prepare(EMPLOYEE_ID_SQL)?;
    stmt.query_row([username], |row| row.get::<_, i64>(0))
        .optional()
        .map_err(|e| map_column_error("employees", e))?
        .ok_or_else(|| HrmsError::NotFound(format!("employee '{}'", username)))
}

fn attendance_blocking(conn: &PooledConnection, username: &str) -> Result<Vec<AttendanceDay>> {
    let employee_id = employee_id_blocking(conn, username)?;
    let mut stmt = conn.prepare(ATTENDANCE_SQL)?;
    let rows = stmt
        .query_map([employee_id, ATTENDANCE_DAYS], |row| {
            Ok(AttendanceDay {
                date: row.get("date")?,
                clock_in: row.get("clock_in")?,
                clock_out: row.get("clock_out")?,
                hours_worked: row.get("hours_worked")?,
            })
        })
        .map_err(|e| map_sqlite_error("attendance", e))?;
    rows.map(|row| row.map_err(|e| map_column_error("attendance", e)))
        .collect()
}

fn tasks_blocking(conn: &PooledConnection) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(TASKS_SQL)?;
    let rows = stmt
        .query_map([], task_from_row)
        .map_err(|e| map_sqlite_error("tasks", e))?;
    rows.map(|row| row.map_err(|e| map_column_error("tasks", e)))
        .collect()
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: row.get("status")?,
        deadline: row.get("deadline")?,
        rejection_comment: row.get("rejection_comment")?,
        assigned_to: row.get("assigned_to")?,
    })
}
