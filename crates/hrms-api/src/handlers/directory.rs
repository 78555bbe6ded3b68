//! Employee directory endpoints.

use actix_web::{get, web, HttpResponse};
use hrms_core::EmployeeDirectory;

use crate::error::ApiError;

/// GET /profile/{username}
///
/// 404 when no employee is linked to `username`; manager and department
/// fields are `null` when unset.
#[get("/profile/{username}")]
pub async fn get_profile(
    directory: web::Data<EmployeeDirectory>,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let profile = directory.profile(&username, &directory.context()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// GET /tasks - all tasks ordered by id
#[get("/tasks")]
pub async fn list_tasks(directory: web::Data<EmployeeDirectory>) -> Result<HttpResponse, ApiError> {
    let tasks = directory.tasks(&directory.context()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// GET /tasks/{username} - tasks assigned to one employee, by deadline
#[get("/tasks/{username}")]
pub async fn list_employee_tasks(
    directory: web::Data<EmployeeDirectory>,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let tasks = directory
        .employee_tasks(&username, &directory.context())
        .await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// GET /attendance/{username}
///
/// Last 30 days, newest first:
/// ```json
/// [{"date": "2024-01-09", "clock_in": "2024-01-09 09:00:00", "clock_out": null, "hours_worked": 0.0}]
/// ```
#[get("/attendance/{username}")]
pub async fn list_attendance(
    directory: web::Data<EmployeeDirectory>,
    username: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let days = directory.attendance(&username, &directory.context()).await?;
    Ok(HttpResponse::Ok().json(days))
}
