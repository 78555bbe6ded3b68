//! API routes configuration
//!
//! - GET /                      - greeting
//! - GET /healthz, /readyz      - probes
//! - GET /db                    - table names
//! - GET /list-columns/{table}  - column names of a table
//! - GET /list-table/{table}    - all rows of a table
//! - GET /profile/{username}    - employee profile
//! - GET /tasks                 - task list
//! - GET /tasks/{username}      - tasks assigned to one employee
//! - GET /attendance/{username} - recent attendance of one employee
//!
//! Handlers expect `web::Data<QueryGateway>` and `web::Data<EmployeeDirectory>`
//! to be registered on the `App`.

use crate::handlers;
use actix_web::{web, HttpResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root_handler))
        .route("/healthz", web::get().to(handlers::healthz_handler))
        .route("/readyz", web::get().to(handlers::readyz_handler))
        .service(handlers::list_db_tables)
        .service(handlers::list_columns)
        .service(handlers::list_table_rows)
        .service(handlers::get_profile)
        .service(handlers::list_tasks)
        .service(handlers::list_employee_tasks)
        .service(handlers::list_attendance);
}

async fn root_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hello from the HRMS service!")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_pool;
    use actix_web::{test, App};
    use hrms_core::{EmployeeDirectory, QueryGateway};
    use std::time::Duration;

    #[actix_rt::test]
    async fn test_all_routes_wired() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fixture_pool(
            &dir,
            "CREATE TABLE tasks (id INTEGER PRIMARY KEY, title TEXT, description TEXT,
                status TEXT, deadline TEXT, rejection_comment TEXT, assigned_to INTEGER);",
        );
        let timeout = Duration::from_secs(5);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(QueryGateway::new(pool.clone(), timeout)))
                .app_data(web::Data::new(EmployeeDirectory::new(pool, timeout)))
                .configure(configure_routes),
        )
        .await;

        for uri in ["/", "/healthz", "/readyz", "/db", "/list-columns/tasks", "/list-table/tasks", "/tasks"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200, "uri {}", uri);
        }

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::read_body(test::call_service(&app, req).await).await;
        assert!(std::str::from_utf8(&body).unwrap().starts_with("Hello"));
    }
}
