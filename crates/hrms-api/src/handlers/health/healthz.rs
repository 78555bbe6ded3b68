//! Liveness probe handler

use actix_web::{HttpResponse, Responder};

use crate::models::HealthResponse;

/// GET /healthz - 200 while the process is serving requests
pub async fn healthz_handler() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::ok())
}
