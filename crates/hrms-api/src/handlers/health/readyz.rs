//! Readiness probe handler

use actix_web::{web, HttpResponse, Responder};
use hrms_core::QueryGateway;

use crate::models::HealthResponse;

/// GET /readyz - 200 when the store answers, 503 otherwise
pub async fn readyz_handler(gateway: web::Data<QueryGateway>) -> impl Responder {
    match gateway.ping(&gateway.context()).await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse::with_database(true)),
        Err(e) => {
            log::warn!("[HEALTH] readiness check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(HealthResponse::with_database(false))
        }
    }
}
