//! Health check handlers
//!
//! ## Endpoints
//! - GET /healthz - liveness probe
//! - GET /readyz - readiness probe (round-trips `SELECT 1` through the pool)

mod healthz;
mod readyz;

pub use healthz::healthz_handler;
pub use readyz::readyz_handler;
