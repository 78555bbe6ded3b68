// HRMS API Library
//
// REST layer for the HRMS service: handlers, routes, response models and
// the mapping of engine errors onto HTTP responses.

pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ApiError;
pub use routes::configure_routes;
