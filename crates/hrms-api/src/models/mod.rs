//! Response bodies.

mod error_response;
mod health_response;
mod table_responses;

pub use error_response::{ErrorBody, ErrorResponse};
pub use health_response::HealthResponse;
pub use table_responses::{ColumnsResponse, RowsResponse, TablesResponse};
