// HRMS server library
//
// Wiring for the `hrms-server` binary: logging setup, HTTP middleware and
// the server lifecycle. Exposed as a library so integration tests can build
// the same application the binary serves.

pub mod lifecycle;
pub mod logging;
pub mod middleware;

pub use hrms_configs as config;
pub use lifecycle::{bootstrap, run, ApplicationComponents};
