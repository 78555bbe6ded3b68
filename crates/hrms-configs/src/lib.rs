//! hrms-configs
//!
//! Server configuration types and loader for the HRMS service.

pub mod config;

pub use config::defaults;
pub use config::*;
