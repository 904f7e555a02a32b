//! Route modules for the API server
//!
//! - reports: spreadsheet and PDF exports
//! - health: liveness check

pub mod health;
pub mod reports;
