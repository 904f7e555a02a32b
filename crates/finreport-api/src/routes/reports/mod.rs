//! Report routes - Spreadsheet and PDF exports
//!
//! Structure:
//! - api.rs: export endpoints returning file attachments

pub mod api;

pub use api::{api_export_excel, api_export_pdf};
