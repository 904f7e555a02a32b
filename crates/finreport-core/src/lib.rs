//! Core report generation for finreport
//!
//! A request is a titled list of movements. Both exports share one
//! aggregation step ([`aggregate::Totals`]) and then lay the movements out:
//! - [`spreadsheet`]: styled XLSX ledger with a totals footer
//! - [`document`]: paginated PDF table with a net balance line

pub mod aggregate;
pub mod document;
pub mod error;
pub mod models;
pub mod palette;
pub mod spreadsheet;
pub mod time;

use finreport_config::ReportConfig;

pub use aggregate::Totals;
pub use document::{build_document, DocumentLayout};
pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use models::{Movement, MovementKind, ReportPayload, ReportRequest, SentKeys};
pub use spreadsheet::{build_spreadsheet, SheetLayout};

/// Export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// XLSX workbook
    Spreadsheet,
    /// PDF document
    Document,
}

impl ReportFormat {
    /// MIME type of the rendered file
    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Document => "application/pdf",
        }
    }

    /// Attachment name configured for this format
    pub fn filename<'a>(&self, config: &'a ReportConfig) -> &'a str {
        match self {
            ReportFormat::Spreadsheet => &config.excel_filename,
            ReportFormat::Document => &config.pdf_filename,
        }
    }

    /// Only the PDF export rejects payloads without `movimientos`
    pub fn requires_movements(&self) -> bool {
        matches!(self, ReportFormat::Document)
    }

    /// Render a request in this format
    pub fn render(&self, request: &ReportRequest) -> CoreResult<Vec<u8>> {
        match self {
            ReportFormat::Spreadsheet => build_spreadsheet(request),
            ReportFormat::Document => build_document(request),
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" | "excel" => Ok(ReportFormat::Spreadsheet),
            "pdf" => Ok(ReportFormat::Document),
            _ => Err(format!("Invalid report format: {}", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Spreadsheet => write!(f, "xlsx"),
            ReportFormat::Document => write!(f, "pdf"),
        }
    }
}

/// Parse a request body and render it in `format`
pub fn generate_report(
    format: ReportFormat,
    body: &[u8],
    config: &ReportConfig,
) -> CoreResult<Vec<u8>> {
    let request = ReportPayload::from_slice(body)?
        .into_request(&config.default_title, format.requires_movements())?;
    format.render(&request)
}

// ==================== Tests ====================
