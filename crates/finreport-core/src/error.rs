//! Error types for finreport-core
//!
//! Errors carry a machine-readable code, a severity, and can be turned into
//! a detailed form with suggestions for server-side diagnostics.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request carries no movement list
    MissingMovements,
    /// Request body is not a valid report payload
    InvalidPayload,
    /// Movement date could not be parsed
    InvalidDate,
    /// A total left the representable decimal range
    AmountOverflow,
    /// Spreadsheet writer failed
    SpreadsheetError,
    /// PDF writer failed
    DocumentError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MissingMovements => write!(f, "MISSING_MOVEMENTS"),
            ErrorCode::InvalidPayload => write!(f, "INVALID_PAYLOAD"),
            ErrorCode::InvalidDate => write!(f, "INVALID_DATE"),
            ErrorCode::AmountOverflow => write!(f, "AMOUNT_OVERFLOW"),
            ErrorCode::SpreadsheetError => write!(f, "SPREADSHEET_ERROR"),
            ErrorCode::DocumentError => write!(f, "DOCUMENT_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Warning - the caller sent something unusable
    Warning,
    /// Error - report generation failed
    Error,
    /// Critical - the service itself misbehaved
    Critical,
}

impl ErrorSeverity {
    /// Log level for errors of this severity
    pub fn level(&self) -> log::Level {
        match self {
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for finreport-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No se recibieron movimientos")]
    MissingMovements,

    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },

    #[error("Invalid date: {value}")]
    InvalidDate { value: String },

    #[error("Total out of range: {total}")]
    AmountOverflow { total: String },

    #[error("Spreadsheet generation failed: {message}")]
    Spreadsheet { message: String },

    #[error("PDF generation failed: {message}")]
    Document { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MissingMovements => ErrorCode::MissingMovements,
            CoreError::InvalidPayload { .. } => ErrorCode::InvalidPayload,
            CoreError::InvalidDate { .. } => ErrorCode::InvalidDate,
            CoreError::AmountOverflow { .. } => ErrorCode::AmountOverflow,
            CoreError::Spreadsheet { .. } => ErrorCode::SpreadsheetError,
            CoreError::Document { .. } => ErrorCode::DocumentError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MissingMovements => ErrorSeverity::Warning,
            CoreError::InvalidPayload { .. } => ErrorSeverity::Warning,
            CoreError::InvalidDate { .. } => ErrorSeverity::Error,
            CoreError::AmountOverflow { .. } => ErrorSeverity::Error,
            CoreError::Spreadsheet { .. } => ErrorSeverity::Error,
            CoreError::Document { .. } => ErrorSeverity::Error,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the error was caused by the request rather than by generation
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::MissingMovements | CoreError::InvalidPayload { .. })
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(
            self.code(),
            self.to_string(),
        );

        match self {
            CoreError::MissingMovements => {
                details = details.with_suggestion(
                    "Send a JSON object with a \"movimientos\" array.".to_string()
                );
            }
            CoreError::InvalidPayload { message } => {
                details = details.with_detail(serde_json::json!({ "parse_message": message }));
                details = details.with_suggestion(
                    "Check that the request body is a JSON object.".to_string()
                );
            }
            CoreError::InvalidDate { value } => {
                details = details.with_detail(serde_json::json!({ "created_at": value }));
                details = details.with_suggestion(
                    "Use ISO 8601 timestamps such as 2024-05-01T10:30:00Z.".to_string()
                );
            }
            CoreError::AmountOverflow { total } => {
                details = details.with_detail(serde_json::json!({ "total": total }));
                details = details.with_suggestion(
                    "Split the movements into smaller reports.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<rust_xlsxwriter::XlsxError> for CoreError {
    fn from(error: rust_xlsxwriter::XlsxError) -> Self {
        CoreError::Spreadsheet { message: error.to_string() }
    }
}

impl From<printpdf::Error> for CoreError {
    fn from(error: printpdf::Error) -> Self {
        CoreError::Document { message: error.to_string() }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            request_id: None,
            operation,
            data: serde_json::json!({}),
        }
    }

    /// Add request ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);

    /// Route an error by severity: warnings carry only the message
    fn report(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Warning => self.log_warning(&error.to_string(), context),
            ErrorSeverity::Error | ErrorSeverity::Critical => self.log_error(error, context),
        }
    }
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let severity = error.severity();
        log::log!(
            target: "finreport::error",
            severity.level(),
            "{} [{}] {} - Operation: {} - Request: {:?} - Data: {}",
            severity.to_string().to_uppercase(),
            error.code(),
            error.to_details(),
            context.operation,
            context.request_id,
            context.data
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "finreport::error",
            "WARNING: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request_id
        );
    }
}

// ==================== Tests ====================
