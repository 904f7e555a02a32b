//! Report export endpoints
//!
//! Endpoints:
//! - api_export_excel: POST /api/export-excel, XLSX attachment
//! - api_export_pdf: POST /api/export-pdf, PDF attachment

use crate::{ApiError, AppState};
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use finreport_core::{generate_report, CoreError, ErrorContext, ReportFormat};
use finreport_utils::generate_id;

pub async fn api_export_excel(state: State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    export(&state, ReportFormat::Spreadsheet, body).await
}

pub async fn api_export_pdf(state: State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    export(&state, ReportFormat::Document, body).await
}

/// Render on the blocking pool and wrap the bytes as an attachment
async fn export(state: &AppState, format: ReportFormat, body: Bytes) -> Result<Response, ApiError> {
    let context = ErrorContext::new(format!("export_{}", format))
        .with_request_id(generate_id())
        .with_data("body_bytes", serde_json::json!(body.len()));

    let report_config = state.config.report.clone();
    let result = tokio::task::spawn_blocking(move || generate_report(format, &body, &report_config))
        .await
        .unwrap_or_else(|e| Err(CoreError::Internal { message: e.to_string() }));

    match result {
        Ok(bytes) => {
            let filename = format.filename(&state.config.report);
            log::info!(
                "Exported {} ({} bytes) - Request: {:?}",
                filename,
                bytes.len(),
                context.request_id
            );
            Ok(attachment(format.content_type(), filename, bytes))
        }
        Err(error) => {
            state.error_logger.report(&error, &context);
            Err(error.into())
        }
    }
}

fn attachment(content_type: &str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}
