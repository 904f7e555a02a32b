//! Liveness check

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
    pub message: &'static str,
}

pub async fn api_liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok",
        message: "finreport is running",
    })
}
