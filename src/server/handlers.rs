use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::normalize::SourceKind;
use crate::pipeline::{run_batch, BatchReport};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    code: u16,
}

pub(super) struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            success: false,
            error: self.error,
            details: self.details,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>, details: Option<String>) -> ApiError {
    ApiError {
        status,
        error: msg.into(),
        details,
    }
}

// ─── GET /api/scrape ─────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: &'static str,
    pub available_scrapers: Vec<&'static str>,
}

pub async fn scrape_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: if state.is_running() { "running" } else { "ready" },
        available_scrapers: SourceKind::ALL.iter().map(|k| k.name()).collect(),
    })
}

// ─── POST /api/scrape ────────────────────────────────────────────

#[derive(Serialize)]
pub struct RunResponse {
    pub success: bool,
    pub message: String,
    pub records: usize,
    pub output: String,
    pub report: BatchReport,
}

pub async fn run_scrape(State(state): State<Arc<AppState>>) -> Result<Json<RunResponse>, ApiError> {
    let guard = state
        .try_start()
        .ok_or_else(|| api_error(StatusCode::CONFLICT, "A batch is already running", None))?;

    let start = Instant::now();
    let config = state.config.clone();
    let result = tokio::task::spawn_blocking(move || {
        let _guard = guard;
        run_batch(&config)
    })
    .await;

    let report = match result {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            error!(error = %e, "batch failed");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to run scrapers",
                Some(e.to_string()),
            ));
        }
        Err(e) => {
            error!(error = %e, "batch worker panicked");
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to run scrapers",
                Some(e.to_string()),
            ));
        }
    };

    info!(
        records = report.records,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "POST /api/scrape completed"
    );

    Ok(Json(RunResponse {
        success: true,
        message: format!("Processed {} records", report.records),
        records: report.records,
        output: report.output_path.display().to_string(),
        report,
    }))
}

// ─── GET /api/health ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
