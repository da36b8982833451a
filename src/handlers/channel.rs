use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::MAX_REPORT_BUFFER;
use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct WriteAck {
    /// Bytes accepted by the channel (the request body length)
    pub accepted: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReadParams {
    /// Destination buffer size, at most `MAX_REPORT_BUFFER`; defaults to
    /// the configured report buffer
    pub buffer: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SampleDump {
    pub count: usize,
    pub samples_ns: Vec<u64>,
}

// ─── POST /api/response ──────────────────────────────────────────
/// Any non-empty body counts as a response happening now.
pub async fn write_response(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<WriteAck>, AppError> {
    let accepted = state.channel.write(&body)?;
    Ok(Json(WriteAck { accepted }))
}

// ─── GET /api/report ─────────────────────────────────────────────
/// One read of the alternation protocol: 200 with the text report,
/// or 204 for end-of-stream.
pub async fn read_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReadParams>,
) -> Result<Response, AppError> {
    let size = params.buffer.unwrap_or(state.config.report_buffer);
    if size == 0 || size > MAX_REPORT_BUFFER {
        return Err(AppError::BadRequest(format!(
            "buffer must be between 1 and {MAX_REPORT_BUFFER}"
        )));
    }

    let mut buf = vec![0u8; size];
    let n = state.channel.read(&mut buf)?;
    if n == 0 {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }
    buf.truncate(n);

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        buf,
    )
        .into_response())
}

// ─── GET /api/samples ────────────────────────────────────────────
/// Retained reaction times, oldest first.
pub async fn get_samples(State(state): State<Arc<AppState>>) -> Json<SampleDump> {
    let samples_ns = state.channel.engine().samples();
    Json(SampleDump {
        count: samples_ns.len(),
        samples_ns,
    })
}
