pub mod channel;
pub mod metrics;
pub mod responders;
pub mod stimulus;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::EngineError;

// ─── Unified error type ──────────────────────────────────────────

#[derive(Debug)]
pub enum AppError {
    Engine(EngineError),
    BadRequest(String),
    AlreadyRunning(&'static str),
}

impl From<EngineError> for AppError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Engine(e) => {
                let status = match e {
                    EngineError::Unarmed | EngineError::ClockSkew { .. } => {
                        StatusCode::CONFLICT
                    }
                    EngineError::OutputTooLarge { .. } => {
                        StatusCode::PAYLOAD_TOO_LARGE
                    }
                    EngineError::Allocation(_) | EngineError::StatisticsOverflow { .. } => {
                        StatusCode::INSUFFICIENT_STORAGE
                    }
                };
                (status, e.to_string())
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::AlreadyRunning(what) => {
                (StatusCode::CONFLICT, format!("{what} already running"))
            }
        };

        let body = serde_json::json!({
            "error":  message,
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
