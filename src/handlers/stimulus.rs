use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StimulusRequest {
    /// Overrides the configured interval for this run
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct StimulusStatus {
    pub running: bool,
    pub interval_ms: Option<u64>,
    pub fired: u64,
    pub armed: bool,
}

// ─── POST /api/stimulus/start ────────────────────────────────────

pub async fn start_stimulus(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StimulusRequest>>,
) -> Result<Json<StimulusStatus>, AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let interval_ms = request.interval_ms.unwrap_or(state.config.interval_ms);
    if interval_ms == 0 || interval_ms > 3_600_000 {
        return Err(AppError::BadRequest(
            "interval_ms must be between 1 and 3600000".into(),
        ));
    }

    // Guard: only one scheduler at a time
    let mut guard = state.scheduler.lock().await;
    if guard.is_some() {
        return Err(AppError::AlreadyRunning("stimulus scheduler"));
    }
    let sched = state
        .channel
        .start_stimulus(Duration::from_millis(interval_ms));
    *guard = Some(sched);

    Ok(Json(StimulusStatus {
        running: true,
        interval_ms: Some(interval_ms),
        fired: 0,
        armed: state.channel.engine().is_armed(),
    }))
}

// ─── POST /api/stimulus/stop ─────────────────────────────────────

pub async fn stop_stimulus(State(state): State<Arc<AppState>>) -> Json<StimulusStatus> {
    let taken = state.scheduler.lock().await.take();
    let fired = match taken {
        Some(sched) => {
            let fired = sched.fired();
            // Returns once the timer task is gone
            sched.stop().await;
            fired
        }
        None => 0,
    };

    Json(StimulusStatus {
        running: false,
        interval_ms: None,
        fired,
        armed: state.channel.engine().is_armed(),
    })
}

// ─── GET /api/stimulus/status ────────────────────────────────────

pub async fn stimulus_status(State(state): State<Arc<AppState>>) -> Json<StimulusStatus> {
    let guard = state.scheduler.lock().await;
    Json(StimulusStatus {
        running: guard.is_some(),
        interval_ms: guard.as_ref().map(|s| s.interval().as_millis() as u64),
        fired: guard.as_ref().map_or(0, |s| s.fired()),
        armed: state.channel.engine().is_armed(),
    })
}
