use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::responder::{ResponderPlan, TallySnapshot};
use crate::AppState;

use super::AppError;

// ─── Request / response types ────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResponderConfig {
    /// Number of concurrent Tokio tasks answering stimuli
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// How long the run lasts (seconds)
    #[serde(default = "default_duration")]
    pub duration_secs: u64,

    /// Shortest simulated reaction (milliseconds)
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,

    /// Longest simulated reaction (milliseconds)
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_concurrency() -> u32 {
    1
}
fn default_duration() -> u64 {
    30
}
fn default_min_delay() -> u64 {
    150
}
fn default_max_delay() -> u64 {
    450
}

#[derive(Debug, Serialize)]
pub struct ResponderStatus {
    pub running: bool,
    pub message: String,
    pub tally: TallySnapshot,
}

// ─── POST /api/responders/start ──────────────────────────────────

pub async fn start_responders(
    State(state): State<Arc<AppState>>,
    Json(config): Json<ResponderConfig>,
) -> Result<Json<ResponderStatus>, AppError> {
    // Guard: only one run at a time
    if state.responders_running.load(Ordering::SeqCst) {
        return Err(AppError::AlreadyRunning("responder run"));
    }

    // Validate inputs
    if config.concurrency == 0 || config.concurrency > 64 {
        return Err(AppError::BadRequest(
            "concurrency must be between 1 and 64".into(),
        ));
    }
    if config.duration_secs == 0 || config.duration_secs > 3600 {
        return Err(AppError::BadRequest(
            "duration_secs must be between 1 and 3600".into(),
        ));
    }
    if config.min_delay_ms > config.max_delay_ms {
        return Err(AppError::BadRequest(
            "min_delay_ms must not exceed max_delay_ms".into(),
        ));
    }

    state.responder_tally.reset();

    // Flip the flag BEFORE spawning so workers see it immediately
    state.responders_running.store(true, Ordering::SeqCst);

    let msg = format!(
        "Started: {} responders × {}s, reacting in {}–{} ms",
        config.concurrency, config.duration_secs, config.min_delay_ms, config.max_delay_ms,
    );

    let plan = ResponderPlan {
        concurrency: config.concurrency,
        duration: Duration::from_secs(config.duration_secs),
        min_delay: Duration::from_millis(config.min_delay_ms),
        max_delay: Duration::from_millis(config.max_delay_ms),
    };
    let running = state.responders_running.clone();
    let channel = state.channel.clone();
    let tally = state.responder_tally.clone();

    let handle = tokio::spawn(async move {
        crate::responder::run(running, channel, tally, plan).await;
    });

    // Stash the handle so `stop` can await clean shutdown
    let mut guard = state.responder_handle.lock().await;
    *guard = Some(handle);

    Ok(Json(ResponderStatus {
        running: true,
        message: msg,
        tally: state.responder_tally.snapshot(),
    }))
}

// ─── POST /api/responders/stop ───────────────────────────────────

pub async fn stop_responders(State(state): State<Arc<AppState>>) -> Json<ResponderStatus> {
    if !state.responders_running.load(Ordering::SeqCst) {
        return Json(ResponderStatus {
            running: false,
            message: "No responder run in progress".into(),
            tally: state.responder_tally.snapshot(),
        });
    }

    // Signal all workers to stop
    state.responders_running.store(false, Ordering::SeqCst);

    // Await the run so we know every worker is gone
    let mut guard = state.responder_handle.lock().await;
    if let Some(handle) = guard.take() {
        // Ignore JoinError — the task may have already finished
        let _ = handle.await;
    }

    Json(ResponderStatus {
        running: false,
        message: "Responders stopped".into(),
        tally: state.responder_tally.snapshot(),
    })
}
