use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::channel::ReactionChannel;
use crate::error::EngineError;

// ─── Public types ────────────────────────────────────────────────

/// Shape of a simulated response run.
#[derive(Debug, Clone, Copy)]
pub struct ResponderPlan {
    pub concurrency: u32,
    pub duration: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

/// Outcome counters, shared by all workers of a run.
#[derive(Debug, Default)]
pub struct ResponderTally {
    pub accepted: AtomicU64,
    pub unarmed: AtomicU64,
    pub failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TallySnapshot {
    pub accepted: u64,
    pub unarmed: u64,
    pub failed: u64,
}

impl ResponderTally {
    pub fn reset(&self) {
        self.accepted.store(0, Ordering::Relaxed);
        self.unarmed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            accepted: self.accepted.load(Ordering::Relaxed),
            unarmed: self.unarmed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

// ─── Public entry point ──────────────────────────────────────────

/// Spawns `concurrency` Tokio tasks that answer stimuli after a random
/// delay until the deadline or the `running` flag is set to false.
pub async fn run(
    running: Arc<AtomicBool>,
    channel: ReactionChannel,
    tally: Arc<ResponderTally>,
    plan: ResponderPlan,
) {
    let deadline = Instant::now() + plan.duration;
    info!(concurrency = plan.concurrency, "simulated responders started");

    let mut handles = Vec::with_capacity(plan.concurrency as usize);

    for worker_id in 0..plan.concurrency {
        let running = running.clone();
        let channel = channel.clone();
        let tally = tally.clone();

        handles.push(tokio::spawn(async move {
            worker(worker_id, running, channel, tally, deadline, plan).await;
        }));
    }

    // Wait for all workers to finish
    for h in handles {
        let _ = h.await;
    }

    running.store(false, Ordering::SeqCst);
    info!(tally = ?tally.snapshot(), "simulated responders finished");
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(
    id: u32,
    running: Arc<AtomicBool>,
    channel: ReactionChannel,
    tally: Arc<ResponderTally>,
    deadline: Instant,
    plan: ResponderPlan,
) {
    // Each worker gets its own deterministic RNG seeded uniquely.
    let mut rng = StdRng::seed_from_u64(1000 + id as u64);
    let min = plan.min_delay.as_millis() as u64;
    let max = plan.max_delay.as_millis().max(min as u128) as u64;

    while running.load(Ordering::Relaxed) && Instant::now() < deadline {
        let delay = Duration::from_millis(rng.gen_range(min..=max));
        tokio::time::sleep(delay).await;

        match channel.write(b"!") {
            Ok(_) => {
                tally.accepted.fetch_add(1, Ordering::Relaxed);
            }
            Err(EngineError::Unarmed) => {
                tally.unarmed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                debug!(worker = id, error = %e, "simulated response failed");
                tally.failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
