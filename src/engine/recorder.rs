use serde::Serialize;
use tracing::{debug, warn};

use super::histogram::HistogramEngine;
use super::percentiles::LatencyDistribution;
use super::stats::RunningStatistics;
use super::store::SampleStore;
use crate::config::Config;
use crate::error::EngineError;

/// One measured reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub stimulus_ns: u64,
    pub response_ns: u64,
    pub duration_ns: u64,
}

/// Pairs the pending stimulus with a response and commits the resulting
/// sample to statistics, store and histogram.
pub struct ReactionRecorder {
    pending: Option<u64>,
    stats: RunningStatistics,
    store: SampleStore,
    histogram: HistogramEngine,
    latency: LatencyDistribution,
}

impl ReactionRecorder {
    pub fn new(config: &Config) -> Self {
        Self {
            pending: None,
            stats: RunningStatistics::new(),
            store: SampleStore::new(config.retention),
            histogram: HistogramEngine::new(config.bins, config.rebuild),
            latency: LatencyDistribution::new(),
        }
    }

    /// Arms the recorder. A stimulus nobody answered is silently replaced.
    pub fn on_stimulus(&mut self, timestamp_ns: u64) {
        if let Some(previous) = self.pending.replace(timestamp_ns) {
            debug!(previous, "unanswered stimulus superseded");
        }
    }

    /// Turns a response into a sample.
    ///
    /// Either every structure sees the sample or none does: all fallible
    /// steps run before the first mutation.
    pub fn on_response(&mut self, timestamp_ns: u64) -> Result<Sample, EngineError> {
        let stimulus_ns = self.pending.ok_or(EngineError::Unarmed)?;
        let duration_ns = timestamp_ns
            .checked_sub(stimulus_ns)
            .ok_or(EngineError::ClockSkew {
                stimulus: stimulus_ns,
                response: timestamp_ns,
            })?;
        if !self.stats.can_record(duration_ns) {
            return Err(EngineError::StatisticsOverflow {
                duration: duration_ns,
            });
        }
        self.store.reserve_one()?;

        // ── Commit ──────────────────────────────────────────────
        self.pending = None;
        self.stats.record(duration_ns);
        self.latency.record(duration_ns);
        let outcome = self.store.push(duration_ns);
        if !outcome.retained {
            warn!(
                capacity = ?self.store.capacity(),
                "sample store full, sample counted but not stored"
            );
        }
        self.histogram.observe(duration_ns, outcome, &self.store);

        debug!(duration_ns, "reaction recorded");
        Ok(Sample {
            stimulus_ns,
            response_ns: timestamp_ns,
            duration_ns,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_stimulus(&self) -> Option<u64> {
        self.pending
    }

    pub fn stats(&self) -> &RunningStatistics {
        &self.stats
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn histogram(&self) -> &HistogramEngine {
        &self.histogram
    }

    pub fn latency(&self) -> &LatencyDistribution {
        &self.latency
    }

    /// Back to the freshly constructed state, keeping the configuration.
    pub fn reset(&mut self) {
        self.pending = None;
        self.stats = RunningStatistics::new();
        self.store.clear();
        self.histogram.reset();
        self.latency = LatencyDistribution::new();
    }
}
