//! The reaction-time measurement engine.
//!
//! Every piece of mutable state (pending stimulus, statistics, sample
//! store, histogram, latency distribution and the report delivery flag)
//! lives behind one mutex, so a sample commit or a report read is observed
//! either entirely or not at all by the scheduler and by client calls.

pub mod histogram;
pub mod percentiles;
pub mod recorder;
pub mod report;
pub mod stats;
pub mod store;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::config::{Config, RebuildPolicy, Retention};
use crate::error::EngineError;

pub use histogram::{Bin, HistogramEngine, Range};
pub use percentiles::PercentileSet;
pub use recorder::{ReactionRecorder, Sample};
pub use report::ReportFormatter;
pub use stats::RunningStatistics;
pub use store::SampleStore;

/// Thread-safe measurement engine.
/// The scheduler calls `on_stimulus()`, clients call `on_response()` and `read_report()`.
pub struct Engine {
    inner: Mutex<Inner>,
}

/// Read-only view for JSON consumers.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot {
    pub stats: RunningStatistics,
    pub average_ns: u64,
    pub percentiles: PercentileSet,
    pub armed: bool,
    pub retained: usize,
    pub retention: Retention,
    pub rebuild: RebuildPolicy,
    pub rebuilds: u64,
    pub range: Option<Range>,
    pub bins: Vec<Bin>,
}

struct Inner {
    recorder: ReactionRecorder,
    formatter: ReportFormatter,
}

impl Engine {
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Mutex::new(Inner {
                recorder: ReactionRecorder::new(config),
                formatter: ReportFormatter::new(),
            }),
        }
    }

    pub fn on_stimulus(&self, timestamp_ns: u64) {
        self.inner.lock().recorder.on_stimulus(timestamp_ns);
    }

    pub fn on_response(&self, timestamp_ns: u64) -> Result<Sample, EngineError> {
        self.inner.lock().recorder.on_response(timestamp_ns)
    }

    /// One read of the report/end-of-stream alternation.
    pub fn read_report(&self, buf: &mut [u8]) -> Result<usize, EngineError> {
        let mut guard = self.inner.lock();
        let Inner {
            recorder,
            formatter,
        } = &mut *guard;
        formatter.read(recorder.stats(), recorder.histogram(), buf)
    }

    /// The report text, without touching the delivery state.
    pub fn render_report(&self) -> String {
        let inner = self.inner.lock();
        report::render(inner.recorder.stats(), inner.recorder.histogram())
    }

    pub fn is_armed(&self) -> bool {
        self.inner.lock().recorder.is_armed()
    }

    pub fn stats(&self) -> RunningStatistics {
        self.inner.lock().recorder.stats().clone()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> Vec<u64> {
        self.inner.lock().recorder.store().iter().collect()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let inner = self.inner.lock();
        let rec = &inner.recorder;
        let hist = rec.histogram();
        EngineSnapshot {
            stats: rec.stats().clone(),
            average_ns: rec.stats().average(),
            percentiles: rec.latency().percentiles(),
            armed: rec.is_armed(),
            retained: rec.store().len(),
            retention: rec.store().retention(),
            rebuild: hist.policy(),
            rebuilds: hist.rebuilds(),
            range: hist.range(),
            bins: hist.bins(),
        }
    }

    /// Wipe all data and the delivery state.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.recorder.reset();
        inner.formatter.reset();
        info!("engine reset");
    }
}
