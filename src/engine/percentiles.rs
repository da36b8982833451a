use hdrhistogram::Histogram;
use serde::Serialize;

/// HdrHistogram range: 1 ns → 1 h, 3 significant figures
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 3_600_000_000_000;
const HIST_SIGFIG: u8 = 3;

/// Percentile-grade view of every reaction time ever committed.
///
/// Unlike the fixed-bin histogram it does not depend on retention, so it
/// stays accurate after the sample store starts evicting.
pub struct LatencyDistribution {
    hist: Histogram<u64>,
}

impl LatencyDistribution {
    pub fn new() -> Self {
        Self {
            hist: Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
                .expect("histogram creation"),
        }
    }

    /// Values outside 1 ns … 1 h are clamped, so this never fails.
    pub fn record(&mut self, duration_ns: u64) {
        self.hist.saturating_record(duration_ns.max(HIST_LOW));
    }

    pub fn percentiles(&self) -> PercentileSet {
        PercentileSet::from_histogram(&self.hist)
    }
}

impl Default for LatencyDistribution {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete percentile breakdown, in nanoseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub p999: u64,
    pub count: u64,
}

impl PercentileSet {
    /// Zeroed when the histogram is empty.
    pub fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::empty();
        }

        Self {
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            p50: hist.value_at_quantile(0.50),
            p95: hist.value_at_quantile(0.95),
            p99: hist.value_at_quantile(0.99),
            p999: hist.value_at_quantile(0.999),
            count: hist.len(),
        }
    }

    pub fn empty() -> Self {
        Self {
            min: 0,
            max: 0,
            mean: 0.0,
            p50: 0,
            p95: 0,
            p99: 0,
            p999: 0,
            count: 0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}
