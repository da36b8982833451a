use std::fmt::Write as _;

use super::histogram::HistogramEngine;
use super::stats::RunningStatistics;
use crate::error::EngineError;

/// Placeholder histogram line before any sample was observed.
pub const NO_DATA: &str = "not enough data";

/// Renders the text report and runs the report/end-of-stream alternation.
///
/// Consecutive successful reads alternate between the full report and a
/// zero-byte end-of-stream, whatever happened in between.
#[derive(Debug, Default)]
pub struct ReportFormatter {
    pending_delivery: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the next read returns end-of-stream.
    pub fn pending_delivery(&self) -> bool {
        self.pending_delivery
    }

    /// One read call of the alternation protocol.
    ///
    /// On [`EngineError::OutputTooLarge`] nothing is written and the
    /// delivery state is left as it was.
    pub fn read(
        &mut self,
        stats: &RunningStatistics,
        hist: &HistogramEngine,
        buf: &mut [u8],
    ) -> Result<usize, EngineError> {
        if self.pending_delivery {
            self.pending_delivery = false;
            return Ok(0);
        }

        let report = render(stats, hist);
        let bytes = report.as_bytes();
        if bytes.len() > buf.len() {
            return Err(EngineError::OutputTooLarge {
                needed: bytes.len(),
                available: buf.len(),
            });
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        self.pending_delivery = true;
        Ok(bytes.len())
    }

    pub fn reset(&mut self) {
        self.pending_delivery = false;
    }
}

/// Full report: summary line, `Histogram:` header, then the bins.
pub fn render(stats: &RunningStatistics, hist: &HistogramEngine) -> String {
    let mut out = summary_line(stats);
    out.push_str("Histogram:\n");
    out.push_str(&render_histogram(hist));
    out
}

pub fn summary_line(stats: &RunningStatistics) -> String {
    format!(
        "Average: {} ns, Max: {} ns, Min: {} ns\n",
        stats.average(),
        stats.max.unwrap_or(0),
        stats.min.unwrap_or(0),
    )
}

/// One `[low - high]: ###` line per bin, or the no-data placeholder.
pub fn render_histogram(hist: &HistogramEngine) -> String {
    let bins = hist.bins();
    if bins.is_empty() {
        return format!("{NO_DATA}\n");
    }

    let mut out = String::new();
    for bin in bins {
        let bar = "#".repeat(bin.count as usize);
        let _ = writeln!(out, "[{} - {}]: {}", bin.low, bin.high, bar);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RebuildPolicy, Retention};
    use crate::engine::store::SampleStore;

    fn populated(values: &[u64]) -> (RunningStatistics, HistogramEngine) {
        let mut stats = RunningStatistics::new();
        let mut store = SampleStore::new(Retention::Unbounded);
        let mut hist = HistogramEngine::new(10, RebuildPolicy::Always);
        for &v in values {
            stats.record(v);
            let outcome = store.push(v);
            hist.observe(v, outcome, &store);
        }
        (stats, hist)
    }

    #[test]
    fn empty_report_uses_placeholder_and_zero_sentinels() {
        let (stats, hist) = populated(&[]);
        assert_eq!(
            render(&stats, &hist),
            "Average: 0 ns, Max: 0 ns, Min: 0 ns\nHistogram:\nnot enough data\n"
        );
    }

    #[test]
    fn report_layout_is_stable() {
        let (stats, hist) = populated(&[100, 200, 200, 1_100]);
        let report = render(&stats, &hist);
        let expected = concat!(
            "Average: 400 ns, Max: 1100 ns, Min: 100 ns\n",
            "Histogram:\n",
            "[100 - 200]: #\n",
            "[200 - 300]: ##\n",
            "[300 - 400]: \n",
            "[400 - 500]: \n",
            "[500 - 600]: \n",
            "[600 - 700]: \n",
            "[700 - 800]: \n",
            "[800 - 900]: \n",
            "[900 - 1000]: \n",
            "[1000 - 1100]: #\n",
        );
        assert_eq!(report, expected);
    }

    #[test]
    fn reads_alternate_between_report_and_eof() {
        let (stats, hist) = populated(&[10, 20]);
        let mut fmt = ReportFormatter::new();
        let mut buf = [0u8; 1024];

        let n = fmt.read(&stats, &hist, &mut buf).unwrap();
        assert!(n > 0);
        assert_eq!(&buf[..n], render(&stats, &hist).as_bytes());
        assert_eq!(fmt.read(&stats, &hist, &mut buf).unwrap(), 0);
        assert_eq!(fmt.read(&stats, &hist, &mut buf).unwrap(), n);
    }

    #[test]
    fn oversized_report_fails_without_writing() {
        let (stats, hist) = populated(&[10, 20, 30]);
        let mut fmt = ReportFormatter::new();
        let mut buf = [0xAAu8; 16];

        let err = fmt.read(&stats, &hist, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            EngineError::OutputTooLarge { available: 16, .. }
        ));
        assert!(buf.iter().all(|&b| b == 0xAA));
        assert!(!fmt.pending_delivery());
    }
}
