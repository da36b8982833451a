//! Offline histograms from a sample dump, one `"<n> ns"` per line.

use crate::config::Retention;
use crate::engine::{report, HistogramEngine, RunningStatistics, SampleStore};
use crate::error::DumpError;

/// Parses a dump; blank lines are skipped, the first token must be an integer.
pub fn parse(text: &str) -> Result<Vec<u64>, DumpError> {
    text.lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            l.split_whitespace()
                .next()
                .and_then(|tok| tok.parse::<u64>().ok())
                .ok_or_else(|| DumpError::Malformed {
                    line: i + 1,
                    content: l.to_string(),
                })
        })
        .collect()
}

/// Summary line, `Histogram:` header and bins, as the live report renders them.
pub fn render(values: &[u64], bins: usize) -> String {
    let mut stats = RunningStatistics::new();
    let mut store = SampleStore::new(Retention::Unbounded);
    for &v in values {
        stats.record(v);
        store.push(v);
    }
    let hist = HistogramEngine::from_samples(bins, &store);
    report::render(&stats, &hist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_driver_dump() {
        let text = "120 ns\n\n80 ns\n100\n";
        assert_eq!(parse(text).unwrap(), vec![120, 80, 100]);
    }

    #[test]
    fn reports_malformed_line_number() {
        let err = parse("5 ns\nfast\n").unwrap_err();
        match err {
            DumpError::Malformed { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "fast");
            }
        }
    }

    #[test]
    fn renders_like_the_live_report() {
        let text = render(&[0, 10], 2);
        assert_eq!(
            text,
            "Average: 5 ns, Max: 10 ns, Min: 0 ns\nHistogram:\n[0 - 5]: #\n[5 - 10]: #\n"
        );
        assert!(render(&[], 10).ends_with("not enough data\n"));
    }
}
