use serde::Serialize;

/// Count, sum, min and max over every sample ever committed.
///
/// Independent of the retention policy: a sample the store refuses or
/// later evicts is still counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunningStatistics {
    pub count: u64,
    pub sum: u64,
    /// `None` until the first sample.
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl RunningStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `duration` can be added without overflowing `sum`.
    ///
    /// u64 nanoseconds hold ~584 years of accumulated reaction time.
    pub fn can_record(&self, duration: u64) -> bool {
        self.sum.checked_add(duration).is_some()
    }

    /// Callers check [`can_record`](Self::can_record) first.
    pub fn record(&mut self, duration: u64) {
        self.count += 1;
        self.sum += duration;
        self.min = Some(self.min.map_or(duration, |m| m.min(duration)));
        self.max = Some(self.max.map_or(duration, |m| m.max(duration)));
    }

    /// Integer-truncated mean, 0 with no samples.
    pub fn average(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.sum / self.count
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statistics_report_zero_average() {
        let stats = RunningStatistics::new();
        assert_eq!(stats.average(), 0);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
    }

    #[test]
    fn detects_sum_overflow() {
        let mut stats = RunningStatistics::new();
        stats.record(u64::MAX - 10);
        assert!(stats.can_record(10));
        assert!(!stats.can_record(11));
    }

    #[test]
    fn tracks_extremes_and_truncated_mean() {
        let mut stats = RunningStatistics::new();
        for d in [7, 3, 10] {
            stats.record(d);
        }
        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, 20);
        assert_eq!(stats.average(), 6);
        assert_eq!(stats.min, Some(3));
        assert_eq!(stats.max, Some(10));
    }
}
