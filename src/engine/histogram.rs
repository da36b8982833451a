use serde::Serialize;

use super::store::{PushOutcome, SampleStore};
use crate::config::RebuildPolicy;

/// Observed value range `[low, high]`, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Range {
    pub low: u64,
    pub high: u64,
}

/// One rendered bin: its label bounds and how many retained samples fall in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bin {
    pub low: u64,
    pub high: u64,
    pub count: u64,
}

/// Fixed-width bins over the range of every sample seen so far.
///
/// Bin `i` covers `[low + i*w, low + (i+1)*w)` with `w = (high - low) / N`;
/// the last bin is closed so `high` always lands in bin `N-1`. The bins
/// count exactly the samples currently held by the [`SampleStore`], while
/// the range never shrinks when the store evicts or refuses samples.
#[derive(Debug, Clone)]
pub struct HistogramEngine {
    bins: Vec<u64>,
    range: Option<Range>,
    policy: RebuildPolicy,
    rebuilds: u64,
}

impl HistogramEngine {
    /// `bins` must be at least 1.
    pub fn new(bins: usize, policy: RebuildPolicy) -> Self {
        Self {
            bins: vec![0; bins.max(1)],
            range: None,
            policy,
            rebuilds: 0,
        }
    }

    /// Builds a histogram spanning exactly the values held by `store`.
    pub fn from_samples(bins: usize, store: &SampleStore) -> Self {
        let mut hist = Self::new(bins, RebuildPolicy::Always);
        let low = store.iter().min();
        let high = store.iter().max();
        if let (Some(low), Some(high)) = (low, high) {
            hist.range = Some(Range { low, high });
            hist.rebuild(store);
        }
        hist
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    pub fn counts(&self) -> &[u64] {
        &self.bins
    }

    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    /// Number of full rebuilds performed so far.
    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }

    /// Folds a freshly committed sample in.
    ///
    /// `store` must already reflect `outcome`.
    pub fn observe(&mut self, value: u64, outcome: PushOutcome, store: &SampleStore) {
        let range_changed = match self.range {
            None => {
                self.range = Some(Range {
                    low: value,
                    high: value,
                });
                true
            }
            Some(r) if value < r.low || value > r.high => {
                self.range = Some(Range {
                    low: r.low.min(value),
                    high: r.high.max(value),
                });
                true
            }
            Some(_) => false,
        };

        match self.policy {
            RebuildPolicy::Always => self.rebuild(store),
            RebuildPolicy::OnRangeChange if range_changed => self.rebuild(store),
            RebuildPolicy::OnRangeChange => {
                // Evicted values lie inside the current range, and were counted
                // under it by the last rebuild.
                if let Some(old) = outcome.evicted {
                    let i = self.bin_index(old);
                    self.bins[i] = self.bins[i].saturating_sub(1);
                }
                if outcome.retained {
                    let i = self.bin_index(value);
                    self.bins[i] += 1;
                }
            }
        }
    }

    /// Clears all bins and recounts every retained sample.
    pub fn rebuild(&mut self, store: &SampleStore) {
        self.bins.iter_mut().for_each(|b| *b = 0);
        for value in store.iter() {
            let i = self.bin_index(value);
            self.bins[i] += 1;
        }
        self.rebuilds += 1;
    }

    /// Bin a value falls into under the current range, clamped to `[0, N-1]`.
    pub fn bin_index(&self, value: u64) -> usize {
        let Some(Range { low, high }) = self.range else {
            return 0;
        };
        let n = self.bins.len();
        let span = high.saturating_sub(low);
        if span == 0 || value <= low {
            return 0;
        }
        let idx = (value - low) as u128 * n as u128 / span as u128;
        (idx as usize).min(n - 1)
    }

    /// Label bounds of bin `i`.
    pub fn bin_bounds(&self, i: usize) -> Option<(u64, u64)> {
        let Range { low, high } = self.range?;
        let n = self.bins.len() as u128;
        let span = (high - low) as u128;
        let lo = low + (i as u128 * span / n) as u64;
        let hi = low + ((i as u128 + 1) * span / n) as u64;
        Some((lo, hi))
    }

    /// Bins with their label bounds; empty before the first sample.
    pub fn bins(&self) -> Vec<Bin> {
        (0..self.bins.len())
            .filter_map(|i| {
                self.bin_bounds(i).map(|(low, high)| Bin {
                    low,
                    high,
                    count: self.bins[i],
                })
            })
            .collect()
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0);
        self.range = None;
        self.rebuilds = 0;
    }
}
