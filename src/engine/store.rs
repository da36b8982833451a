use std::collections::VecDeque;

use crate::config::Retention;
use crate::error::EngineError;

/// What a push did to the retained set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushOutcome {
    /// The sample is now part of the store.
    pub retained: bool,
    /// Sample dropped to make room, oldest first.
    pub evicted: Option<u64>,
}

/// Ordered retention of recorded durations under a [`Retention`] policy.
#[derive(Debug, Clone)]
pub struct SampleStore {
    samples: VecDeque<u64>,
    retention: Retention,
    /// Length at which `reserve_one` starts failing.
    #[cfg(test)]
    reserve_limit: Option<usize>,
}

impl SampleStore {
    /// Storage grows on demand, also for bounded policies.
    pub fn new(retention: Retention) -> Self {
        Self {
            samples: VecDeque::new(),
            retention,
            #[cfg(test)]
            reserve_limit: None,
        }
    }

    /// Makes every reservation at or beyond `len` samples fail.
    #[cfg(test)]
    pub(crate) fn fail_reserve_from(&mut self, len: usize) {
        self.reserve_limit = Some(len);
    }

    pub fn retention(&self) -> Retention {
        self.retention
    }

    /// `None` for an unbounded store.
    pub fn capacity(&self) -> Option<usize> {
        match self.retention {
            Retention::Unbounded => None,
            Retention::EvictOldest { capacity } | Retention::KeepFirst { capacity } => {
                Some(capacity)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity().is_some_and(|cap| self.samples.len() >= cap)
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.samples.iter().copied()
    }

    /// Makes sure the next [`push`](Self::push) cannot allocate.
    ///
    /// A full bounded store never grows, so it never fails here.
    pub fn reserve_one(&mut self) -> Result<(), EngineError> {
        if self.is_full() {
            return Ok(());
        }
        #[cfg(test)]
        if self.reserve_limit.is_some_and(|limit| self.samples.len() >= limit) {
            // an impossible request yields a genuine TryReserveError
            return Err(Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err().into());
        }
        self.samples.try_reserve(1)?;
        Ok(())
    }

    /// Appends a sample according to the retention policy.
    ///
    /// Never allocates once [`reserve_one`](Self::reserve_one) succeeded.
    pub fn push(&mut self, value: u64) -> PushOutcome {
        match self.retention {
            Retention::Unbounded => {
                self.samples.push_back(value);
                PushOutcome {
                    retained: true,
                    evicted: None,
                }
            }
            Retention::EvictOldest { capacity } => {
                let evicted = if self.samples.len() >= capacity {
                    self.samples.pop_front()
                } else {
                    None
                };
                self.samples.push_back(value);
                PushOutcome {
                    retained: true,
                    evicted,
                }
            }
            Retention::KeepFirst { capacity } => {
                let retained = self.samples.len() < capacity;
                if retained {
                    self.samples.push_back(value);
                }
                PushOutcome {
                    retained,
                    evicted: None,
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
