use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clock::Clock;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::scheduler::EventScheduler;

/// Byte-oriented read/write surface over the engine.
///
/// A non-empty write means "the subject responded now"; a read runs one
/// step of the report/end-of-stream alternation.
#[derive(Clone)]
pub struct ReactionChannel {
    engine: Arc<Engine>,
    clock: Arc<dyn Clock>,
}

impl ReactionChannel {
    pub fn new(engine: Arc<Engine>, clock: Arc<dyn Clock>) -> Self {
        Self { engine, clock }
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Records a response timestamped now; byte contents are ignored.
    ///
    /// Returns `bytes.len()` on success. An empty write records nothing.
    pub fn write(&self, bytes: &[u8]) -> Result<usize, EngineError> {
        if bytes.is_empty() {
            return Ok(0);
        }
        let now = self.clock.now_ns();
        match self.engine.on_response(now) {
            Ok(sample) => {
                debug!(duration_ns = sample.duration_ns, "response accepted");
                Ok(bytes.len())
            }
            Err(e) => {
                warn!(error = %e, "response rejected");
                Err(e)
            }
        }
    }

    /// Writes the report into `buf`, or returns 0 for end-of-stream.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, EngineError> {
        self.engine.read_report(buf)
    }

    /// Generates a stimulus timestamped now.
    pub fn stimulate(&self) {
        self.engine.on_stimulus(self.clock.now_ns());
    }

    /// Starts a scheduler that stimulates this channel every `interval`.
    pub fn start_stimulus(&self, interval: Duration) -> EventScheduler {
        let channel = self.clone();
        EventScheduler::start(interval, move || channel.stimulate())
    }
}
