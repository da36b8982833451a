//! Reaction-time measurement: a periodic stimulus, a response recorder
//! and an adaptive histogram, exposed through a byte channel and an HTTP
//! surface.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub mod channel;
pub mod clock;
pub mod config;
pub mod dump;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod responder;
pub mod scheduler;
pub mod server;

pub use channel::ReactionChannel;
pub use config::Config;
pub use engine::Engine;
pub use error::{ConfigError, DumpError, EngineError};
pub use scheduler::EventScheduler;

/// Shared application state available to every handler via `State<Arc<AppState>>`.
pub struct AppState {
    pub config: Config,

    /// Byte channel over the engine — handlers write responses and read reports.
    pub channel: ReactionChannel,

    /// Running stimulus scheduler, if any.
    pub scheduler: tokio::sync::Mutex<Option<EventScheduler>>,

    /// Flag checked by every simulated responder on each iteration.
    pub responders_running: Arc<AtomicBool>,

    /// Counters of the current or last responder run.
    pub responder_tally: Arc<responder::ResponderTally>,

    /// Handle to the spawned responder task so we can await clean shutdown.
    pub responder_handle: tokio::sync::Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl AppState {
    pub fn new(config: Config, channel: ReactionChannel) -> Self {
        Self {
            config,
            channel,
            scheduler: tokio::sync::Mutex::new(None),
            responders_running: Arc::new(AtomicBool::new(false)),
            responder_tally: Arc::new(responder::ResponderTally::default()),
            responder_handle: tokio::sync::Mutex::new(None),
        }
    }
}
