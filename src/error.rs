use std::collections::TryReserveError;

use thiserror::Error;

/// Failures surfaced by the measurement engine and its byte channel.
///
/// None of these is fatal: every variant leaves the engine exactly as it
/// was before the failing call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A response arrived while no stimulus was pending.
    #[error("response recorded with no pending stimulus")]
    Unarmed,

    /// The response timestamp lies before the pending stimulus.
    #[error("response at {response} ns precedes stimulus at {stimulus} ns")]
    ClockSkew { stimulus: u64, response: u64 },

    /// The rendered report does not fit the destination buffer.
    #[error("report of {needed} bytes does not fit a {available}-byte buffer")]
    OutputTooLarge { needed: usize, available: usize },

    /// The running sum would overflow u64 nanoseconds.
    #[error("running sum overflows with a {duration} ns sample")]
    StatisticsOverflow { duration: u64 },

    /// The sample store could not grow.
    #[error("sample store allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Failures while loading or validating [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Failures while parsing a sample dump (`"<n> ns"` per line).
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("line {line}: expected \"<n> ns\", found {content:?}")]
    Malformed { line: usize, content: String },
}
