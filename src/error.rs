//! Error types for the pedometer collaborators
//!
//! The per-sample pipeline never fails. Errors only arise when validating
//! settings or restored state, and in the optional log sink.

use thiserror::Error;

/// Errors reported by settings validation, state restore and log sinks
#[derive(Error, Debug)]
pub enum PedometerError {
    #[error("Threshold percent out of range 0..=100: {0}")]
    InvalidThreshold(u8),

    #[error("Invalid low-pass cutoff: {0}")]
    InvalidCutoff(f32),

    #[cfg(feature = "csv")]
    #[error("Log sink error: {0}")]
    Sink(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for fallible pedometer operations
pub type Result<T> = core::result::Result<T, PedometerError>;
