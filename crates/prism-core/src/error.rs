//! Error types for prism-core.

use core::time::Duration;
use thiserror::Error;

/// Error type for prism-core operations.
///
/// Variants that can be produced on the audio thread carry only `Copy`
/// payloads, so building them never allocates.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid sample rate: {0}. Must be finite and greater than zero")]
    InvalidSampleRate(f64),

    #[error("Invalid FFT order: {0}. Must be between {min} and {max}", min = crate::config::MIN_FFT_ORDER, max = crate::config::MAX_FFT_ORDER)]
    InvalidFftOrder(u32),

    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(usize),

    #[error("Buffer size mismatch: expected {expected} values, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Analysis worker did not stop within {timeout:?}")]
    WorkerStalled { timeout: Duration },

    #[error("Analysis worker panicked")]
    WorkerPanicked,

    #[error("Failed to spawn analysis worker")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
