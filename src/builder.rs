//! Builder for configuring and constructing a `SpectrumPipeline`.

use crate::core::{PipelineConfig, WindowKind};
use crate::{PipelineInput, Result, SpectrumPipeline};
use std::time::Duration;

/// Staging window used when the caller does not set one.
const DEFAULT_WINDOW_CAPACITY: usize = 16384;

/// The sample rate is required up front so the decay rate is known before
/// the first frame. Everything else defaults to [`PipelineConfig::default`].
///
/// When no window capacity is given, one large enough for the chosen FIFO and
/// FFT sizes is picked.
///
/// # Example
///
/// ```
/// use prism::prelude::*;
///
/// let (pipeline, _input) = SpectrumPipeline::builder(44100.0)
///     .fft_order(12)
///     .hop_size(1024)
///     .window(WindowKind::Hann)
///     .decay_db_per_second(-60.0)
///     .build()?;
///
/// assert_eq!(pipeline.num_bins(), 2048);
/// # Ok::<(), prism::Error>(())
/// ```
pub struct SpectrumPipelineBuilder {
    config: PipelineConfig,
    window_capacity: Option<usize>,
}

impl SpectrumPipelineBuilder {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            config: PipelineConfig {
                sample_rate,
                ..Default::default()
            },
            window_capacity: None,
        }
    }

    /// Start from a complete configuration, e.g. one loaded from a settings file.
    ///
    /// Its fields are used as given, including `window_capacity`.
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            window_capacity: Some(config.window_capacity),
            config,
        }
    }

    /// `fft_size = 1 << order`. Default: 11 (2048 points)
    pub fn fft_order(mut self, order: u32) -> Self {
        self.config.fft_order = order;
        self
    }

    /// Power of two. Default: 4096
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.config.ring_capacity = capacity;
        self
    }

    pub fn window_capacity(mut self, capacity: usize) -> Self {
        self.window_capacity = Some(capacity);
        self
    }

    /// Default: one full frame (no overlap)
    pub fn hop_size(mut self, hop: usize) -> Self {
        self.config.hop_size = Some(hop);
        self
    }

    /// Default: -40.0
    pub fn decay_db_per_second(mut self, db: f32) -> Self {
        self.config.decay_db_per_second = db;
        self
    }

    /// Default: Hamming
    pub fn window(mut self, kind: WindowKind) -> Self {
        self.config.window = kind;
        self
    }

    /// Default: 8192
    pub fn max_block_size(mut self, frames: usize) -> Self {
        self.config.max_block_size = frames;
        self
    }

    /// Default: 1 ms
    pub fn idle_sleep(mut self, sleep: Duration) -> Self {
        self.config.idle_sleep_ms = sleep.as_millis() as u64;
        self
    }

    /// Default: 3 s
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.shutdown_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// The configuration `build` would use.
    pub fn resolved_config(&self) -> PipelineConfig {
        let mut config = self.config.clone();
        config.window_capacity = self.window_capacity.unwrap_or_else(|| {
            // An out-of-range order is rejected by validation later.
            let fft_size = 1usize.checked_shl(config.fft_order).unwrap_or(0);
            config
                .ring_capacity
                .saturating_add(fft_size)
                .saturating_add(1)
                .checked_next_power_of_two()
                .map_or(DEFAULT_WINDOW_CAPACITY, |needed| needed.max(DEFAULT_WINDOW_CAPACITY))
        });
        config
    }

    /// Validate, allocate and spawn the analysis worker.
    pub fn build(self) -> Result<(SpectrumPipeline, PipelineInput)> {
        SpectrumPipeline::start(self.resolved_config())
    }
}
