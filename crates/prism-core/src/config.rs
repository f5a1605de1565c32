//! Pipeline configuration.

use crate::{Error, Result};
use core::time::Duration;
use serde::{Deserialize, Serialize};

/// Smallest accepted FFT order (16-point transform).
pub const MIN_FFT_ORDER: u32 = 4;

/// Largest accepted FFT order (65536-point transform).
pub const MAX_FFT_ORDER: u32 = 16;

/// Analysis window applied to each frame before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    #[default]
    Hamming,
    Hann,
    Rectangular,
}

/// Configuration for a spectrum pipeline.
///
/// Everything here is fixed for the lifetime of a pipeline except the
/// sample rate, which can be changed later through the input handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sample rate in Hz (default: 44100.0)
    pub sample_rate: f64,
    /// FFT size exponent, `fft_size = 1 << fft_order` (default: 11, 2048 points)
    pub fft_order: u32,
    /// Sample FIFO capacity, power of two (default: 4096)
    pub ring_capacity: usize,
    /// Rolling staging window owned by the worker (default: 16384)
    pub window_capacity: usize,
    /// Samples between successive frames; `None` means one full frame (default: None)
    pub hop_size: Option<usize>,
    /// Release rate of the live spectrum in dB per second (default: -40.0)
    pub decay_db_per_second: f32,
    /// Analysis window (default: Hamming)
    pub window: WindowKind,
    /// Largest host block the downmixer handles in one chunk (default: 8192)
    pub max_block_size: usize,
    /// Worker sleep when the FIFO is empty, in milliseconds (default: 1)
    pub idle_sleep_ms: u64,
    /// Bounded wait for the worker to stop, in milliseconds (default: 3000)
    pub shutdown_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            fft_order: 11,
            ring_capacity: 4096,
            window_capacity: 16384,
            hop_size: None,
            decay_db_per_second: -40.0,
            window: WindowKind::Hamming,
            max_block_size: 8192,
            idle_sleep_ms: 1,
            shutdown_timeout_ms: 3000,
        }
    }
}

impl PipelineConfig {
    /// Number of samples per analysis frame.
    #[inline]
    pub fn fft_size(&self) -> usize {
        1usize << self.fft_order
    }

    /// Number of magnitude bins produced per frame (`fft_size / 2`).
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.fft_size() / 2
    }

    /// Samples the read cursor advances per frame.
    #[inline]
    pub fn hop(&self) -> usize {
        self.hop_size.unwrap_or_else(|| self.fft_size())
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        validate_sample_rate(self.sample_rate)?;

        if !(MIN_FFT_ORDER..=MAX_FFT_ORDER).contains(&self.fft_order) {
            return Err(Error::InvalidFftOrder(self.fft_order));
        }

        if self.ring_capacity < 2 || !self.ring_capacity.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "ring_capacity {} must be a power of two >= 2",
                self.ring_capacity
            )));
        }

        // Unread staging never exceeds one drained remainder (<= fft_size)
        // plus one FIFO's worth, so this keeps the write cursor off the read cursor.
        let min_window = self.ring_capacity + self.fft_size();
        if self.window_capacity <= min_window {
            return Err(Error::InvalidConfig(format!(
                "window_capacity {} must exceed ring_capacity + fft_size ({})",
                self.window_capacity, min_window
            )));
        }

        let hop = self.hop();
        if hop == 0 || hop > self.fft_size() {
            return Err(Error::InvalidConfig(format!(
                "hop_size {} out of range (1-{})",
                hop,
                self.fft_size()
            )));
        }

        if !self.decay_db_per_second.is_finite() || self.decay_db_per_second > 0.0 {
            return Err(Error::InvalidConfig(format!(
                "decay_db_per_second {} must be finite and <= 0",
                self.decay_db_per_second
            )));
        }

        if self.max_block_size == 0 {
            return Err(Error::InvalidConfig("max_block_size must be non-zero".into()));
        }

        if self.shutdown_timeout_ms == 0 {
            return Err(Error::InvalidConfig("shutdown_timeout_ms must be non-zero".into()));
        }

        // An idle worker only sees the stop signal between sleeps.
        if self.idle_sleep_ms >= self.shutdown_timeout_ms {
            return Err(Error::InvalidConfig(format!(
                "idle_sleep_ms {} must be shorter than shutdown_timeout_ms {}",
                self.idle_sleep_ms, self.shutdown_timeout_ms
            )));
        }

        Ok(())
    }
}

/// Check that a sample rate is usable for analysis.
#[inline]
pub fn validate_sample_rate(sample_rate: f64) -> Result<f64> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(Error::InvalidSampleRate(sample_rate))
    }
}
