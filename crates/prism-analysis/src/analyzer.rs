//! Per-frame transform: window, FFT, magnitudes, ballistics.

use crate::spectrum::SpectrumState;
use crate::window::Window;
use prism_core::WindowKind;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Turns assembled frames into magnitude spectra and folds them into the
/// shared [`SpectrumState`].
///
/// Owned by the analysis worker. Frame size, hop and release rate all come
/// from the state it writes into. All buffers are allocated up front, so
/// [`transform`](Self::transform) never allocates.
pub struct SpectrumAnalyzer {
    state: Arc<SpectrumState>,
    window: Window,
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    magnitudes: Vec<f32>,
    /// Sample rate the current `decay` was computed for.
    sample_rate: f64,
    decay: f32,
}

impl SpectrumAnalyzer {
    pub fn new(window: WindowKind, state: Arc<SpectrumState>) -> Self {
        let fft_size = state.fft_size();
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            window: Window::new(window, fft_size),
            fft,
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch,
            magnitudes: vec![0.0; state.num_bins()],
            sample_rate: state.sample_rate(),
            decay: state.decay_rate(),
            state,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.buffer.len()
    }

    /// Per-frame release factor currently in use.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Magnitudes of the most recent frame, before ballistics.
    pub fn magnitudes(&self) -> &[f32] {
        &self.magnitudes
    }

    /// Analyse one frame. `frame` is windowed in place.
    pub fn transform(&mut self, frame: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.buffer.len());
        self.refresh_decay();

        self.window.apply(frame);
        for (bin, &sample) in self.buffer.iter_mut().zip(frame.iter()) {
            *bin = Complex::new(sample, 0.0);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (magnitude, bin) in self.magnitudes.iter_mut().zip(&self.buffer) {
            *magnitude = bin.norm();
        }

        self.state.apply_ballistics(&self.magnitudes, self.decay);
    }

    fn refresh_decay(&mut self) {
        let sample_rate = self.state.sample_rate();
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.decay = self.state.decay_rate();
            tracing::debug!(sample_rate, decay = self.decay, "Recomputed spectrum decay");
        }
    }
}
