//! Shared live and peak spectra.
//!
//! Written once per frame by the analysis worker, read at any cadence by any
//! number of readers. Every access takes the same short-hold lock, so a copy
//! always reflects one complete frame update.

use parking_lot::Mutex;
use prism_core::{validate_sample_rate, AtomicCounter, AtomicDouble, Error, Result};

pub(crate) struct Spectra {
    live: Vec<f32>,
    peak: Vec<f32>,
    max_changed: bool,
}

/// Live (decaying) and peak (held) magnitude spectra behind one lock.
pub struct SpectrumState {
    spectra: Mutex<Spectra>,
    fft_size: usize,
    hop: usize,
    decay_db_per_second: f32,
    sample_rate: AtomicDouble,
    frames: AtomicCounter,
}

impl SpectrumState {
    /// Create zeroed spectra of `fft_size / 2` bins.
    ///
    /// `hop` is the spacing between analysed frames in samples and, together
    /// with the sample rate, turns `decay_db_per_second` into a per-frame factor.
    pub fn new(fft_size: usize, hop: usize, sample_rate: f64, decay_db_per_second: f32) -> Result<Self> {
        validate_sample_rate(sample_rate)?;
        let num_bins = fft_size / 2;
        Ok(Self {
            spectra: Mutex::new(Spectra {
                live: vec![0.0; num_bins],
                peak: vec![0.0; num_bins],
                max_changed: false,
            }),
            fft_size,
            hop,
            decay_db_per_second,
            sample_rate: AtomicDouble::new(sample_rate),
            frames: AtomicCounter::new(),
        })
    }

    /// Number of magnitude bins (`fft_size / 2`). Fixed for the state's lifetime.
    #[inline]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2
    }

    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Samples between analysed frames.
    #[inline]
    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate.get()
    }

    /// Change the sample rate. The worker picks the new decay factor up
    /// before its next frame.
    ///
    /// RT-safe: a single atomic store.
    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        self.sample_rate.set(validate_sample_rate(sample_rate)?);
        Ok(())
    }

    /// Per-frame release multiplier for the current sample rate.
    pub fn decay_rate(&self) -> f32 {
        decay_rate(self.decay_db_per_second, self.hop, self.sample_rate())
    }

    /// Centre frequency of `bin` in Hz.
    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.sample_rate() / self.fft_size as f64
    }

    /// Frames folded into the spectra since creation.
    pub fn frames_analyzed(&self) -> u64 {
        self.frames.get()
    }

    /// Copy the live spectrum. `destination` must be exactly `num_bins()` long.
    pub fn copy_live(&self, destination: &mut [f32]) -> Result<()> {
        self.check_len(destination.len())?;
        destination.copy_from_slice(&self.spectra.lock().live);
        Ok(())
    }

    /// Copy the peak spectrum. `destination` must be exactly `num_bins()` long.
    pub fn copy_peak(&self, destination: &mut [f32]) -> Result<()> {
        self.check_len(destination.len())?;
        destination.copy_from_slice(&self.spectra.lock().peak);
        Ok(())
    }

    /// Allocating copy of the live spectrum, for non-real-time readers.
    pub fn live_snapshot(&self) -> Vec<f32> {
        self.spectra.lock().live.clone()
    }

    /// Allocating copy of the peak spectrum, for non-real-time readers.
    pub fn peak_snapshot(&self) -> Vec<f32> {
        self.spectra.lock().peak.clone()
    }

    /// Read and clear the peak-changed notification.
    pub fn take_max_changed_flag(&self) -> bool {
        core::mem::take(&mut self.spectra.lock().max_changed)
    }

    /// Zero the peak spectrum and re-arm the notification for the next rise.
    pub fn reset_peak(&self) {
        let mut spectra = self.spectra.lock();
        spectra.peak.fill(0.0);
        spectra.max_changed = false;
    }

    /// Fold one frame of magnitudes into the spectra.
    ///
    /// Live bins attack instantly and release by `decay`; peak bins only rise.
    /// Released bins that fall below the normal float range become exactly 0.
    pub(crate) fn apply_ballistics(&self, input: &[f32], decay: f32) {
        debug_assert_eq!(input.len(), self.num_bins());
        let mut guard = self.spectra.lock();
        let spectra = &mut *guard;
        let mut raised = false;

        for ((&magnitude, live), peak) in input
            .iter()
            .zip(spectra.live.iter_mut())
            .zip(spectra.peak.iter_mut())
        {
            if magnitude > *live {
                *live = magnitude;
            } else {
                *live *= decay;
                if *live < f32::MIN_POSITIVE {
                    *live = 0.0;
                }
            }

            if magnitude > *peak {
                *peak = magnitude;
                raised = true;
            }
        }

        spectra.max_changed |= raised;
        drop(guard);
        self.frames.add(1);
    }

    #[cfg(test)]
    pub(crate) fn lock_spectra(&self) -> parking_lot::MutexGuard<'_, Spectra> {
        self.spectra.lock()
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len == self.num_bins() {
            Ok(())
        } else {
            Err(Error::BufferSizeMismatch {
                expected: self.num_bins(),
                actual: len,
            })
        }
    }
}

/// Convert a release rate in dB per second into a linear factor applied
/// once per frame, for frames `frame_spacing` samples apart.
///
/// `10^(db_per_second * frame_spacing / sample_rate / 20)`
pub fn decay_rate(db_per_second: f32, frame_spacing: usize, sample_rate: f64) -> f32 {
    let db_per_frame = db_per_second as f64 * frame_spacing as f64 / sample_rate;
    10f64.powf(db_per_frame / 20.0) as f32
}
