//! SpectrumPipeline: the assembled FIFO, worker and shared spectra.

use crate::analysis::{AnalysisWorker, SpectrumState, WorkerState};
use crate::core::{Downmixer, FifoMonitor, PipelineConfig, RingBuffer, SampleProducer};
use crate::{Result, SpectrumPipelineBuilder};
use std::sync::Arc;

/// A running spectrum analysis pipeline.
///
/// Owns the analysis worker and exposes the reader side of the shared
/// spectra. Samples go in through the [`PipelineInput`] returned alongside it
/// by [`SpectrumPipelineBuilder::build`]. Dropping the pipeline stops the
/// worker.
///
/// # Example
///
/// ```
/// use prism::prelude::*;
///
/// let (pipeline, mut input) = SpectrumPipeline::builder(48000.0)
///     .fft_order(10)
///     .build()?;
///
/// // Audio thread
/// input.push_interleaved(&[0.0; 512], 2)?;
///
/// // UI thread
/// let mut live = vec![0.0; pipeline.num_bins()];
/// pipeline.copy_live(&mut live)?;
/// # Ok::<(), prism::Error>(())
/// ```
pub struct SpectrumPipeline {
    spectrum: Arc<SpectrumState>,
    worker: AnalysisWorker,
    monitor: FifoMonitor,
    config: PipelineConfig,
}

impl SpectrumPipeline {
    /// Start configuring a pipeline for audio at `sample_rate` Hz.
    pub fn builder(sample_rate: f64) -> SpectrumPipelineBuilder {
        SpectrumPipelineBuilder::new(sample_rate)
    }

    /// Validate `config`, allocate every buffer and spawn the worker.
    pub(crate) fn start(config: PipelineConfig) -> Result<(Self, PipelineInput)> {
        config.validate()?;

        let spectrum = Arc::new(SpectrumState::new(
            config.fft_size(),
            config.hop(),
            config.sample_rate,
            config.decay_db_per_second,
        )?);
        let (producer, consumer) = RingBuffer::new(config.ring_capacity)?;
        let monitor = producer.monitor();
        let worker = AnalysisWorker::spawn(consumer, Arc::clone(&spectrum), &config)?;

        tracing::debug!(
            sample_rate = config.sample_rate,
            fft_size = config.fft_size(),
            ring_capacity = config.ring_capacity,
            "Started spectrum pipeline"
        );

        let input = PipelineInput {
            producer,
            mixer: Downmixer::new(config.max_block_size),
            spectrum: Arc::clone(&spectrum),
        };

        Ok((
            Self {
                spectrum,
                worker,
                monitor,
                config,
            },
            input,
        ))
    }

    /// Shared spectra, for readers on other threads.
    pub fn spectrum(&self) -> &Arc<SpectrumState> {
        &self.spectrum
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn num_bins(&self) -> usize {
        self.spectrum.num_bins()
    }

    pub fn copy_live(&self, destination: &mut [f32]) -> Result<()> {
        Ok(self.spectrum.copy_live(destination)?)
    }

    pub fn copy_peak(&self, destination: &mut [f32]) -> Result<()> {
        Ok(self.spectrum.copy_peak(destination)?)
    }

    pub fn take_max_changed_flag(&self) -> bool {
        self.spectrum.take_max_changed_flag()
    }

    pub fn reset_peak(&self) {
        self.spectrum.reset_peak();
    }

    pub fn sample_rate(&self) -> f64 {
        self.spectrum.sample_rate()
    }

    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        Ok(self.spectrum.set_sample_rate(sample_rate)?)
    }

    /// Samples lost to FIFO overrun since the pipeline started.
    pub fn overrun_count(&self) -> u64 {
        self.monitor.overrun_count()
    }

    /// Samples pushed but not yet drained by the worker.
    pub fn buffered(&self) -> usize {
        self.monitor.buffered()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.worker.state()
    }

    /// Stop the worker, waiting at most the configured shutdown timeout.
    ///
    /// The spectra stay readable afterwards. Calling this twice is a no-op.
    pub fn shutdown(&mut self) -> Result<()> {
        Ok(self.worker.shutdown()?)
    }
}

/// Audio-thread handle: downmixes host blocks into the sample FIFO.
///
/// Every method is RT-safe. Pushing never blocks and never allocates; if the
/// worker falls behind, the oldest samples are overwritten.
pub struct PipelineInput {
    producer: SampleProducer,
    mixer: Downmixer,
    spectrum: Arc<SpectrumState>,
}

impl PipelineInput {
    /// Push interleaved frames with `channels` samples each.
    pub fn push_interleaved(&mut self, samples: &[f32], channels: usize) -> Result<()> {
        self.mixer
            .process_interleaved(samples, channels, &mut self.producer)?;
        Ok(())
    }

    /// Push one slice per channel. All slices must have the same length.
    pub fn push_planar<C: AsRef<[f32]>>(&mut self, channels: &[C]) -> Result<()> {
        self.mixer.process_planar(channels, &mut self.producer)?;
        Ok(())
    }

    /// Push an already mono block.
    pub fn push_mono(&mut self, samples: &[f32]) {
        self.producer.push(samples);
    }

    /// Report a host sample rate change. The worker adapts the decay before
    /// its next frame.
    pub fn set_sample_rate(&self, sample_rate: f64) -> Result<()> {
        Ok(self.spectrum.set_sample_rate(sample_rate)?)
    }

    pub fn sample_rate(&self) -> f64 {
        self.spectrum.sample_rate()
    }

    pub fn monitor(&self) -> FifoMonitor {
        self.producer.monitor()
    }
}
