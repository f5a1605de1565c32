//! Background analysis thread.
//!
//! Drains the sample FIFO into the frame assembler and transforms every
//! complete frame. Sleeps briefly whenever the FIFO is empty and exits on a
//! cooperative stop signal; shutdown waits for the exit with a bounded timeout.

use crate::analyzer::SpectrumAnalyzer;
use crate::assembler::FrameAssembler;
use crate::spectrum::SpectrumState;
use core::sync::atomic::{AtomicU8, Ordering};
use core::time::Duration;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use prism_core::{AtomicFlag, Error, FifoMonitor, PipelineConfig, Result, SampleConsumer};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

const THREAD_NAME: &str = "prism-analysis";

/// Minimum spacing between overrun warnings.
const OVERRUN_WARN_INTERVAL: Duration = Duration::from_secs(1);

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Waiting for samples.
    Idle = 0,
    /// Ingesting and transforming frames.
    Draining = 1,
    /// Loop has exited.
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Work done by one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainPass {
    pub ingested: usize,
    pub frames: usize,
}

/// One worker's processing state, independent of the thread that runs it.
///
/// [`AnalysisWorker`] drives this in a loop; tests can drive it directly.
pub struct AnalysisLoop {
    consumer: SampleConsumer,
    assembler: FrameAssembler,
    analyzer: SpectrumAnalyzer,
    frame: Vec<f32>,
    monitor: FifoMonitor,
    reported_overruns: u64,
    last_overrun_warning: Option<Instant>,
}

impl AnalysisLoop {
    /// `config` must describe the same frame size and hop as `state`.
    pub fn new(
        consumer: SampleConsumer,
        state: Arc<SpectrumState>,
        config: &PipelineConfig,
    ) -> Result<Self> {
        if config.fft_size() != state.fft_size() {
            return Err(Error::BufferSizeMismatch {
                expected: state.num_bins(),
                actual: config.num_bins(),
            });
        }
        if config.hop() != state.hop() {
            return Err(Error::InvalidConfig(format!(
                "hop {} does not match the spectrum state's hop {}",
                config.hop(),
                state.hop()
            )));
        }

        let fft_size = state.fft_size();
        Ok(Self {
            monitor: consumer.monitor(),
            consumer,
            assembler: FrameAssembler::new(config.window_capacity, fft_size, state.hop()),
            analyzer: SpectrumAnalyzer::new(config.window, state),
            frame: vec![0.0; fft_size],
            reported_overruns: 0,
            last_overrun_warning: None,
        })
    }

    /// Samples waiting in the FIFO.
    #[inline]
    pub fn readable(&self) -> usize {
        self.consumer.readable_count()
    }

    /// Samples staged but not yet consumed by a frame.
    #[inline]
    pub fn unread_distance(&self) -> usize {
        self.assembler.unread_distance()
    }

    /// Ingest `available` samples and transform every complete frame.
    pub fn drain(&mut self, available: usize) -> DrainPass {
        let ingested = self.assembler.ingest(&mut self.consumer, available);

        let mut frames = 0;
        while self.assembler.can_extract() {
            self.assembler.extract_frame(&mut self.frame);
            self.analyzer.transform(&mut self.frame);
            frames += 1;
        }

        tracing::trace!(ingested, frames, "Drain pass");
        self.report_overruns();
        DrainPass { ingested, frames }
    }

    /// Drain whatever is readable right now. Returns `None` if the FIFO was empty.
    pub fn poll(&mut self) -> Option<DrainPass> {
        match self.readable() {
            0 => None,
            available => Some(self.drain(available)),
        }
    }

    fn report_overruns(&mut self) {
        let total = self.monitor.overrun_count();
        if total == self.reported_overruns {
            return;
        }
        let due = self
            .last_overrun_warning
            .map_or(true, |at| at.elapsed() >= OVERRUN_WARN_INTERVAL);
        if due {
            tracing::warn!(
                lost = total - self.reported_overruns,
                total,
                "Sample FIFO overrun, oldest samples dropped"
            );
            self.reported_overruns = total;
            self.last_overrun_warning = Some(Instant::now());
        }
    }
}

struct WorkerShared {
    stop: AtomicFlag,
    state: AtomicU8,
}

impl WorkerShared {
    fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Handle to the running analysis thread.
///
/// Dropping the handle shuts the thread down.
pub struct AnalysisWorker {
    shared: Arc<WorkerShared>,
    handle: Option<JoinHandle<()>>,
    exited: Receiver<()>,
    shutdown_timeout: Duration,
}

impl AnalysisWorker {
    /// Spawn the analysis thread.
    pub fn spawn(
        consumer: SampleConsumer,
        state: Arc<SpectrumState>,
        config: &PipelineConfig,
    ) -> Result<Self> {
        let analysis = AnalysisLoop::new(consumer, state, config)?;
        let shared = Arc::new(WorkerShared {
            stop: AtomicFlag::new(false),
            state: AtomicU8::new(WorkerState::Idle as u8),
        });
        let (exit_tx, exit_rx) = crossbeam_channel::bounded(1);
        let idle_sleep = config.idle_sleep();

        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                run(analysis, &thread_shared, idle_sleep);
                let _ = exit_tx.send(());
            })?;

        tracing::debug!(
            fft_size = config.fft_size(),
            hop = config.hop(),
            "Spawned analysis worker"
        );

        Ok(Self {
            shared,
            handle: Some(handle),
            exited: exit_rx,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some() && self.state() != WorkerState::Stopped
    }

    /// Ask the loop to exit after its current pass, without waiting.
    pub fn stop(&self) {
        self.shared.stop.set(true);
    }

    /// Stop the thread and wait for it to exit.
    ///
    /// Waits at most the configured shutdown timeout. Once the thread has been
    /// joined, further calls are no-ops. After [`Error::WorkerStalled`] the
    /// handle is kept, so calling again waits once more; dropping the worker
    /// at that point detaches the thread.
    pub fn shutdown(&mut self) -> Result<()> {
        self.stop();
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        match self.exited.recv_timeout(self.shutdown_timeout) {
            // Disconnected means the thread unwound without signalling.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                handle.join().map_err(|_| Error::WorkerPanicked)?;
                tracing::debug!("Analysis worker joined");
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                self.handle = Some(handle);
                Err(Error::WorkerStalled {
                    timeout: self.shutdown_timeout,
                })
            }
        }
    }
}

impl Drop for AnalysisWorker {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("Analysis worker shutdown failed: {}", e);
        }
    }
}

fn run(mut analysis: AnalysisLoop, shared: &WorkerShared, idle_sleep: Duration) {
    tracing::debug!("Analysis worker started");

    while !shared.stop.get() {
        let available = analysis.readable();
        if available == 0 {
            shared.set_state(WorkerState::Idle);
            std::thread::sleep(idle_sleep);
            continue;
        }

        shared.set_state(WorkerState::Draining);
        analysis.drain(available);
    }

    shared.set_state(WorkerState::Stopped);
    tracing::debug!("Analysis worker stopped");
}
