//! # Prism - Live Spectrum Analysis
//!
//! Taps an audio stream on the real-time thread and turns it into a live,
//! decaying magnitude spectrum plus a held peak spectrum that any thread can
//! read at its own cadence.
//!
//! ## Architecture
//!
//! Prism is an umbrella crate that assembles:
//! - **prism-core** - RT-safe primitives (SPSC sample FIFO, downmixer, config, atomics)
//! - **prism-analysis** - Framing, windowed FFT, ballistics, analysis worker, display mapping
//!
//! ```text
//! audio thread                 analysis thread                  readers
//! PipelineInput ──push──> RingBuffer ──> FrameAssembler ──> SpectrumAnalyzer ──> SpectrumState
//!   (downmix)              (overwrite      (rolling window)   (window + FFT +      (live / peak,
//!                           oldest)                            ballistics)          short lock)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use prism::prelude::*;
//!
//! let (pipeline, mut input) = SpectrumPipeline::builder(44100.0).build()?;
//!
//! // In the audio callback
//! input.push_interleaved(&[0.0; 1024], 2)?;
//!
//! // In the UI refresh
//! let mut live = vec![0.0; pipeline.num_bins()];
//! pipeline.copy_live(&mut live)?;
//! if pipeline.take_max_changed_flag() {
//!     let mut peak = vec![0.0; pipeline.num_bins()];
//!     pipeline.copy_peak(&mut peak)?;
//! }
//! # Ok::<(), prism::Error>(())
//! ```

/// Re-export of prism-core for direct access
pub use prism_core as core;

/// Re-export of prism-analysis for direct access
pub use prism_analysis as analysis;

pub use prism_analysis::{
    display, render_curve, AnalysisWorker, DisplayParams, SpectrumState, WorkerState,
};
pub use prism_core::{FifoMonitor, PipelineConfig, WindowKind};

mod builder;
mod error;
mod pipeline;

pub use builder::SpectrumPipelineBuilder;
pub use error::{Error, Result};
pub use pipeline::{PipelineInput, SpectrumPipeline};

/// Convenient imports for hosts.
pub mod prelude {
    pub use crate::{
        render_curve, DisplayParams, Error, PipelineConfig, PipelineInput, Result,
        SpectrumPipeline, SpectrumPipelineBuilder, SpectrumState, WindowKind, WorkerState,
    };
}
