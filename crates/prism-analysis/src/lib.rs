//! Live spectrum analysis for a mono sample stream.
//!
//! Samples pushed into a [`prism_core::RingBuffer`] on the audio thread are
//! drained by an [`AnalysisWorker`] on its own thread, framed by a
//! [`FrameAssembler`], windowed and transformed by a [`SpectrumAnalyzer`], and
//! folded into the live and peak spectra held by a shared [`SpectrumState`].
//!
//! # Example
//!
//! ```
//! use prism_analysis::{AnalysisLoop, SpectrumState};
//! use prism_core::{PipelineConfig, RingBuffer};
//! use std::sync::Arc;
//!
//! let config = PipelineConfig { fft_order: 8, ..Default::default() };
//! let state = Arc::new(SpectrumState::new(
//!     config.fft_size(),
//!     config.hop(),
//!     config.sample_rate,
//!     config.decay_db_per_second,
//! )?);
//! let (mut producer, consumer) = RingBuffer::new(config.ring_capacity)?;
//! let mut analysis = AnalysisLoop::new(consumer, state.clone(), &config)?;
//!
//! producer.push(&[0.25; 1024]);
//! analysis.poll();
//! assert_eq!(state.frames_analyzed(), 3);
//! assert_eq!(state.live_snapshot().len(), 128);
//! # Ok::<(), prism_core::Error>(())
//! ```

pub mod analyzer;
pub mod assembler;
pub mod display;
pub mod spectrum;
pub mod window;
pub mod worker;

pub use analyzer::SpectrumAnalyzer;
pub use assembler::FrameAssembler;
pub use display::{render_curve, DisplayParams};
pub use spectrum::{decay_rate, SpectrumState};
pub use window::Window;
pub use worker::{AnalysisLoop, AnalysisWorker, DrainPass, WorkerState};
