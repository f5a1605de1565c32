//! Real-time safe building blocks for live spectrum analysis.
//!
//! # Primary API
//!
//! - [`RingBuffer`]: lock-free SPSC sample FIFO, split into
//!   [`SampleProducer`] (audio thread) and [`SampleConsumer`] (analysis worker)
//! - [`Downmixer`]: sums host channels into the mono stream the FIFO carries
//! - [`PipelineConfig`]: sizes and rates shared by every pipeline stage
//! - [`AtomicFlag`], [`AtomicDouble`], [`AtomicCounter`]: cache-line aligned atomics
//!
//! # Example
//!
//! ```
//! use prism_core::{Downmixer, RingBuffer};
//!
//! let (mut producer, mut consumer) = RingBuffer::new(4096)?;
//! let mut mixer = Downmixer::new(512);
//!
//! // Audio callback: stereo block in, mono samples out.
//! mixer.process_interleaved(&[0.5, 0.5, 0.25, 0.25], 2, &mut producer)?;
//!
//! // Analysis thread.
//! let mut buf = [0.0f32; 2];
//! assert_eq!(consumer.pop(&mut buf), 2);
//! assert_eq!(buf, [0.5, 0.25]);
//! # Ok::<(), prism_core::Error>(())
//! ```

pub mod config;
pub mod downmix;
pub mod error;
pub mod fifo;
pub mod lockfree;

pub use config::{validate_sample_rate, PipelineConfig, WindowKind, MAX_FFT_ORDER, MIN_FFT_ORDER};
pub use downmix::Downmixer;
pub use error::{Error, Result};
pub use fifo::{FifoMonitor, RingBuffer, SampleConsumer, SampleProducer};
pub use lockfree::{AtomicCounter, AtomicDouble, AtomicFlag};
