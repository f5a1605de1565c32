//! Test helpers and fixtures for prism integration tests
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations
//! - `LEVEL_TOLERANCE_DB` (2 dB): Measured bin level vs theory
//! - `BIN_TOLERANCE` (1 bin): Peak location vs tone frequency

#![allow(dead_code)]

pub mod tolerances;

use prism::prelude::*;
use std::time::{Duration, Instant};

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Host block size used when feeding the pipeline
pub const TEST_BLOCK_SIZE: usize = 512;

/// Upper bound on how long a test waits for the worker.
pub const WORKER_TIMEOUT: Duration = Duration::from_secs(10);

/// Surface worker logs in failing tests. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Create a pipeline with default settings at the test sample rate.
pub fn test_pipeline() -> (SpectrumPipeline, PipelineInput) {
    SpectrumPipeline::builder(TEST_SAMPLE_RATE)
        .build()
        .expect("Failed to create test pipeline")
}

/// Generate a sine wave at `frequency` with peak `amplitude`.
pub fn generate_sine(frequency: f64, amplitude: f32, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin() as f32
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Duplicate a mono signal into interleaved stereo.
pub fn to_stereo(mono: &[f32]) -> Vec<f32> {
    mono.iter().flat_map(|&s| [s, s]).collect()
}

/// Push `mono` in host-sized blocks, waiting whenever the FIFO is half full
/// so the worker never falls behind far enough to overrun.
pub fn feed_paced(pipeline: &SpectrumPipeline, input: &mut PipelineInput, mono: &[f32]) {
    let high_water = pipeline.config().ring_capacity / 2;
    for block in mono.chunks(TEST_BLOCK_SIZE) {
        let deadline = Instant::now() + WORKER_TIMEOUT;
        while pipeline.buffered() > high_water && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        input.push_mono(block);
    }
}

/// Frames a worker produces from `samples` pushed into a fresh pipeline
/// with hop equal to the frame size.
pub fn expected_frames(samples: usize, fft_size: usize) -> u64 {
    if samples <= fft_size {
        0
    } else {
        ((samples - 1) / fft_size) as u64
    }
}

/// Wait until the worker has analysed `frames` frames in total.
pub fn wait_for_frames(pipeline: &SpectrumPipeline, frames: u64) -> bool {
    let deadline = Instant::now() + WORKER_TIMEOUT;
    while Instant::now() < deadline {
        if pipeline.spectrum().frames_analyzed() >= frames {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

/// Wait until the worker has drained the FIFO.
pub fn wait_for_drain(pipeline: &SpectrumPipeline) -> bool {
    let deadline = Instant::now() + WORKER_TIMEOUT;
    while Instant::now() < deadline {
        if pipeline.buffered() == 0 {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    false
}

/// Index of the largest value.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

pub fn to_db(magnitude: f32) -> f32 {
    20.0 * magnitude.max(1e-12).log10()
}
