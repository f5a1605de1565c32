//! # Live Sine
//!
//! Feed a sweeping stereo sine into a pipeline in real-time sized blocks and
//! print the strongest bin and a coarse text rendering of the spectrum.
//!
//! **Concepts:** Pipeline setup, audio-thread input, reader-side snapshots, display mapping
//!
//! ```bash
//! RUST_LOG=prism_analysis=debug cargo run --example live_sine
//! ```

use prism::prelude::*;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK: usize = 480;
const WIDTH: usize = 64;
const LEVELS: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '@'];

fn main() -> prism::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (mut pipeline, mut input) = SpectrumPipeline::builder(SAMPLE_RATE)
        .fft_order(11)
        .hop_size(1024)
        .build()?;

    // Audio thread: 10 ms blocks of a sine sweeping from 200 Hz to 5 kHz.
    let producer = std::thread::spawn(move || -> prism::Result<()> {
        let mut phase = 0.0f64;
        let mut block = vec![0.0f32; BLOCK * 2];
        for n in 0..300 {
            let frequency = 200.0 * 25f64.powf(n as f64 / 300.0);
            for frame in block.chunks_exact_mut(2) {
                phase += 2.0 * std::f64::consts::PI * frequency / SAMPLE_RATE;
                let s = 0.5 * phase.sin() as f32;
                frame[0] = s;
                frame[1] = s;
            }
            input.push_interleaved(&block, 2)?;
            std::thread::sleep(Duration::from_millis(10));
        }
        Ok(())
    });

    // UI thread: 10 refreshes per second.
    let mut live = vec![0.0; pipeline.num_bins()];
    let mut curve = vec![0.0; WIDTH];
    let params = DisplayParams::default();
    for _ in 0..30 {
        std::thread::sleep(Duration::from_millis(100));
        pipeline.copy_live(&mut live)?;

        let (bin, _) = live
            .iter()
            .enumerate()
            .fold((0, 0.0f32), |best, (i, &m)| if m > best.1 { (i, m) } else { best });

        render_curve(&live, &mut curve, &params);
        let line: String = curve
            .iter()
            .map(|&v| LEVELS[(v * (LEVELS.len() - 1) as f32).round() as usize])
            .collect();
        println!(
            "{:>7.1} Hz |{}|",
            pipeline.spectrum().bin_frequency(bin),
            line
        );

        if pipeline.take_max_changed_flag() {
            pipeline.reset_peak();
        }
    }

    producer.join().expect("producer thread panicked")?;
    println!(
        "frames analysed: {}, samples lost to overrun: {}",
        pipeline.spectrum().frames_analyzed(),
        pipeline.overrun_count()
    );
    pipeline.shutdown()
}
