//! End-to-end pipeline tests: audio-thread pushes in, worker thread analyses,
//! spectra read back from the test thread.

mod helpers;

use approx::assert_relative_eq;
use helpers::tolerances::*;
use helpers::*;
use prism::prelude::*;
use std::time::Duration;

#[test]
fn test_sine_peaks_at_its_frequency() {
    init_tracing();
    let (pipeline, mut input) = test_pipeline();
    let fft_size = pipeline.config().fft_size();

    let frequency = 1000.0;
    let amplitude = 0.5;
    let samples = generate_sine(frequency, amplitude, TEST_SAMPLE_RATE, 2 * 48000);
    feed_paced(&pipeline, &mut input, &samples);

    assert!(wait_for_frames(&pipeline, expected_frames(samples.len(), fft_size)));
    assert_eq!(pipeline.overrun_count(), 0);

    let live = pipeline.spectrum().live_snapshot();
    let peak_bin = argmax(&live);
    let exact_bin = (frequency * fft_size as f64 / TEST_SAMPLE_RATE) as f32;
    assert!(
        (peak_bin as f32 - exact_bin).abs() <= BIN_TOLERANCE,
        "Expected peak near bin {}, got {}",
        exact_bin,
        peak_bin
    );

    // Mean-one window: a tone's bin reads amplitude * N / 2. The live value
    // may sit one release step below on alternate frames, the peak does not.
    let expected_db = to_db(amplitude * fft_size as f32 / 2.0);
    let measured_db = to_db(pipeline.spectrum().peak_snapshot()[peak_bin]);
    assert!(
        (measured_db - expected_db).abs() <= LEVEL_TOLERANCE_DB,
        "Expected {:.1} dB, measured {:.1} dB",
        expected_db,
        measured_db
    );

    let frequency_of_peak = pipeline.spectrum().bin_frequency(peak_bin);
    assert!((frequency_of_peak - frequency).abs() <= TEST_SAMPLE_RATE / fft_size as f64);

    assert!(pipeline.take_max_changed_flag());
    assert!(!pipeline.take_max_changed_flag());
}

#[test]
fn test_silence_keeps_spectra_at_zero() {
    let (pipeline, mut input) = test_pipeline();
    let fft_size = pipeline.config().fft_size();

    let samples = generate_silence(48000);
    feed_paced(&pipeline, &mut input, &samples);
    assert!(wait_for_frames(&pipeline, expected_frames(samples.len(), fft_size)));

    let mut live = vec![1.0; pipeline.num_bins()];
    let mut peak = vec![1.0; pipeline.num_bins()];
    pipeline.copy_live(&mut live).unwrap();
    pipeline.copy_peak(&mut peak).unwrap();
    assert!(live.iter().all(|&m| m == 0.0));
    assert!(peak.iter().all(|&m| m == 0.0));
    assert!(!pipeline.take_max_changed_flag());
}

#[test]
fn test_live_decays_and_peak_holds_after_tone_stops() {
    let (pipeline, mut input) = test_pipeline();
    let fft_size = pipeline.config().fft_size();

    // 3 kHz completes a whole number of cycles per frame, so repeating one
    // frame gives every frame identical magnitudes.
    let period = generate_sine(3000.0, 0.8, TEST_SAMPLE_RATE, fft_size);
    let tone: Vec<f32> = period.iter().copied().cycle().take(24 * fft_size).collect();
    feed_paced(&pipeline, &mut input, &tone);
    let mut pushed = tone.len();
    assert!(wait_for_frames(&pipeline, expected_frames(pushed, fft_size)));

    let live_before = pipeline.spectrum().live_snapshot();
    let peak_before = pipeline.spectrum().peak_snapshot();
    let bin = argmax(&live_before);
    assert!(pipeline.take_max_changed_flag());

    let silence = generate_silence(48000);
    feed_paced(&pipeline, &mut input, &silence);
    pushed += silence.len();
    assert!(wait_for_frames(&pipeline, expected_frames(pushed, fft_size)));

    let live_after = pipeline.spectrum().live_snapshot();
    assert!(live_after[bin] < live_before[bin]);
    assert!(live_after.iter().zip(&live_before).all(|(a, b)| a <= b));
    assert_eq!(pipeline.spectrum().peak_snapshot(), peak_before);
    assert!(!pipeline.take_max_changed_flag());

    pipeline.reset_peak();
    assert!(pipeline.spectrum().peak_snapshot().iter().all(|&m| m == 0.0));
    assert!(!pipeline.take_max_changed_flag());
}

#[test]
fn test_stereo_and_planar_match_mono() {
    let small = || {
        SpectrumPipeline::builder(TEST_SAMPLE_RATE)
            .fft_order(10)
            .build()
            .unwrap()
    };
    // Three frames' worth, all within one FIFO's capacity.
    let tone = generate_sine(440.0, 0.5, TEST_SAMPLE_RATE, 3 * 1024 + 1);

    let (mono_pipeline, mut mono_input) = small();
    mono_input.push_mono(&tone);
    assert!(wait_for_frames(&mono_pipeline, 3));
    let from_mono = mono_pipeline.spectrum().peak_snapshot();

    let (stereo_pipeline, mut stereo_input) = small();
    stereo_input.push_interleaved(&to_stereo(&tone), 2).unwrap();
    assert!(wait_for_frames(&stereo_pipeline, 3));
    let from_stereo = stereo_pipeline.spectrum().peak_snapshot();

    let (planar_pipeline, mut planar_input) = small();
    planar_input.push_planar(&[&tone[..], &tone[..]]).unwrap();
    assert!(wait_for_frames(&planar_pipeline, 3));
    let from_planar = planar_pipeline.spectrum().peak_snapshot();

    for ((m, s), p) in from_mono.iter().zip(&from_stereo).zip(&from_planar) {
        assert_relative_eq!(*m, *s, epsilon = FLOAT_EPSILON);
        assert_relative_eq!(*m, *p, epsilon = FLOAT_EPSILON);
    }
}

#[test]
fn test_burst_overruns_without_crashing() {
    init_tracing();
    let (pipeline, mut input) = test_pipeline();

    // Far more than the FIFO holds, in a single callback.
    input.push_mono(&generate_sine(500.0, 0.5, TEST_SAMPLE_RATE, 100_000));

    assert!(wait_for_frames(&pipeline, 1));
    assert!(wait_for_drain(&pipeline));
    assert_eq!(pipeline.buffered(), 0);
    // Only the newest capacity - 1 samples were readable.
    let capacity = pipeline.config().ring_capacity as u64;
    assert_eq!(pipeline.overrun_count(), 100_000 - (capacity - 1));
}

#[test]
fn test_sample_rate_change_reaches_worker() {
    let (pipeline, input) = test_pipeline();
    let decay_before = pipeline.spectrum().decay_rate();
    let bin_before = pipeline.spectrum().bin_frequency(10);

    input.set_sample_rate(96000.0).unwrap();
    assert_eq!(pipeline.sample_rate(), 96000.0);
    assert_relative_eq!(pipeline.spectrum().bin_frequency(10), bin_before * 2.0);
    assert!(pipeline.spectrum().decay_rate() > decay_before);

    assert!(input.set_sample_rate(f64::NAN).is_err());
    assert_eq!(input.sample_rate(), 96000.0);
}

#[test]
fn test_shutdown_is_idempotent() {
    let (mut pipeline, mut input) = test_pipeline();
    assert_ne!(pipeline.worker_state(), WorkerState::Stopped);

    pipeline.shutdown().unwrap();
    assert_eq!(pipeline.worker_state(), WorkerState::Stopped);
    pipeline.shutdown().unwrap();

    // Producer side stays usable; nothing drains it any more.
    input.push_mono(&[0.5; 64]);
    assert_eq!(pipeline.buffered(), 64);
    assert_eq!(pipeline.num_bins(), 1024);
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let cases = [
        SpectrumPipeline::builder(0.0),
        SpectrumPipeline::builder(44100.0).fft_order(3),
        SpectrumPipeline::builder(44100.0).fft_order(17),
        SpectrumPipeline::builder(44100.0).ring_capacity(3000),
        SpectrumPipeline::builder(44100.0).window_capacity(4096),
        SpectrumPipeline::builder(44100.0).hop_size(0),
        SpectrumPipeline::builder(44100.0).hop_size(4096),
        SpectrumPipeline::builder(44100.0).decay_db_per_second(6.0),
        SpectrumPipeline::builder(44100.0).shutdown_timeout(Duration::ZERO),
        SpectrumPipeline::builder(44100.0)
            .idle_sleep(Duration::from_millis(500))
            .shutdown_timeout(Duration::from_millis(100)),
    ];
    for builder in cases {
        assert!(matches!(builder.build(), Err(Error::Core(_))));
    }

    assert!(matches!(
        SpectrumPipeline::builder(-1.0).build(),
        Err(Error::Core(prism::core::Error::InvalidSampleRate(_)))
    ));
    assert!(matches!(
        SpectrumPipeline::builder(44100.0).fft_order(20).build(),
        Err(Error::Core(prism::core::Error::InvalidFftOrder(20)))
    ));
}

#[test]
fn test_caller_errors_are_reported() {
    let (pipeline, mut input) = test_pipeline();

    assert!(matches!(
        input.push_interleaved(&[0.0; 8], 0),
        Err(Error::Core(prism::core::Error::InvalidChannelCount(0)))
    ));
    assert!(input.push_interleaved(&[0.0; 7], 2).is_err());

    let mut short = vec![0.0; pipeline.num_bins() - 1];
    assert!(matches!(
        pipeline.copy_live(&mut short),
        Err(Error::Core(prism::core::Error::BufferSizeMismatch { .. }))
    ));
}

#[test]
fn test_overlapping_hop_produces_more_frames() {
    let (pipeline, mut input) = SpectrumPipeline::builder(TEST_SAMPLE_RATE)
        .fft_order(10)
        .hop_size(256)
        .build()
        .unwrap();

    // Frames start every 256 samples while more than 1024 remain unread.
    input.push_mono(&generate_sine(1000.0, 0.5, TEST_SAMPLE_RATE, 2048));
    assert!(wait_for_frames(&pipeline, 4));
    assert!(wait_for_drain(&pipeline));
    std::thread::sleep(Duration::from_millis(20));
    assert_eq!(pipeline.spectrum().frames_analyzed(), 4);
}
