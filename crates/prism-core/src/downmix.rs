//! Producer-side mono downmix.
//!
//! Sums every input channel into one signal scaled by `1 / channels` and
//! pushes the result into the sample FIFO. Called from the audio callback.

use crate::fifo::SampleProducer;
use crate::{Error, Result};

/// Mixes host blocks down to mono without allocating.
///
/// The scratch buffer is allocated once at construction. Blocks longer than
/// it are processed in several chunks, so any host block size is accepted.
pub struct Downmixer {
    scratch: Vec<f32>,
}

impl Downmixer {
    /// Create a downmixer whose scratch buffer holds `max_block_size` frames.
    pub fn new(max_block_size: usize) -> Self {
        Self {
            scratch: vec![0.0; max_block_size.max(1)],
        }
    }

    /// Frames mixed per chunk.
    pub fn chunk_size(&self) -> usize {
        self.scratch.len()
    }

    /// Downmix interleaved frames (`[L0, R0, L1, R1, ...]` for stereo).
    ///
    /// RT-safe: only touches the pre-allocated scratch buffer.
    pub fn process_interleaved(
        &mut self,
        interleaved: &[f32],
        channels: usize,
        producer: &mut SampleProducer,
    ) -> Result<()> {
        if channels == 0 {
            return Err(Error::InvalidChannelCount(0));
        }
        if interleaved.len() % channels != 0 {
            return Err(Error::BufferSizeMismatch {
                expected: interleaved.len() - interleaved.len() % channels,
                actual: interleaved.len(),
            });
        }
        if channels == 1 {
            producer.push(interleaved);
            return Ok(());
        }

        let gain = 1.0 / channels as f32;
        let chunk_samples = self.scratch.len() * channels;

        for block in interleaved.chunks(chunk_samples) {
            let frames = block.len() / channels;
            let out = &mut self.scratch[..frames];
            for (mono, frame) in out.iter_mut().zip(block.chunks_exact(channels)) {
                *mono = frame.iter().sum::<f32>() * gain;
            }
            producer.push(out);
        }

        Ok(())
    }

    /// Downmix planar channels. Every channel must have the same length.
    pub fn process_planar<C: AsRef<[f32]>>(
        &mut self,
        channels: &[C],
        producer: &mut SampleProducer,
    ) -> Result<()> {
        let Some(first) = channels.first() else {
            return Err(Error::InvalidChannelCount(0));
        };
        let frames = first.as_ref().len();
        if let Some(bad) = channels.iter().find(|c| (*c).as_ref().len() != frames) {
            return Err(Error::BufferSizeMismatch {
                expected: frames,
                actual: bad.as_ref().len(),
            });
        }
        if channels.len() == 1 {
            producer.push(first.as_ref());
            return Ok(());
        }

        let gain = 1.0 / channels.len() as f32;
        let chunk = self.scratch.len();
        let mut start = 0;

        while start < frames {
            let len = chunk.min(frames - start);
            let out = &mut self.scratch[..len];
            out.copy_from_slice(&first.as_ref()[start..start + len]);
            for channel in &channels[1..] {
                for (mono, &s) in out.iter_mut().zip(&channel.as_ref()[start..start + len]) {
                    *mono += s;
                }
            }
            for mono in out.iter_mut() {
                *mono *= gain;
            }
            producer.push(out);
            start += len;
        }

        Ok(())
    }
}
