//! Rolling staging window between the sample FIFO and the transform.
//!
//! Samples popped from the FIFO land at the write cursor; frames are copied
//! out from the read cursor. Both cursors wrap around the window, and both
//! copies split into two segments when they cross the end.

use prism_core::SampleConsumer;

/// Accumulates FIFO output and hands out contiguous `fft_size` frames.
pub struct FrameAssembler {
    buffer: Vec<f32>,
    write: usize,
    read: usize,
    fft_size: usize,
    hop: usize,
}

impl FrameAssembler {
    /// Create an assembler over a `capacity`-sample window.
    ///
    /// # Panics
    /// If `capacity <= fft_size` or `hop` is outside `1..=fft_size`.
    pub fn new(capacity: usize, fft_size: usize, hop: usize) -> Self {
        assert!(capacity > fft_size, "staging window must be larger than a frame");
        assert!((1..=fft_size).contains(&hop), "hop must be within 1..=fft_size");
        Self {
            buffer: vec![0.0; capacity],
            write: 0,
            read: 0,
            fft_size,
            hop,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Distance from the read cursor to the write cursor, accounting for wrap.
    ///
    /// Equal cursors mean empty: ingestion never fills the last free slot.
    #[inline]
    pub fn unread_distance(&self) -> usize {
        if self.write >= self.read {
            self.write - self.read
        } else {
            self.buffer.len() - self.read + self.write
        }
    }

    /// Samples that can be ingested without overwriting unread data.
    #[inline]
    pub fn free_space(&self) -> usize {
        self.buffer.len() - 1 - self.unread_distance()
    }

    /// Whether [`extract_frame`](Self::extract_frame) may be called.
    #[inline]
    pub fn can_extract(&self) -> bool {
        self.unread_distance() > self.fft_size
    }

    /// Pop up to `available` samples from `consumer` into the window.
    ///
    /// Returns how many samples were staged. Never exceeds the free space.
    pub fn ingest(&mut self, consumer: &mut SampleConsumer, available: usize) -> usize {
        self.stage(available, |dst| consumer.pop(dst))
    }

    /// Stage samples from a slice (offline use and tests).
    pub fn ingest_slice(&mut self, samples: &[f32]) -> usize {
        let mut offset = 0;
        self.stage(samples.len(), |dst| {
            dst.copy_from_slice(&samples[offset..offset + dst.len()]);
            offset += dst.len();
            dst.len()
        })
    }

    fn stage(&mut self, requested: usize, mut fill: impl FnMut(&mut [f32]) -> usize) -> usize {
        let count = requested.min(self.free_space());
        if count == 0 {
            return 0;
        }

        let capacity = self.buffer.len();
        let first = count.min(capacity - self.write);
        let mut staged = fill(&mut self.buffer[self.write..self.write + first]);

        if staged == first && count > first {
            staged += fill(&mut self.buffer[..count - first]);
        }

        self.write = (self.write + staged) % capacity;
        staged
    }

    /// Copy the next `fft_size` samples into `destination` and advance the
    /// read cursor by one hop.
    ///
    /// # Panics
    /// If fewer than `fft_size + 1` samples are staged, or `destination`
    /// is not exactly `fft_size` long. Check [`can_extract`](Self::can_extract) first.
    pub fn extract_frame(&mut self, destination: &mut [f32]) {
        assert!(
            self.can_extract(),
            "extract_frame needs more than {} staged samples, have {}",
            self.fft_size,
            self.unread_distance()
        );
        assert_eq!(destination.len(), self.fft_size);

        let capacity = self.buffer.len();
        let first = self.fft_size.min(capacity - self.read);
        destination[..first].copy_from_slice(&self.buffer[self.read..self.read + first]);
        destination[first..].copy_from_slice(&self.buffer[..self.fft_size - first]);

        self.read = (self.read + self.hop) % capacity;
    }

    /// Discard all staged samples.
    pub fn reset(&mut self) {
        self.write = 0;
        self.read = 0;
    }
}
