//! Single-producer single-consumer sample FIFO.
//!
//! The audio callback pushes through [`SampleProducer`], the analysis worker
//! pops through [`SampleConsumer`]. Neither side blocks, allocates or fails:
//!
//! - the producer only advances the write cursor and never looks at the
//!   read cursor, so a slow consumer cannot stall it;
//! - when the producer laps the consumer, the oldest unread samples are
//!   overwritten and the consumer skips past them on its next pop;
//! - at most `capacity - 1` samples are ever readable.
//!
//! Cursors are monotonic `u64` sample counts, reduced modulo the capacity
//! only when indexing a slot. Slots are atomic floats so an overwrite racing
//! a read is well defined; the consumer re-checks the producer's claim
//! cursor after copying and drops whatever was lapped mid-copy.

use crate::lockfree::AtomicCounter;
use crate::{Error, Result};
use atomic_float::AtomicF32;
use core::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

struct Shared {
    slots: Box<[AtomicF32]>,
    mask: usize,
    /// End of the block the producer is currently writing (or last wrote).
    claimed: AtomicU64,
    /// End of the last fully published block.
    written: AtomicU64,
    /// Consumer position. Stored only by the consumer.
    read: AtomicU64,
    /// Samples overwritten before the consumer reached them.
    overruns: AtomicCounter,
}

impl Shared {
    #[inline]
    fn capacity(&self) -> u64 {
        self.slots.len() as u64
    }

    #[inline]
    fn slot(&self, index: u64) -> &AtomicF32 {
        &self.slots[index as usize & self.mask]
    }
}

/// Constructor for a split sample FIFO.
pub struct RingBuffer;

impl RingBuffer {
    /// Allocate a FIFO with `capacity` slots and split it into its two ends.
    ///
    /// `capacity` must be a power of two and at least 2. One slot is kept
    /// free, so `capacity - 1` samples can be buffered.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(capacity: usize) -> Result<(SampleProducer, SampleConsumer)> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "FIFO capacity {} must be a power of two >= 2",
                capacity
            )));
        }

        let slots: Box<[AtomicF32]> = (0..capacity).map(|_| AtomicF32::new(0.0)).collect();
        let shared = Arc::new(Shared {
            slots,
            mask: capacity - 1,
            claimed: AtomicU64::new(0),
            written: AtomicU64::new(0),
            read: AtomicU64::new(0),
            overruns: AtomicCounter::new(),
        });

        Ok((
            SampleProducer {
                shared: Arc::clone(&shared),
                write: 0,
            },
            SampleConsumer { shared, read: 0 },
        ))
    }
}

/// Write end of the FIFO. Owned by the real-time producer.
pub struct SampleProducer {
    shared: Arc<Shared>,
    write: u64,
}

impl SampleProducer {
    /// Append samples, overwriting the oldest unread data if the consumer
    /// has fallen behind.
    ///
    /// RT-safe: no locks, no allocation, no failure. A block longer than the
    /// capacity is accepted; only its newest samples can survive.
    #[inline]
    pub fn push(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }

        let capacity = self.shared.slots.len();
        let skip = samples.len().saturating_sub(capacity);
        let start = self.write + skip as u64;
        let end = self.write + samples.len() as u64;

        // Claim before touching slots: a consumer that observes any of the
        // stores below is guaranteed to observe this claim too.
        self.shared.claimed.store(end, Ordering::Relaxed);
        fence(Ordering::Release);

        for (offset, &sample) in samples[skip..].iter().enumerate() {
            self.shared
                .slot(start + offset as u64)
                .store(sample, Ordering::Relaxed);
        }

        self.shared.written.store(end, Ordering::Release);
        self.write = end;
    }

    /// Slot count of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }

    pub fn monitor(&self) -> FifoMonitor {
        FifoMonitor {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read end of the FIFO. Owned by the analysis worker.
pub struct SampleConsumer {
    shared: Arc<Shared>,
    read: u64,
}

impl SampleConsumer {
    /// Number of samples a `pop` can currently return (at most `capacity - 1`).
    #[inline]
    pub fn readable_count(&self) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        let usable = self.shared.capacity() - 1;
        (written - self.read).min(usable) as usize
    }

    /// Copy up to `destination.len()` samples in FIFO order, returning how
    /// many were copied.
    pub fn pop(&mut self, destination: &mut [f32]) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        let capacity = self.shared.capacity();
        let usable = capacity - 1;

        if written - self.read > usable {
            let lost = written - usable - self.read;
            self.shared.overruns.add(lost);
            self.read = written - usable;
        }

        let count = (written - self.read).min(destination.len() as u64) as usize;
        if count == 0 {
            self.shared.read.store(self.read, Ordering::Release);
            return 0;
        }

        for (offset, slot) in destination[..count].iter_mut().enumerate() {
            *slot = self
                .shared
                .slot(self.read + offset as u64)
                .load(Ordering::Relaxed);
        }

        // Anything older than `claimed - capacity` may have been overwritten
        // while we were copying.
        fence(Ordering::Acquire);
        let claimed = self.shared.claimed.load(Ordering::Relaxed);
        let first_valid = claimed.saturating_sub(capacity);

        let lapped = first_valid.saturating_sub(self.read).min(count as u64) as usize;
        if lapped > 0 {
            destination.copy_within(lapped..count, 0);
            self.shared.overruns.add(lapped as u64);
        }

        self.read += count as u64;
        self.shared.read.store(self.read, Ordering::Release);
        count - lapped
    }

    /// Drop everything currently buffered.
    pub fn clear(&mut self) {
        self.read = self.shared.written.load(Ordering::Acquire);
        self.shared.read.store(self.read, Ordering::Release);
    }

    /// Slot count of the underlying buffer.
    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }

    pub fn monitor(&self) -> FifoMonitor {
        FifoMonitor {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Read-only view of FIFO counters, safe to hold on any thread.
#[derive(Clone)]
pub struct FifoMonitor {
    shared: Arc<Shared>,
}

impl FifoMonitor {
    /// Total samples lost to overrun since creation.
    pub fn overrun_count(&self) -> u64 {
        self.shared.overruns.get()
    }

    /// Approximate number of unread samples.
    pub fn buffered(&self) -> usize {
        let written = self.shared.written.load(Ordering::Acquire);
        let read = self.shared.read.load(Ordering::Acquire);
        written
            .saturating_sub(read)
            .min(self.shared.capacity() - 1) as usize
    }

    /// Total samples pushed since creation.
    pub fn total_written(&self) -> u64 {
        self.shared.written.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }
}
