/*
 * Receive Ring Buffer
 *
 * Fixed-size circular byte buffer fed by a receive interrupt and drained
 * by foreground reads.
 *
 * Design:
 * - Single producer (the RX interrupt), single consumer (foreground code)
 * - The producer only ever stores `head`, the consumer only ever stores
 *   `tail`; every index update is a single atomic store
 * - Indices count down from the top and wrap back to N-1 when they
 *   would reach 0, so index 0 is never used
 * - head == tail means empty; a push that would make head == tail is
 *   refused and the byte is dropped (no overwrite of unread data)
 * - Usable capacity is N-2 bytes
 *
 * The two halves are handed out once by split(), which is what keeps
 * the one-producer/one-consumer discipline true by construction.
 */

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

/// Receive ring of N slots
pub struct RxRing<const N: usize> {
    buf: [AtomicU8; N],

    /// Slot holding the most recently written byte (producer-owned)
    head: AtomicUsize,

    /// Slot holding the most recently read byte (consumer-owned)
    tail: AtomicUsize,

    split: AtomicBool,
}

impl<const N: usize> RxRing<N> {
    /// Create an empty ring
    pub const fn new() -> Self {
        const { assert!(N >= 3, "ring needs at least one usable slot") };
        Self {
            buf: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(1),
            tail: AtomicUsize::new(1),
            split: AtomicBool::new(false),
        }
    }

    /// Bytes the ring can hold before it reports full
    pub const fn capacity(&self) -> usize {
        N - 2
    }

    /// Hand out the producer and consumer halves
    ///
    /// Succeeds exactly once per ring.
    pub fn split(&self) -> Option<(RxProducer<'_, N>, RxConsumer<'_, N>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((RxProducer { ring: self }, RxConsumer { ring: self }))
    }

    /// Step an index one slot toward 0, wrapping from 1 to N-1
    #[inline(always)]
    fn retreat(index: usize) -> usize {
        if index <= 1 { N - 1 } else { index - 1 }
    }

    fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        // head trails tail downward through the N-1 usable positions
        (tail + (N - 1) - head) % (N - 1)
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write half, owned by the receive interrupt
pub struct RxProducer<'a, const N: usize> {
    ring: &'a RxRing<N>,
}

impl<const N: usize> RxProducer<'_, N> {
    /// Store one byte; false (and no change) if the ring is full
    ///
    /// Interrupt context only.
    #[inline]
    pub fn push(&self, byte: u8) -> bool {
        let ring = self.ring;
        let head = ring.head.load(Ordering::Relaxed);
        let next = RxRing::<N>::retreat(head);
        if next == ring.tail.load(Ordering::Acquire) {
            return false;
        }
        ring.buf[next].store(byte, Ordering::Relaxed);
        ring.head.store(next, Ordering::Release);
        true
    }
}

/// Read half, owned by foreground code
pub struct RxConsumer<'a, const N: usize> {
    ring: &'a RxRing<N>,
}

impl<const N: usize> RxConsumer<'_, N> {
    /// Take the oldest byte, if any
    pub fn pop(&self) -> Option<u8> {
        let ring = self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        if ring.head.load(Ordering::Acquire) == tail {
            return None;
        }
        let next = RxRing::<N>::retreat(tail);
        let byte = ring.buf[next].load(Ordering::Relaxed);
        ring.tail.store(next, Ordering::Release);
        Some(byte)
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Number of unread bytes
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.ring.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Discard everything and return both indices to their start slot
    ///
    /// This is the one place foreground code stores `head`: the receive
    /// interrupt for this ring must be disabled while it runs.
    pub fn reset(&self) {
        self.ring.tail.store(1, Ordering::Release);
        self.ring.head.store(1, Ordering::Release);
    }
}
