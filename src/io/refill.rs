//! Double-buffer refill hand-off.
//!
//! Playback reads one half of a [`DoubleBuffer`] while the other half is
//! refilled. Whoever drains the buffer posts a [`BufferHalf`] once it has
//! finished with that half; the foreground loop picks the notification up,
//! renders exactly that half and goes back to waiting.
//!
//! The notification travels over a ring buffer with room for a single
//! message, so at most one refill request is ever outstanding. A second
//! notification while one is still pending is an overrun: the foreground fell
//! behind and playback is about to replay stale audio.

use rtrb::{Consumer, Producer, PushError, RingBuffer};

use crate::io::StereoFrame;

/// Which half of the double buffer a refill targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferHalf {
    First,
    Second,
}

impl BufferHalf {
    /// The half playback moves on to after this one.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            BufferHalf::First => BufferHalf::Second,
            BufferHalf::Second => BufferHalf::First,
        }
    }

    #[inline]
    fn index(self) -> usize {
        match self {
            BufferHalf::First => 0,
            BufferHalf::Second => 1,
        }
    }
}

/// Create a connected notifier/listener pair with a single slot.
pub fn refill_channel() -> (RefillNotifier, RefillListener) {
    let (producer, consumer) = RingBuffer::new(1);
    (RefillNotifier { producer }, RefillListener { consumer })
}

/// Playback side of the hand-off.
pub struct RefillNotifier {
    producer: Producer<BufferHalf>,
}

impl RefillNotifier {
    /// Request a refill. Fails with the rejected half if a request is still
    /// pending.
    pub fn notify(&mut self, half: BufferHalf) -> Result<(), BufferHalf> {
        self.producer.push(half).map_err(|PushError::Full(h)| h)
    }

    /// True once the listener has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.producer.is_abandoned()
    }
}

/// Foreground side of the hand-off.
pub struct RefillListener {
    consumer: Consumer<BufferHalf>,
}

impl RefillListener {
    /// Take the pending refill request, if any. Never blocks.
    pub fn poll(&mut self) -> Option<BufferHalf> {
        self.consumer.pop().ok()
    }

    /// True once the notifier has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

/// Frame storage split into two equally sized halves.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    frames: Vec<StereoFrame>,
    half_len: usize,
}

impl DoubleBuffer {
    /// Allocate `half_len` frames per half, zeroed.
    pub fn new(half_len: usize) -> Self {
        Self {
            frames: vec![StereoFrame::SILENCE; half_len * 2],
            half_len,
        }
    }

    /// Frames per half.
    pub fn half_len(&self) -> usize {
        self.half_len
    }

    /// Total frames across both halves.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[StereoFrame] {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut [StereoFrame] {
        &mut self.frames
    }

    pub fn half(&self, half: BufferHalf) -> &[StereoFrame] {
        let start = half.index() * self.half_len;
        &self.frames[start..start + self.half_len]
    }

    pub fn half_mut(&mut self, half: BufferHalf) -> &mut [StereoFrame] {
        let start = half.index() * self.half_len;
        &mut self.frames[start..start + self.half_len]
    }
}

/// Tracks playback progress through a double buffer and reports each half as
/// it is finished with.
#[derive(Debug, Clone)]
pub struct HalfCursor {
    half_len: usize,
    played_in_half: usize,
    current: BufferHalf,
}

impl HalfCursor {
    pub fn new(half_len: usize) -> Self {
        debug_assert!(half_len > 0);
        Self {
            half_len,
            played_in_half: 0,
            current: BufferHalf::First,
        }
    }

    /// The half currently being played.
    pub fn current(&self) -> BufferHalf {
        self.current
    }

    /// Record `frames` frames played; `on_finished` is called for every half
    /// completed along the way, in order.
    pub fn advance(&mut self, frames: usize, mut on_finished: impl FnMut(BufferHalf)) {
        let mut remaining = frames;
        while remaining > 0 {
            let room = self.half_len - self.played_in_half;
            let step = remaining.min(room);
            self.played_in_half += step;
            remaining -= step;

            if self.played_in_half == self.half_len {
                on_finished(self.current);
                self.current = self.current.other();
                self.played_in_half = 0;
            }
        }
    }
}
