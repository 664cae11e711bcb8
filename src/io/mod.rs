// Purpose - output frame format and the buffer hand-off to the playback side

#[cfg(feature = "rtrb")]
pub mod refill;

/// One interleaved output frame: signed 16-bit left then right.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StereoFrame {
    pub left: i16,
    pub right: i16,
}

impl StereoFrame {
    pub const SILENCE: StereoFrame = StereoFrame { left: 0, right: 0 };

    /// Number of interleaved samples per frame.
    pub const CHANNELS: usize = 2;

    /// Size of one frame in bytes on the wire.
    pub const BYTES: usize = Self::CHANNELS * core::mem::size_of::<i16>();

    #[inline]
    pub fn samples(self) -> [i16; 2] {
        [self.left, self.right]
    }
}

/// Flatten frames into an interleaved `L R L R ...` sample stream.
pub fn interleave(frames: &[StereoFrame]) -> impl Iterator<Item = i16> + '_ {
    frames.iter().flat_map(|frame| frame.samples())
}
