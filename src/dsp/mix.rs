//! Stereo cross-mixing and adaptive peak normalization.

/*
Stereo Mixdown
==============

Two mono voices become one stereo pair. Each voice is panned hard to its own
side, but a little of it deliberately leaks into the opposite channel:

    left  = v1 + 0.9 × v2
    right = v2 + 0.9 × v1

With a 0.9 leak the image is only slightly wide; the voices sit close to the
centre while still being separable.


Vocabulary
----------

  peak          Largest absolute channel value observed so far in the run.

  normalize     Scale every sample by 1/peak so the loudest moment maps to
                (almost) full scale.

  headroom      Full scale here is 32760, a hair below i16::MAX (32767), so
                rounding can never wrap.

  release       How a normal compressor/limiter lets gain recover after a loud
                transient. This normalizer has NO release.


Growth-Only Gain Control
------------------------

The peak starts at whatever the caller seeds (1.0 at start-up) and can only go
up:

    Peak
      │          ┌─────────────────────  ← a transient raises the peak
      │    ┌─────┘
      │────┘
      └──────────────────────────────── time

Consequences:

1. Output never clips: the peak check for a sample happens BEFORE that sample
   is quantized, so |channel| / peak ≤ 1 always holds.
2. After an unusually loud moment everything that follows is quieter. There is
   no re-amplification; the level is monotonically conservative.
3. The state is a single number, passed in and handed back on every call
   rather than held globally, so the caller decides what seeds the next block.
*/

use crate::io::StereoFrame;

/// Amount of each voice that bleeds into the opposite channel.
pub const CROSS_LEAK: f32 = 0.9;

/// Quantization full scale, just under `i16::MAX`.
pub const FULL_SCALE: f32 = 32_760.0;

/// Running peak amplitude of the mixdown, with its cached reciprocal.
///
/// Never decreases. Thread the value returned by one fill into the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakLevel {
    amplitude: f32,
    inverse: f32,
}

impl PeakLevel {
    /// Seed value used when playback starts.
    pub const UNITY: PeakLevel = PeakLevel {
        amplitude: 1.0,
        inverse: 1.0,
    };

    /// Seed the normalizer with a positive starting peak.
    pub fn new(amplitude: f32) -> Self {
        debug_assert!(amplitude > 0.0, "peak seed must be positive");
        Self {
            amplitude,
            inverse: 1.0 / amplitude,
        }
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    #[inline]
    pub fn inverse(&self) -> f32 {
        self.inverse
    }

    /// Raise the peak to `|value|` if that is larger. Returns true if it grew.
    #[inline]
    pub fn observe(&mut self, value: f32) -> bool {
        let magnitude = value.abs();
        if magnitude > self.amplitude {
            self.amplitude = magnitude;
            self.inverse = 1.0 / magnitude;
            true
        } else {
            false
        }
    }

    /// Scale a channel value by 1/peak and round to a fixed-point sample.
    #[inline]
    pub fn quantize(&self, value: f32) -> i16 {
        (FULL_SCALE * self.inverse * value).round() as i16
    }
}

impl Default for PeakLevel {
    fn default() -> Self {
        Self::UNITY
    }
}

/// Pan two voices into a leaky stereo pair.
#[inline]
pub fn cross_mix(v1: f32, v2: f32) -> (f32, f32) {
    (v1 + CROSS_LEAK * v2, v2 + CROSS_LEAK * v1)
}

/// Mix one tick: cross-mix, update the peak, then quantize.
#[inline]
pub fn mix_frame(v1: f32, v2: f32, peak: &mut PeakLevel) -> StereoFrame {
    let (left, right) = cross_mix(v1, v2);
    peak.observe(left);
    peak.observe(right);

    StereoFrame {
        left: peak.quantize(left),
        right: peak.quantize(right),
    }
}

/// Fill `out` with normalized frames, pulling one sample from each source per
/// frame. Returns the peak to seed the next call with.
///
/// Sources are pulled in a fixed order (`first`, then `second`) every tick.
pub fn mixdown<A, B>(mut first: A, mut second: B, out: &mut [StereoFrame], peak: PeakLevel) -> PeakLevel
where
    A: FnMut() -> f32,
    B: FnMut() -> f32,
{
    let mut peak = peak;
    for frame in out.iter_mut() {
        let v1 = first();
        let v2 = second();
        *frame = mix_frame(v1, v2, &mut peak);
    }
    peak
}
