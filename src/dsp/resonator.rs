//! Karplus-Strong string resonator.

/*
Plucked-String Synthesis
========================

A plucked string is modelled as a short loop of samples (the "delay line")
that is read and rewritten once per output tick. Its length in samples sets
the pitch: a loop of L samples repeats every L ticks, so it sounds at
sample_rate / L Hz.

Vocabulary
----------

  delay line    The circular buffer holding one period of the string's motion.

  excitation    The noise burst injected on pluck. It is generated once per
                string, smoothed and zero-meaned, then reused for every pluck
                so a string always has the same "voice".

  loop gain     Attenuation applied each time a sample travels round the loop.
                Close to 1.0 the string rings for seconds; lower values damp it.

  pluck         Inject the excitation and restore the full sustain gain.

  mute          Drop the loop gain so the string dies away quickly.


The Loop
--------

Each tick:

    out          = buffer[cur]
    buffer[cur]  = gain × (0.95 × buffer[cur] + 0.05 × buffer[cur + 1])
    cur          = cur + 1  (wrapping)

The weighted average of two neighbours is a gentle lowpass: high partials lose
energy faster than the fundamental, which is what makes the tone mellow out as
it decays.


Tuning Error
------------

The loop length is a whole number of samples, so pitch is quantized:

    length = floor(sample_rate / frequency)

At 44.1kHz a string near 440Hz is 100 samples long and one sample of error is
~1%. Higher strings are shorter and the relative error grows. No fractional
delay is used; the detuning is part of the instrument's character.


Excitation Shaping
------------------

White noise is harsh. Three passes of a circular two-tap moving average

    x[i] = 0.5 × (x[i] + x[i-1])      for i ≥ 1
    x[0] = 0.5 × (x[0] + x[len-1])

take the edge off, and subtracting the mean removes any DC offset that would
otherwise ride along in the loop forever.
*/

use rand::Rng;

use crate::REFERENCE_FREQUENCY;

/// Number of moving-average passes applied to the excitation noise.
const EXCITATION_SMOOTHING_PASSES: usize = 3;

/// Sustain gain ceiling for very high strings.
const MAX_INITIAL_GAIN: f32 = 0.99999;

/// Longest delay line a string may use, in samples.
pub const MAX_LOOP_LENGTH: usize = u16::MAX as usize;

/// Fraction of a still-ringing loop kept when the string is plucked again.
const RETRIGGER_CARRY: f32 = 0.6;

/// A single delay-line string.
#[derive(Debug, Clone)]
pub struct Resonator {
    buffer: Vec<f32>,
    excitation: Vec<f32>,
    position: usize,
    frequency: f32,
    initial_gain: f32,
    loop_gain: f32,
}

impl Resonator {
    /// Tune a string `pitch_offset` semitones away from the 441Hz reference.
    ///
    /// The excitation noise is drawn from `rng`; pass a seeded generator for
    /// reproducible output. The string is silent until its first pluck.
    ///
    /// The derived loop length must lie within `1..=MAX_LOOP_LENGTH`, i.e.
    /// the pitch must be below `sample_rate` and not absurdly low. This is not checked in release builds; validate
    /// configuration with [`crate::patch::PieceConfig::validate`] first.
    pub fn new<R: Rng + ?Sized>(pitch_offset: f32, sample_rate: f32, rng: &mut R) -> Self {
        let frequency = REFERENCE_FREQUENCY * 2.0_f32.powf(pitch_offset / 12.0);
        let length = loop_length(frequency, sample_rate);
        debug_assert!(
            (1..=MAX_LOOP_LENGTH).contains(&length),
            "string at {frequency}Hz does not fit at {sample_rate}Hz"
        );

        let mut excitation: Vec<f32> = (0..length).map(|_| rng.gen_range(-1.0..=1.0)).collect();
        for _ in 0..EXCITATION_SMOOTHING_PASSES {
            circular_lowpass(&mut excitation);
        }
        remove_dc(&mut excitation);

        Self {
            buffer: vec![0.0; length],
            excitation,
            position: 0,
            frequency,
            initial_gain: initial_gain(frequency),
            loop_gain: 0.0,
        }
    }

    /// Build a string around an explicit excitation template.
    ///
    /// The loop length is the template length; the template is used verbatim.
    /// It must not be empty: the first `sample()` on an empty string panics.
    pub fn with_excitation(excitation: Vec<f32>, initial_gain: f32) -> Self {
        debug_assert!(!excitation.is_empty());

        Self {
            buffer: vec![0.0; excitation.len()],
            frequency: 0.0,
            excitation,
            position: 0,
            initial_gain,
            loop_gain: 0.0,
        }
    }

    /// Excite the string and restore full sustain.
    ///
    /// Whatever is still ringing is scaled down and the excitation added on
    /// top of it, so rapid re-plucks blend instead of cutting off.
    pub fn pluck(&mut self) {
        self.loop_gain = self.initial_gain;
        for (cell, &excite) in self.buffer.iter_mut().zip(self.excitation.iter()) {
            *cell = RETRIGGER_CARRY * *cell + excite;
        }
    }

    /// Damp the string. Higher strings keep slightly more of their sustain.
    pub fn mute(&mut self) {
        self.loop_gain = 0.955 + self.initial_gain - 0.995;
    }

    /// Advance the loop by one tick, returning the sample under the cursor
    /// before it is rewritten.
    #[inline]
    pub fn sample(&mut self) -> f32 {
        let current = self.position;
        let next = if current + 1 < self.buffer.len() { current + 1 } else { 0 };

        let out = self.buffer[current];
        self.buffer[current] = self.loop_gain * (0.95 * out + 0.05 * self.buffer[next]);
        self.position = next;

        out
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.sample();
        }
    }

    /// Loop length in samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Requested (unquantized) pitch in Hz; `0.0` for custom excitations.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn initial_gain(&self) -> f32 {
        self.initial_gain
    }

    pub fn loop_gain(&self) -> f32 {
        self.loop_gain
    }

    /// Index of the next cell `sample()` will read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Current delay-line contents.
    pub fn buffer(&self) -> &[f32] {
        &self.buffer
    }

    /// The shaped noise burst injected on every pluck.
    pub fn excitation(&self) -> &[f32] {
        &self.excitation
    }
}

/// Delay-line length for a pitch, truncated to whole samples.
#[inline]
pub fn loop_length(frequency: f32, sample_rate: f32) -> usize {
    (sample_rate / frequency) as usize
}

/// Per-string sustain: higher strings lose less per pass so they ring for a
/// comparable time despite cycling more often.
#[inline]
pub fn initial_gain(frequency: f32) -> f32 {
    (0.995 + frequency * 0.000005).min(MAX_INITIAL_GAIN)
}

/// One pass of the circular two-tap moving average, in place.
fn circular_lowpass(buffer: &mut [f32]) {
    let len = buffer.len();
    if len == 0 {
        return;
    }
    for i in 1..len {
        buffer[i] = 0.5 * (buffer[i] + buffer[i - 1]);
    }
    // x[0] pairs with the freshly smoothed last cell
    buffer[0] = 0.5 * (buffer[0] + buffer[len - 1]);
}

/// Subtract the mean so the loop carries no DC.
fn remove_dc(buffer: &mut [f32]) {
    if buffer.is_empty() {
        return;
    }
    let mean = buffer.iter().sum::<f32>() / buffer.len() as f32;
    for sample in buffer.iter_mut() {
        *sample -= mean;
    }
}
