//! The synthesis context: both voices plus the mixdown entry points.
//!
//! All state lives in one [`Engine`] value that the caller owns and hands in
//! by `&mut` for every fill. There are no globals, no locks and no internal
//! threads; the caller must make sure only one context fills at a time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::dsp::mix::{mixdown, PeakLevel};
use crate::dsp::resonator::Resonator;
use crate::io::StereoFrame;
use crate::patch::{ConfigError, PieceConfig, VoiceConfig};
use crate::sequencing::{NoteEvent, StringId, Tempo};
use crate::synth::voice::Voice;

#[cfg(feature = "rtrb")]
use crate::io::refill::{BufferHalf, DoubleBuffer};

pub struct Engine {
    voices: [Voice; 2],
    sample_rate: f32,
    frames_rendered: u64,
}

impl Engine {
    /// Assemble an engine from two prepared voices.
    pub fn new(first: Voice, second: Voice, sample_rate: f32) -> Self {
        Self {
            voices: [first, second],
            sample_rate,
            frames_rendered: 0,
        }
    }

    /// Validate `config` and build both voices from it.
    ///
    /// Strings are tuned in declaration order, first voice then second, all
    /// drawing excitation noise from one generator seeded by `config.seed`.
    pub fn from_config(config: &PieceConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let sample_rate = config.sample_rate;
        let first = build_voice(&config.voices[0], sample_rate, &mut rng);
        let second = build_voice(&config.voices[1], sample_rate, &mut rng);

        debug!(
            sample_rate,
            seed = ?config.seed,
            first_measure = first.measure_samples(),
            second_measure = second.measure_samples(),
            "engine ready"
        );

        Ok(Self::new(first, second, sample_rate))
    }

    /// Render `out.len()` frames.
    ///
    /// `peak` is the value returned by the previous fill (or
    /// [`PeakLevel::UNITY`] for the very first one); the updated peak is
    /// returned for the next call.
    pub fn fill(&mut self, out: &mut [StereoFrame], peak: PeakLevel) -> PeakLevel {
        let [first, second] = &mut self.voices;
        let updated = mixdown(|| first.next_sample(), || second.next_sample(), out, peak);

        if updated.amplitude() > peak.amplitude() {
            debug!(
                from = peak.amplitude(),
                to = updated.amplitude(),
                frame = self.frames_rendered,
                "peak raised"
            );
        }
        self.frames_rendered += out.len() as u64;

        updated
    }

    /// Render exactly one half of a double buffer.
    #[cfg(feature = "rtrb")]
    pub fn refill(&mut self, buffer: &mut DoubleBuffer, half: BufferHalf, peak: PeakLevel) -> PeakLevel {
        self.fill(buffer.half_mut(half), peak)
    }

    pub fn voices(&self) -> &[Voice; 2] {
        &self.voices
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames produced since construction. Keeps counting across measure
    /// wraps; the output stream cannot be rewound.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

fn build_voice<R: Rng + ?Sized>(config: &VoiceConfig, sample_rate: f32, rng: &mut R) -> Voice {
    let strings: Vec<Resonator> = config
        .strings
        .iter()
        .map(|&offset| Resonator::new(offset, sample_rate, rng))
        .collect();

    let notes = config
        .notes
        .iter()
        .map(|note| NoteEvent::new(note.beat, StringId(note.string)))
        .collect();

    let tempo = Tempo::new(config.bpm, config.beats, sample_rate);

    debug!(
        bpm = config.bpm,
        measure_samples = tempo.measure_samples(),
        lengths = ?strings.iter().map(Resonator::len).collect::<Vec<_>>(),
        "voice tuned"
    );

    Voice::new(strings, notes, tempo)
}
