//! Piece description: which strings each voice owns, when they are plucked
//! and how fast.
//!
//! [`PieceConfig::default`] is the built-in duet. With the `serde` feature a
//! piece can also be read from TOML:
//!
//! ```toml
//! sample_rate = 44100.0
//! seed = 42
//!
//! [[voices]]
//! bpm = 420.0
//! beats = 12.0
//! strings = [-5.0, -3.0, 2.0]
//! notes = [
//!     { beat = 0.0, string = 0 },
//!     { beat = 1.0, string = 1 },
//!     { beat = 2.0, string = 2 },
//! ]
//! ```

mod error;

pub use error::ConfigError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::resonator::MAX_LOOP_LENGTH;
use crate::sequencing::Tempo;
use crate::REFERENCE_FREQUENCY;

/// Sample rate of the built-in piece.
pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;

/// Tempo of the first voice in the built-in piece.
const DUET_BPM: f32 = 70.0 * 6.0;

/// The second voice runs slightly fast so the two drift against each other.
const DUET_DRIFT: f32 = 1.005;

const DUET_BEATS: f32 = 12.0;

// e', f#', b', c#'', d'', f', c'' relative to a'
const DUET_STRINGS: [f32; 7] = [-5.0, -3.0, 2.0, 4.0, 5.0, -4.0, 3.0];

// one note per beat
const DUET_MELODY: [usize; 12] = [0, 1, 2, 3, 4, 5, 0, 6, 2, 5, 4, 6];

/// A whole piece: shared sample rate, excitation seed and exactly two voices.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PieceConfig {
    pub sample_rate: f32,
    /// Seed for the excitation noise. `None` draws fresh entropy, so every
    /// run sounds slightly different.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: Option<u64>,
    pub voices: Vec<VoiceConfig>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    /// Tempo in beats per minute.
    pub bpm: f32,
    /// Measure length in beats; the note list repeats after this many.
    pub beats: f32,
    /// Pitch of each string in semitones from the 441Hz reference.
    pub strings: Vec<f32>,
    /// Cyclic note list, ascending by beat.
    pub notes: Vec<NoteConfig>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteConfig {
    pub beat: f32,
    /// Index into the voice's `strings`.
    pub string: usize,
}

impl PieceConfig {
    /// Parse a TOML piece description and validate it.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: PieceConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every precondition the synthesis core relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sample_rate = self.sample_rate;
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(sample_rate));
        }
        if self.voices.len() != 2 {
            return Err(ConfigError::VoiceCount(self.voices.len()));
        }
        for (index, voice) in self.voices.iter().enumerate() {
            voice.validate(index, sample_rate)?;
        }
        Ok(())
    }
}

impl Default for PieceConfig {
    fn default() -> Self {
        let voice = |bpm| VoiceConfig {
            bpm,
            beats: DUET_BEATS,
            strings: DUET_STRINGS.to_vec(),
            notes: DUET_MELODY
                .iter()
                .enumerate()
                .map(|(beat, &string)| NoteConfig {
                    beat: beat as f32,
                    string,
                })
                .collect(),
        };

        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            seed: None,
            voices: vec![voice(DUET_BPM), voice(DUET_DRIFT * DUET_BPM)],
        }
    }
}

impl VoiceConfig {
    fn validate(&self, voice: usize, sample_rate: f32) -> Result<(), ConfigError> {
        if !(self.bpm.is_finite() && self.bpm > 0.0) {
            return Err(ConfigError::InvalidTempo { voice, bpm: self.bpm });
        }
        if !(self.beats.is_finite() && self.beats > 0.0) {
            return Err(ConfigError::InvalidMeasure {
                voice,
                beats: self.beats,
            });
        }
        if Tempo::new(self.bpm, self.beats, sample_rate).measure_samples() == 0 {
            return Err(ConfigError::EmptyMeasure {
                voice,
                beats: self.beats,
            });
        }

        if self.strings.is_empty() {
            return Err(ConfigError::NoStrings { voice });
        }
        for (string, &offset) in self.strings.iter().enumerate() {
            let frequency = REFERENCE_FREQUENCY * 2.0_f32.powf(offset / 12.0);
            // the loop length before truncation; inf once the pitch underflows
            let period = sample_rate / frequency;
            if !frequency.is_finite() || period < 1.0 {
                return Err(ConfigError::StringTooHigh {
                    voice,
                    string,
                    frequency,
                    sample_rate,
                });
            }
            if !(period.is_finite() && period < (MAX_LOOP_LENGTH + 1) as f32) {
                return Err(ConfigError::StringTooLow {
                    voice,
                    string,
                    frequency,
                    sample_rate,
                    max: MAX_LOOP_LENGTH,
                });
            }
        }

        if self.notes.is_empty() {
            return Err(ConfigError::NoNotes { voice });
        }
        let mut previous = 0.0;
        for (note, config) in self.notes.iter().enumerate() {
            if !(config.beat.is_finite() && config.beat >= 0.0) {
                return Err(ConfigError::InvalidBeat {
                    voice,
                    note,
                    beat: config.beat,
                });
            }
            if config.beat < previous {
                return Err(ConfigError::NotesOutOfOrder {
                    voice,
                    note,
                    beat: config.beat,
                });
            }
            if config.string >= self.strings.len() {
                return Err(ConfigError::UnknownString {
                    voice,
                    note,
                    string: config.string,
                    available: self.strings.len(),
                });
            }
            previous = config.beat;
        }

        Ok(())
    }
}
