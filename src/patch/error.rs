/// Reasons a piece description cannot be turned into an engine.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("the mixer needs exactly two voices, got {0}")]
    VoiceCount(usize),

    #[error("voice {voice}: tempo must be positive and finite, got {bpm} BPM")]
    InvalidTempo { voice: usize, bpm: f32 },

    #[error("voice {voice}: measure must be a positive number of beats, got {beats}")]
    InvalidMeasure { voice: usize, beats: f32 },

    #[error("voice {voice}: measure of {beats} beats is shorter than one sample")]
    EmptyMeasure { voice: usize, beats: f32 },

    #[error("voice {voice}: no strings defined")]
    NoStrings { voice: usize },

    #[error("voice {voice}, string {string}: {frequency}Hz does not fit a delay line at {sample_rate}Hz")]
    StringTooHigh {
        voice: usize,
        string: usize,
        frequency: f32,
        sample_rate: f32,
    },

    #[error("voice {voice}, string {string}: {frequency}Hz needs a delay line longer than {max} samples at {sample_rate}Hz")]
    StringTooLow {
        voice: usize,
        string: usize,
        frequency: f32,
        sample_rate: f32,
        max: usize,
    },

    #[error("voice {voice}: no notes defined")]
    NoNotes { voice: usize },

    #[error("voice {voice}, note {note}: references string {string}, but only {available} exist")]
    UnknownString {
        voice: usize,
        note: usize,
        string: usize,
        available: usize,
    },

    #[error("voice {voice}, note {note}: beat {beat} is negative or not a number")]
    InvalidBeat { voice: usize, note: usize, beat: f32 },

    #[error("voice {voice}, note {note}: beat {beat} comes before the previous note")]
    NotesOutOfOrder { voice: usize, note: usize, beat: f32 },

    #[cfg(feature = "serde")]
    #[error("failed to parse piece description: {0}")]
    Parse(#[from] toml::de::Error),
}
