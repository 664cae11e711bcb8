pub mod dsp; // Resonators and mixdown
pub mod engine;
pub mod io;
pub mod patch; // Piece configuration
pub mod sequencing; // Note events and tempo
pub mod synth; // Voices

pub use engine::Engine;

/// Pitch every string is tuned relative to, in Hz.
pub const REFERENCE_FREQUENCY: f32 = 441.0;
