//! Low-level DSP primitives used by the voices and the engine.
//!
//! Everything here is allocation-free once constructed and runs one sample
//! at a time, so it can be driven directly from a buffer refill.

/// Stereo cross-mix and growth-only peak normalizer.
pub mod mix;
/// Karplus-Strong delay-line string.
pub mod resonator;

pub use mix::PeakLevel;
pub use resonator::Resonator;
