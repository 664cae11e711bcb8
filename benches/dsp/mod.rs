//! Benchmarks for low-level DSP primitives.

mod mix;
mod resonator;

pub use mix::bench_mix;
pub use resonator::bench_resonator;
