//! Scenario benchmarks: the built-in duet as the player runs it.

mod engine;
mod voice;

pub use engine::bench_engine;
pub use voice::bench_voice;
