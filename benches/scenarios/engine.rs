use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluck_duet::dsp::PeakLevel;
use pluck_duet::io::StereoFrame;
use pluck_duet::patch::PieceConfig;
use pluck_duet::Engine;

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let config = PieceConfig {
        seed: Some(1),
        ..PieceConfig::default()
    };

    group.bench_function("from_config", |b| b.iter(|| Engine::from_config(black_box(&config))));

    for &size in BLOCK_SIZES {
        let mut engine = Engine::from_config(&config).expect("default piece is valid");
        let mut out = vec![StereoFrame::SILENCE; size];
        let mut peak = PeakLevel::UNITY;

        group.bench_with_input(BenchmarkId::new("fill", size), &size, |b, _| {
            b.iter(|| {
                peak = engine.fill(black_box(&mut out), peak);
            })
        });
    }

    group.finish();
}
