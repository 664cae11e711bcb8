use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluck_duet::dsp::Resonator;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::BLOCK_SIZES;

pub fn bench_resonator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/resonator");
    let mut rng = StdRng::seed_from_u64(0);

    // low e' (long loop) and a high string
    for &offset in &[-5.0f32, 24.0] {
        group.bench_with_input(BenchmarkId::new("setup", offset as i32), &offset, |b, &offset| {
            b.iter(|| Resonator::new(black_box(offset), 44_100.0, &mut rng))
        });
    }

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut string = Resonator::new(0.0, 44_100.0, &mut rng);
        string.pluck();

        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, _| {
            b.iter(|| string.render(black_box(&mut buffer)))
        });
    }

    let mut string = Resonator::new(0.0, 44_100.0, &mut rng);
    group.bench_function("pluck", |b| b.iter(|| black_box(&mut string).pluck()));

    group.finish();
}
