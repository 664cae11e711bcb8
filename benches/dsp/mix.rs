use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluck_duet::dsp::mix::mixdown;
use pluck_duet::dsp::PeakLevel;
use pluck_duet::io::StereoFrame;

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/mix");

    for &size in BLOCK_SIZES {
        let mut out = vec![StereoFrame::SILENCE; size];

        // the steady state: peak already above anything the signal reaches
        group.bench_with_input(BenchmarkId::new("mixdown_settled", size), &size, |b, _| {
            b.iter(|| {
                let (mut left, mut right) = (0.0f32, 1.0f32);
                let first = || {
                    left += 0.05;
                    left.sin()
                };
                let second = || {
                    right += 0.07;
                    right.sin()
                };
                mixdown(first, second, black_box(&mut out), PeakLevel::new(4.0))
            })
        });

        // a rising ramp forces a peak update on every frame
        group.bench_with_input(BenchmarkId::new("mixdown_rising", size), &size, |b, _| {
            b.iter(|| {
                let mut level = 1.0f32;
                let rising = || {
                    level += 0.01;
                    level
                };
                mixdown(rising, || 0.0, black_box(&mut out), PeakLevel::UNITY)
            })
        });
    }

    group.finish();
}
