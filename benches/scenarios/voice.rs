use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pluck_duet::dsp::Resonator;
use pluck_duet::patch::PieceConfig;
use pluck_duet::sequencing::{NoteEvent, StringId, Tempo};
use pluck_duet::synth::Voice;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::BLOCK_SIZES;

fn duet_voice() -> Voice {
    let piece = PieceConfig::default();
    let config = &piece.voices[0];
    let sample_rate = 44_100.0;
    let mut rng = StdRng::seed_from_u64(7);

    let strings = config
        .strings
        .iter()
        .map(|&offset| Resonator::new(offset, sample_rate, &mut rng))
        .collect();
    let notes = config
        .notes
        .iter()
        .map(|note| NoteEvent::new(note.beat, StringId(note.string)))
        .collect();

    Voice::new(strings, notes, Tempo::new(config.bpm, config.beats, sample_rate))
}

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];
        let mut voice = duet_voice();

        // seven strings summed per sample, notes firing as the measure runs
        group.bench_with_input(BenchmarkId::new("duet_voice", size), &size, |b, _| {
            b.iter(|| voice.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
