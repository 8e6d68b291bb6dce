//! Benchmarks for the full mix.
//!
//! Every soundscape playing at once through an offline renderer: the worst
//! case the audio callback has to keep up with.

use std::hint::black_box;

use ambient_dsp::{Mixer, MixerConfig, SoundCategory};
use criterion::{BenchmarkId, Criterion};

use crate::BLOCK_SIZES;

pub fn bench_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/mix");

    for &size in BLOCK_SIZES {
        let (mut mixer, mut renderer) = Mixer::offline(
            MixerConfig::new()
                .seed(0)
                .offline_sample_rate(48_000.0),
        );
        for category in SoundCategory::ALL {
            mixer.toggle(category);
        }

        let mut buffer = vec![0.0f32; size];
        group.bench_with_input(BenchmarkId::new("5_soundscapes", size), &size, |b, _| {
            b.iter(|| renderer.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
