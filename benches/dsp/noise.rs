//! Benchmarks for noise buffer generation.
//!
//! Generation happens on the control thread once per chain start, so the
//! number that matters is the cost of a full two-second buffer.

use std::hint::black_box;

use ambient_dsp::dsp::noise::{NoiseBuffer, NoiseColor};
use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");
    let mut rng = StdRng::seed_from_u64(0);

    for color in [NoiseColor::White, NoiseColor::Pink, NoiseColor::Brown] {
        let name = format!("{color:?}").to_lowercase();
        group.bench_with_input(BenchmarkId::new(name, "2s@48k"), &color, |b, &color| {
            b.iter(|| NoiseBuffer::generate(black_box(color), 2.0, 48_000.0, &mut rng))
        });
    }

    group.finish();
}
