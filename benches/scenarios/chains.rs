//! Benchmarks for one soundscape chain at a time.

use std::hint::black_box;

use ambient_dsp::{graph::node::RenderCtx, ChainBuilder, SoundCategory};
use criterion::{BenchmarkId, Criterion};
use rand::{rngs::StdRng, SeedableRng};

use crate::BLOCK_SIZES;

pub fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/chain");
    let builder = ChainBuilder::new(48_000.0, 2.0);
    let mut rng = StdRng::seed_from_u64(0);
    let ctx = RenderCtx::new(48_000.0);

    for category in SoundCategory::ALL {
        let mut chain = builder
            .build(category, &mut rng)
            .expect("catalog chains are well formed");
        chain.start();
        chain.set_master_target(0.5, 0.0);

        for &size in BLOCK_SIZES {
            let mut buffer = vec![0.0f32; size];
            group.bench_with_input(BenchmarkId::new(category.as_str(), size), &size, |b, _| {
                b.iter(|| chain.render(black_box(&mut buffer), black_box(&ctx)))
            });
        }
    }

    group.finish();
}
