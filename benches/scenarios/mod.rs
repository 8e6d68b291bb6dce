//! Real-world scenario benchmarks.
//!
//! Single soundscape chains, and all five layered through the renderer the
//! way the audio callback runs them.

mod chains;
mod mix;

pub use chains::bench_chains;
pub use mix::bench_mix;
