pub mod chain; // Soundscape catalog and chain builder
pub mod config;
pub mod dsp;
pub mod engine; // Real-time renderer and playback lifecycle
pub mod error;
pub mod graph; // Processing nodes and the per-chain arena
pub mod mixer;

pub use chain::{Chain, ChainBuilder, SoundCategory};
pub use config::MixerConfig;
pub use dsp::noise::{NoiseBuffer, NoiseColor};
pub use engine::{PlaybackPhase, RenderContext, Renderer};
pub use error::MixerError;
pub use mixer::{Mixer, MixerState};

pub const MAX_BLOCK_SIZE: usize = 2048;
