//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! Everything here except buffer generation and spectral analysis is
//! allocation-free and realtime-safe. The modules stay focused on the
//! signal-processing math; routing and modulation live in `graph`.

/// Gain and signal multiplication helpers.
pub mod amplify;
/// State-variable filter with lowpass and bandpass responses.
pub mod filter;
/// Base + offset parameter modulation.
pub mod modulate;
/// White, pink and brown noise generation.
pub mod noise;
/// Sine oscillator used by the LFOs.
pub mod oscillator;
/// Exponential-approach parameter smoothing.
pub mod smooth;
/// FFT band-energy measurements.
pub mod spectrum;

pub use noise::{NoiseBuffer, NoiseColor};
pub use smooth::SmoothedParam;
