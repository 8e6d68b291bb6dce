//! Noise generators.

/*
Noise Colors
============

Noise is named after the slope of its power spectrum, borrowing the idea
from light: white light has every wavelength in equal measure, redder light
leans toward the long (low) end.

  white   Flat spectrum. Every frequency band of equal width carries the
          same energy. Sounds like hiss or a detuned radio.

  pink    Falls off at ~3 dB per octave (power ~ 1/f). Every OCTAVE carries
          the same energy, which is how our ears group frequencies, so pink
          noise sounds "balanced": steady rain, a waterfall at a distance.

  brown   Falls off at ~6 dB per octave (power ~ 1/f²). Named after Brownian
          motion, not the color. A deep rumble: surf, distant thunder, fire.

    dB
     0 ┤━━━━━━━━━━━━━━━━━━━━━━━━━━━━━  white
       │╲
   -20 ┤  ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲ ╲   pink  (-3 dB/oct)
       │ ╲
   -40 ┤    ╲    ╲    ╲    ╲    ╲      brown (-6 dB/oct)
       └──┬────┬────┬────┬────┬────→ log f
        100   1k   2k   4k   8k


Pink: Paul Kellet's Filter Bank
-------------------------------

There is no cheap exact 1/f filter, but a handful of one-pole lowpass
filters with staggered corner frequencies add up to a good approximation.
Each accumulator is

    b = decay × b + gain × white

with a different decay (corner frequency) per stage. The sum is scaled by
0.11 to land roughly in [-1, 1].


Brown: Leaky Integrator
-----------------------

Integrating white noise gives a random walk, which has exactly the 1/f²
spectrum we want, but a pure integrator drifts off to infinity. Dividing by
(1 + k) every step leaks a little of the state away and keeps it bounded:

    out = (last + k × white) / (1 + k)        k = 0.02

The result is quiet (the walk rarely strays far from zero), so a make-up
gain of 3.5 brings it back to a useful level.


Clipping
--------

Neither pink nor brown is hard-bounded by its recurrence once make-up gain is
applied. Both are clipped to [-1, 1] on output. The filter state is left
untouched, so the clip only bites on rare excursions and never changes the
spectral slope.
*/

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Spectral character of a generated noise buffer.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

/// Normalization applied to the pink filter-bank sum.
pub const PINK_SCALE: f32 = 0.11;
/// Leak coefficient of the brown integrator.
pub const BROWN_LEAK: f32 = 0.02;
/// Make-up gain applied after the brown integrator.
pub const BROWN_GAIN: f32 = 3.5;

// (decay, gain) per pink accumulator b0..b5
const PINK_POLES: [(f32, f32); 6] = [
    (0.99886, 0.0555179),
    (0.99332, 0.0750759),
    (0.96900, 0.1538520),
    (0.86650, 0.3104856),
    (0.55000, 0.5329522),
    (-0.7616, -0.0168980),
];
const PINK_DIRECT: f32 = 0.5362;
const PINK_DELAYED: f32 = 0.115926;

#[inline]
fn white_sample<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-1.0f32..=1.0)
}

/// Fill `out` with uniform white noise in [-1, 1].
pub fn white<R: Rng + ?Sized>(out: &mut [f32], rng: &mut R) {
    for sample in out.iter_mut() {
        *sample = white_sample(rng);
    }
}

/// Fill `out` with pink (~1/f) noise.
pub fn pink<R: Rng + ?Sized>(out: &mut [f32], rng: &mut R) {
    let mut b = [0.0f32; 6];
    // b6 lags one sample behind the white input
    let mut b6 = 0.0f32;

    for sample in out.iter_mut() {
        let white = white_sample(rng);

        let mut sum = 0.0;
        for (state, &(decay, gain)) in b.iter_mut().zip(PINK_POLES.iter()) {
            *state = decay * *state + white * gain;
            sum += *state;
        }

        let value = (sum + b6 + white * PINK_DIRECT) * PINK_SCALE;
        *sample = value.clamp(-1.0, 1.0);
        b6 = white * PINK_DELAYED;
    }
}

/// Fill `out` with brown (~1/f²) noise.
pub fn brown<R: Rng + ?Sized>(out: &mut [f32], rng: &mut R) {
    let mut last = 0.0f32;

    for sample in out.iter_mut() {
        let white = white_sample(rng);
        last = (last + BROWN_LEAK * white) / (1.0 + BROWN_LEAK);
        *sample = (last * BROWN_GAIN).clamp(-1.0, 1.0);
    }
}

/// A mono block of generated noise, tagged with how it was made.
#[derive(Debug, Clone)]
pub struct NoiseBuffer {
    samples: Vec<f32>,
    sample_rate: f32,
    color: NoiseColor,
}

impl NoiseBuffer {
    /// Generate `duration_secs` of noise at `sample_rate`.
    ///
    /// Non-positive (or non-finite) durations and sample rates yield an empty
    /// buffer.
    pub fn generate<R: Rng + ?Sized>(
        color: NoiseColor,
        duration_secs: f32,
        sample_rate: f32,
        rng: &mut R,
    ) -> Self {
        let len = frames_for(duration_secs, sample_rate);
        let mut samples = vec![0.0; len];

        match color {
            NoiseColor::White => white(&mut samples, rng),
            NoiseColor::Pink => pink(&mut samples, rng),
            NoiseColor::Brown => brown(&mut samples, rng),
        }

        Self {
            samples,
            sample_rate,
            color,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn color(&self) -> NoiseColor {
        self.color
    }

    /// Length in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate > 0.0 {
            self.samples.len() as f32 / self.sample_rate
        } else {
            0.0
        }
    }
}

fn frames_for(duration_secs: f32, sample_rate: f32) -> usize {
    let frames = (duration_secs as f64 * sample_rate as f64).round();
    if frames.is_finite() && duration_secs > 0.0 && sample_rate > 0.0 {
        frames as usize
    } else {
        0
    }
}
