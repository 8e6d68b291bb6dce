//! Gain primitives.

/*
Gain
====

Every stage in a chain that changes loudness is a multiplication:

    output[i] = input[i] × gain[i]

  gain = 1.0  unity (unchanged)
  gain = 0.5  about -6 dB
  gain = 0.0  silence

Two flavors show up in the signal chains:

  constant    One gain for the whole block (a settled master fader).
  per-sample  A gain curve, e.g. a fade that is still moving or a tremolo
              whose gain is wobbled by an LFO. Using a constant here would
              put a step at every block boundary.

Tremolo
-------

Wobbling the gain of a noise source with a slow LFO makes it breathe:

    gain(t) = base + depth × sin(2π f t)

  fire     base 1.0, 8 Hz × 0.1 and 0.5 Hz × 0.2   (flicker plus swell)
  thunder  base 0.6, 0.1 Hz × 0.4                   (slow rolling rumble)

With base - depth ≥ 0 the gain never flips sign, so the effect is pure
loudness motion with no ring-modulation sidebands.
*/

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    if gain == 1.0 {
        return;
    }
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Multiply a signal by a per-sample gain curve (in-place).
#[inline]
pub fn multiply_in_place(signal: &mut [f32], gain: &[f32]) {
    debug_assert_eq!(signal.len(), gain.len());

    for (s, &g) in signal.iter_mut().zip(gain.iter()) {
        *s *= g;
    }
}

/// Add `source` into `dest` sample-by-sample (summing junction).
#[inline]
pub fn accumulate(dest: &mut [f32], source: &[f32]) {
    debug_assert_eq!(dest.len(), source.len());

    for (d, &s) in dest.iter_mut().zip(source.iter()) {
        *d += s;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_gain_scales() {
        let mut signal = [1.0, 0.5, -0.5, -1.0];
        apply_gain(&mut signal, 0.5);
        assert_eq!(signal, [0.5, 0.25, -0.25, -0.5]);
    }

    #[test]
    fn zero_gain_silences() {
        let mut signal = [0.3, -0.7, 0.5];
        apply_gain(&mut signal, 0.0);
        assert_eq!(signal, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn multiply_in_place_follows_curve() {
        let mut signal = [1.0, 0.5, -0.5, -1.0];
        let curve = [0.5, 0.5, 0.0, 1.0];
        multiply_in_place(&mut signal, &curve);
        assert_eq!(signal, [0.5, 0.25, 0.0, -1.0]);
    }

    #[test]
    fn accumulate_sums() {
        let mut dest = [0.25, 0.5, 0.75];
        accumulate(&mut dest, &[1.0, 1.0, -0.75]);
        assert_eq!(dest, [1.25, 1.5, 0.0]);
    }
}
