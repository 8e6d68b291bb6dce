//! Parameter modulation primitives.

/*
Parameter Modulation
====================

A modulator is a signal wired into a parameter instead of an audio input.
Whatever arrives on the parameter is ADDED to its base value:

    value = base + Σ modulator_i

Each modulator here is an LFO followed by a depth gain, so:

    value = base + depth × lfo          lfo ∈ [-1, +1]

Wind, for example, sweeps a bandpass centered at 400 Hz with a 0.15 Hz sine
at depth 300:

    LFO = -1.0  →  center = 400 - 300 = 100 Hz
    LFO =  0.0  →  center = 400 Hz
    LFO = +1.0  →  center = 400 + 300 = 700 Hz

Several modulators on the same parameter simply sum (fire's two tremolo LFOs).


Block-Rate vs Sample-Rate
-------------------------

SAMPLE-RATE: the parameter takes a new value every sample.
    Needed for gain: a tremolo at 8 Hz updated only per block would step.
    Cheap, because a gain is one multiply.

BLOCK-RATE: one value per block, the average of the modulator over the block.
    Used for filter cutoff/Q: recomputing SVF coefficients per sample is
    costly, and a 0.15 Hz sweep moves only a fraction of a hertz per block.

Averaging (rather than taking the first sample) represents the middle of the
block, so the stepped curve stays centered on the true one.


Clamping
--------

Modulation can push a parameter out of range (a negative cutoff, a gain
sign flip). The target node clamps: filters to a sane audio range, gains
are left alone because a negative gain is still well-defined.
*/

/// Calculate the modulated parameter value: `base + modulation`.
#[inline]
pub fn apply_modulation(base_value: f32, modulation: f32) -> f32 {
    base_value + modulation
}

/// Calculate the average of a modulator signal over a block.
#[inline]
pub fn block_average(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f32>() / samples.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulation_adds_to_base() {
        assert_eq!(apply_modulation(400.0, 0.0), 400.0);
        assert_eq!(apply_modulation(400.0, 300.0), 700.0);
        assert_eq!(apply_modulation(400.0, -300.0), 100.0);
    }

    #[test]
    fn test_block_average() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(block_average(&samples), 2.5);
    }

    #[test]
    fn test_block_average_empty() {
        let samples: [f32; 0] = [];
        assert_eq!(block_average(&samples), 0.0);
    }
}
