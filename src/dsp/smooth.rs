//! Exponential-approach parameter smoothing.

/*
Exponential Approach
====================

Jumping a gain straight from one value to another puts a step into the
waveform, and a step is heard as a click. Instead the value chases its target:

    value += (target - value) × α

every sample. The gap shrinks by the same FRACTION each sample, so the curve
is an exponential decay toward the target:

    gap(t) = gap(0) × e^(-t / τ)

τ (tau, the time constant) is the time it takes to close 63% of the gap:

    after 1τ   63.2% of the way
    after 3τ   95.0%
    after 5τ   99.3%

It never quite arrives, which is fine for gain: the residue is inaudible.

Per-sample coefficient
----------------------

Solving e^(-1 / (τ × sample_rate)) for one sample's step:

    α = 1 - e^(-1 / (τ × sample_rate))

A τ of zero (or less) means "jump now".

Typical values here:

    0.5 s    fade in after start (a gentle swell)
    0.1 s    volume changes and fade out (responsive, no clicks)
*/

const SETTLE_EPSILON: f32 = 1e-6;

/// A parameter that moves toward its target with an exponential curve.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    value: f32,
    target: f32,
    time_constant: f32,
    coeff: f32,
    coeff_rate: f32,
}

impl SmoothedParam {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            target: value,
            time_constant: 0.0,
            coeff: 1.0,
            coeff_rate: 0.0,
        }
    }

    /// Start approaching `target` with time constant `time_constant` seconds.
    ///
    /// The curve starts from wherever the value is right now, so retargeting
    /// mid-ramp never jumps.
    pub fn set_target(&mut self, target: f32, time_constant: f32) {
        self.target = target;
        self.time_constant = time_constant;
        // force recompute at the next block
        self.coeff_rate = 0.0;
        if time_constant <= 0.0 {
            self.value = target;
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next(&mut self, sample_rate: f32) -> f32 {
        if self.value != self.target {
            if self.coeff_rate != sample_rate {
                self.coeff = coefficient(self.time_constant, sample_rate);
                self.coeff_rate = sample_rate;
            }
            self.value += (self.target - self.value) * self.coeff;
            // snap once the remainder is inaudible, before it decays into denormals
            if (self.target - self.value).abs() <= SETTLE_EPSILON {
                self.value = self.target;
            }
        }
        self.value
    }

    /// Write one block of smoothed values.
    pub fn fill(&mut self, out: &mut [f32], sample_rate: f32) {
        if self.is_settled() {
            out.fill(self.value);
            return;
        }
        for v in out.iter_mut() {
            *v = self.next(sample_rate);
        }
    }
}

/// Per-sample smoothing coefficient for a time constant in seconds.
#[inline]
pub fn coefficient(time_constant: f32, sample_rate: f32) -> f32 {
    if time_constant <= 0.0 || sample_rate <= 0.0 {
        1.0
    } else {
        1.0 - (-1.0 / (time_constant * sample_rate)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_time_constant_covers_63_percent() {
        let sr = 48_000.0;
        let mut p = SmoothedParam::new(0.0);
        p.set_target(1.0, 0.1);

        for _ in 0..(0.1 * sr) as usize {
            p.next(sr);
        }

        let expected = 1.0 - (-1.0f32).exp();
        assert!((p.value() - expected).abs() < 0.01, "got {}", p.value());
    }

    #[test]
    fn retarget_mid_ramp_is_continuous() {
        let sr = 48_000.0;
        let mut p = SmoothedParam::new(0.0);
        p.set_target(1.0, 0.5);
        for _ in 0..1000 {
            p.next(sr);
        }
        let before = p.value();

        p.set_target(0.0, 0.1);
        let after = p.next(sr);

        assert!((after - before).abs() < 0.01, "jumped {before} -> {after}");
        assert!(after < before);
    }

    #[test]
    fn zero_time_constant_jumps() {
        let mut p = SmoothedParam::new(0.2);
        p.set_target(0.8, 0.0);
        assert_eq!(p.value(), 0.8);
        assert!(p.is_settled());
    }

    #[test]
    fn converges_and_settles() {
        let sr = 44_100.0;
        let mut p = SmoothedParam::new(0.5);
        p.set_target(0.2, 0.1);
        let mut block = vec![0.0; 512];
        // 2 seconds = 20 time constants
        for _ in 0..(2.0 * sr / 512.0) as usize {
            p.fill(&mut block, sr);
        }
        assert!((p.value() - 0.2).abs() < 1e-5);
    }

    #[test]
    fn coefficient_edge_cases() {
        assert_eq!(coefficient(0.0, 48_000.0), 1.0);
        assert_eq!(coefficient(0.1, 0.0), 1.0);
        let c = coefficient(0.1, 48_000.0);
        assert!(c > 0.0 && c < 1e-3);
    }
}
