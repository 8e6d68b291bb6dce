use std::f32::consts::TAU;

/// Phase-accumulating sine oscillator.
///
/// Phase is kept in cycles (0..1) so long runs at sub-hertz rates don't lose
/// precision the way an ever-growing radian counter would.
#[derive(Debug, Clone, Default)]
pub struct SineOscillator {
    phase: f32,
}

impl SineOscillator {
    pub fn new() -> Self {
        Self { phase: 0.0 }
    }

    pub fn render(&mut self, out: &mut [f32], frequency: f32, sample_rate: f32) {
        let increment = frequency / sample_rate;
        for sample in out.iter_mut() {
            *sample = (TAU * self.phase).sin();
            self.phase = (self.phase + increment).fract();
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_closed_form() {
        let sample_rate = 48_000.0;
        let mut osc = SineOscillator::new();
        let mut buffer = vec![0.0f32; 128];
        osc.render(&mut buffer, 440.0, sample_rate);

        let sample_index = 12;
        let expected = (TAU * 440.0 * sample_index as f32 / sample_rate).sin();
        assert!((buffer[sample_index] - expected).abs() < 1e-5);
    }

    #[test]
    fn phase_wraps() {
        let mut osc = SineOscillator::new();
        let mut buffer = vec![0.0f32; 4800];
        osc.render(&mut buffer, 10.0, 48_000.0);
        // one full cycle
        assert!(osc.phase() < 1e-3 || osc.phase() > 1.0 - 1e-3);
        assert!(buffer.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
