//! Coarse spectral measurements for checking noise color.

use rustfft::{num_complex::Complex, FftPlanner};

/// FFT window used for the averaged periodogram.
pub const ANALYSIS_WINDOW: usize = 2048;

/// Averaged power spectrum (Welch's method with a Hann window, no overlap).
///
/// Returns `ANALYSIS_WINDOW / 2` bins from DC up to just below Nyquist.
/// Input shorter than one window is zero-padded.
pub fn power_spectrum(samples: &[f32]) -> Vec<f32> {
    let n = ANALYSIS_WINDOW;
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);

    let window: Vec<f32> = (0..n)
        .map(|i| {
            let phase = std::f32::consts::TAU * i as f32 / (n - 1) as f32;
            0.5 - 0.5 * phase.cos()
        })
        .collect();

    let mut power = vec![0.0f32; n / 2];
    let mut frame = vec![Complex::new(0.0f32, 0.0); n];
    let mut frames = 0usize;

    for chunk in samples.chunks(n) {
        for (i, slot) in frame.iter_mut().enumerate() {
            let s = chunk.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(s * window[i], 0.0);
        }
        fft.process(&mut frame);

        for (bin, p) in power.iter_mut().enumerate() {
            *p += frame[bin].norm_sqr();
        }
        frames += 1;
    }

    if frames > 0 {
        for p in power.iter_mut() {
            *p /= frames as f32;
        }
    }
    power
}

/// Fraction of total energy that lies above `split_hz`.
///
/// Flat (white) noise sits near `1 - split / nyquist`; the darker the noise,
/// the closer this gets to zero.
pub fn high_band_ratio(samples: &[f32], sample_rate: f32, split_hz: f32) -> f32 {
    let power = power_spectrum(samples);
    let bin_hz = sample_rate / ANALYSIS_WINDOW as f32;
    let split_bin = ((split_hz / bin_hz) as usize).min(power.len());

    // skip DC
    let low: f32 = power[1..split_bin.max(1)].iter().sum();
    let high: f32 = power[split_bin.max(1)..].iter().sum();
    let total = low + high;

    if total > 0.0 {
        high / total
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn sine(freq: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn low_sine_has_no_high_energy() {
        let buffer = sine(200.0, 48_000.0, 16_384);
        let ratio = high_band_ratio(&buffer, 48_000.0, 2_000.0);
        assert!(ratio < 0.01, "ratio {ratio}");
    }

    #[test]
    fn high_sine_is_all_high_energy() {
        let buffer = sine(8_000.0, 48_000.0, 16_384);
        let ratio = high_band_ratio(&buffer, 48_000.0, 2_000.0);
        assert!(ratio > 0.99, "ratio {ratio}");
    }

    #[test]
    fn silence_reports_zero() {
        let buffer = vec![0.0; 4096];
        assert_eq!(high_band_ratio(&buffer, 48_000.0, 1_000.0), 0.0);
    }

    #[test]
    fn spectrum_has_half_window_bins() {
        assert_eq!(power_spectrum(&[0.5; 100]).len(), ANALYSIS_WINDOW / 2);
    }
}
