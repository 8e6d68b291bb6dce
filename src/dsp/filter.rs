use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::node::RenderCtx;

/*
| type      | passes          | rejects           | peak gain      |
| --------- | --------------- | ----------------- | -------------- |
| low-pass  | below cutoff    | above cutoff      | ~Q at cutoff   |
| band-pass | around center   | both sides        | 1.0 at center  |

Q sets the damping: k = 1 / Q. The raw SVF band output peaks at Q, so it is
scaled by k to keep a constant 0 dB peak regardless of bandwidth.
*/

/// Butterworth: maximally flat passband.
pub const Q_BUTTERWORTH: f32 = std::f32::consts::FRAC_1_SQRT_2;
/// Default lowpass Q: a +1 dB bump at the cutoff (10^(1/20)).
pub const DEFAULT_LOWPASS_Q: f32 = 1.122_018_5;

const MIN_CUTOFF_HZ: f32 = 10.0;
const MIN_Q: f32 = 1e-3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    BandPass,
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
}

/// Topology-preserving-transform state-variable filter.
pub struct SVFilter {
    ic1eq: f32, // first integrator
    ic2eq: f32, // second integrator

    pub cutoff_hz: f32,
    pub q: f32,
    filter_type: FilterType,
}

impl SVFilter {
    pub fn new(filter_type: FilterType, cutoff_hz: f32, q: f32) -> Self {
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz,
            q,
            filter_type,
        }
    }

    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::new(FilterType::LowPass, cutoff_hz, DEFAULT_LOWPASS_Q)
    }

    pub fn bandpass(center_hz: f32, q: f32) -> Self {
        Self::new(FilterType::BandPass, center_hz, q)
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    #[inline]
    fn compute_g(&self, sample_rate: f32) -> f32 {
        // keep the prewarp below Nyquist where tan() blows up
        let cutoff = self.cutoff_hz.clamp(MIN_CUTOFF_HZ, 0.49 * sample_rate);
        (TAU * cutoff / (2.0 * sample_rate)).tan()
    }

    #[inline]
    pub fn next_sample(&mut self, sample: f32, k: f32, g: f32) -> FilterOutputs {
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
        }
    }

    pub fn render(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        let g = self.compute_g(ctx.sample_rate);
        let k = 1.0 / self.q.max(MIN_Q);

        for sample in buffer.iter_mut() {
            let outputs = self.next_sample(*sample, k, g);

            *sample = match self.filter_type {
                FilterType::LowPass => outputs.lowpass,
                FilterType::BandPass => k * outputs.bandpass,
            }
        }
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
    }

    pub fn set_q(&mut self, q: f32) {
        self.q = q;
    }
}
