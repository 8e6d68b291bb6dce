use crate::{
    dsp::{
        filter::{FilterType, SVFilter},
        modulate::{apply_modulation, block_average},
    },
    graph::node::{GraphNode, Modulatable, RenderCtx},
};

/*
Shaping Filters
===============

Noise is broadband, so nearly all of a soundscape's character comes from
which part of the spectrum is allowed through.

Lowpass (LP): passes frequencies BELOW the cutoff.
  - 4000 Hz  takes the harsh top off pink noise (focus)
  - 800 Hz   muffles white noise into rain on a roof
  - 180 Hz   leaves only the rumble of brown noise (thunder)

Bandpass (BP): passes a band AROUND the center, attenuates both sides.
  - Q sets the width: Q = 1 is about two octaves wide
  - Sweeping the center slowly up and down gives a whooshing gust (wind)

Cutoff (Hz):
  - 20 Hz:     barely open (very dark)
  - 200 Hz:    muffled, like through a wall
  - 1000 Hz:   warm
  - 5000 Hz:   present, clear
  - 20000 Hz:  fully open

Example usage:
  let rain = FilterNode::lowpass(800.0);
  let wind = FilterNode::bandpass(400.0, 1.0); // + LFO on FilterParam::Cutoff
*/

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterParam {
    Cutoff,
    Q,
}

pub struct FilterNode {
    filter: SVFilter,
    base_cutoff: f32,
    base_q: f32,
}

impl FilterNode {
    pub fn lowpass(cutoff_hz: f32) -> Self {
        Self::from_filter(SVFilter::lowpass(cutoff_hz))
    }

    pub fn bandpass(center_hz: f32, q: f32) -> Self {
        Self::from_filter(SVFilter::bandpass(center_hz, q))
    }

    fn from_filter(filter: SVFilter) -> Self {
        FilterNode {
            base_cutoff: filter.cutoff_hz,
            base_q: filter.q,
            filter,
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter.filter_type()
    }

    /// Cutoff currently in effect (base plus this block's modulation).
    pub fn effective_cutoff(&self) -> f32 {
        self.filter.cutoff_hz
    }
}

impl Modulatable for FilterNode {
    type Param = FilterParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            FilterParam::Cutoff => self.base_cutoff,
            FilterParam::Q => self.base_q,
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, modulation: &[f32]) {
        let offset = block_average(modulation);
        match param {
            FilterParam::Cutoff => {
                let value = apply_modulation(self.base_cutoff, offset);
                self.filter.set_cutoff(value.clamp(20.0, 20_000.0));
            }
            FilterParam::Q => {
                let value = apply_modulation(self.base_q, offset);
                self.filter.set_q(value.clamp(0.1, 30.0));
            }
        }
    }
}

impl GraphNode for FilterNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.filter.render(out, ctx);
    }
}
