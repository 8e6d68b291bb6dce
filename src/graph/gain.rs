use crate::{
    dsp::{
        amplify::{accumulate, apply_gain, multiply_in_place},
        smooth::SmoothedParam,
    },
    graph::node::{GraphNode, Modulatable, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Parameters exposed by a gain stage
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GainParam {
    Gain,
}

/// Amplitude stage with a smoothed base gain and per-sample modulation.
///
/// Serves as a track's master fader, as the tremolo stage inside a chain,
/// and as the depth control between an LFO and the parameter it drives.
pub struct GainNode {
    gain: SmoothedParam,
    modulation: Vec<f32>,
    modulated_len: usize,
    curve: Vec<f32>,
}

impl GainNode {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: SmoothedParam::new(gain),
            modulation: vec![0.0; MAX_BLOCK_SIZE],
            modulated_len: 0,
            curve: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Ramp the base gain toward `target` with an exponential approach.
    pub fn set_target(&mut self, target: f32, time_constant: f32) {
        self.gain.set_target(target, time_constant);
    }

    /// Current base gain (where the ramp is right now).
    pub fn gain(&self) -> f32 {
        self.gain.value()
    }

    /// Value the base gain is heading toward.
    pub fn target(&self) -> f32 {
        self.gain.target()
    }
}

impl Modulatable for GainNode {
    type Param = GainParam;

    fn get_param(&self, param: Self::Param) -> f32 {
        match param {
            GainParam::Gain => self.gain.value(),
        }
    }

    fn apply_modulation(&mut self, param: Self::Param, modulation: &[f32]) {
        match param {
            GainParam::Gain => {
                let len = modulation.len().min(MAX_BLOCK_SIZE);
                self.modulation[..len].copy_from_slice(&modulation[..len]);
                self.modulated_len = len;
            }
        }
    }
}

impl GraphNode for GainNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let len = out.len();
        let modulated = self.modulated_len == len;
        self.modulated_len = 0;

        if self.gain.is_settled() && !modulated {
            apply_gain(out, self.gain.value());
            return;
        }

        let curve = &mut self.curve[..len];
        self.gain.fill(curve, ctx.sample_rate);
        if modulated {
            accumulate(curve, &self.modulation[..len]);
        }
        multiply_in_place(out, curve);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_gain_scales_input() {
        let mut node = GainNode::new(0.5);
        let mut buffer = vec![1.0; 64];
        node.render_block(&mut buffer, &RenderCtx::new(48_000.0));
        assert!(buffer.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn starts_silent_and_fades_in() {
        let mut node = GainNode::new(0.0);
        node.set_target(0.5, 0.5);
        let ctx = RenderCtx::new(48_000.0);

        let mut buffer = vec![1.0; 512];
        node.render_block(&mut buffer, &ctx);

        // monotonic rise from near zero, no jump
        assert!(buffer[0] < 1e-3);
        assert!(buffer.windows(2).all(|w| w[1] >= w[0]));
        assert!(node.gain() > 0.0 && node.gain() < 0.5);
        assert_eq!(node.target(), 0.5);
    }

    #[test]
    fn modulation_adds_around_base() {
        let mut node = GainNode::new(1.0);
        let ctx = RenderCtx::new(48_000.0);

        let wobble: Vec<f32> = (0..128).map(|i| if i % 2 == 0 { 0.1 } else { -0.1 }).collect();
        node.apply_modulation(GainParam::Gain, &wobble);

        let mut buffer = vec![1.0; 128];
        node.render_block(&mut buffer, &ctx);
        assert!((buffer[0] - 1.1).abs() < 1e-6);
        assert!((buffer[1] - 0.9).abs() < 1e-6);

        // modulation applies to one block only
        let mut next = vec![1.0; 128];
        node.render_block(&mut next, &ctx);
        assert!(next.iter().all(|&s| s == 1.0));
    }
}
