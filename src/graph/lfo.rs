use crate::{
    dsp::oscillator::SineOscillator,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An LFO is an oscillator that runs below hearing (here 0.1 Hz to 8 Hz) and is
wired into a parameter instead of the output. It never makes sound itself;
it makes other things move.

Rates used by the soundscapes:

    0.1 Hz    10 s cycle   thunder's slow roll
    0.15 Hz   ~7 s cycle   wind gusts (bandpass sweep)
    0.5 Hz    2 s cycle    fire's slow swell
    8 Hz      125 ms       fire's fast flicker

Output is bipolar, -1.0 to +1.0. The depth is applied by a gain node placed
between the LFO and its target parameter.

Like a buffer player, an LFO outputs silence until started and after it is
stopped.
*/

pub struct LfoNode {
    osc: SineOscillator,
    frequency: f32,
    running: bool,
    stopped: bool,
}

impl LfoNode {
    pub fn sine(frequency: f32) -> Self {
        Self {
            osc: SineOscillator::new(),
            frequency,
            running: false,
            stopped: false,
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        if self.running {
            self.osc.render(out, self.frequency, ctx.sample_rate);
        } else {
            out.fill(0.0);
        }
    }

    fn start(&mut self) {
        if !self.stopped {
            self.running = true;
        }
    }

    fn stop(&mut self) {
        self.running = false;
        self.stopped = true;
    }

    fn is_active(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_sine_output_range() {
        let mut lfo = LfoNode::sine(5.0);
        lfo.start();
        let mut buffer = vec![0.0; 48_000];
        let ctx = RenderCtx::new(48_000.0);

        lfo.render_block(&mut buffer, &ctx);

        for &sample in &buffer {
            assert!(
                (-1.0..=1.0).contains(&sample),
                "LFO sine sample {} out of range [-1.0, 1.0]",
                sample
            );
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        assert!(peak > 0.99);
    }

    #[test]
    fn silent_before_start_and_after_stop() {
        let mut lfo = LfoNode::sine(8.0);
        let ctx = RenderCtx::new(48_000.0);
        let mut buffer = vec![1.0; 256];

        lfo.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|&s| s == 0.0));

        lfo.start();
        lfo.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().any(|&s| s != 0.0));

        lfo.stop();
        lfo.start();
        lfo.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|&s| s == 0.0));
    }
}
