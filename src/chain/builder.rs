use rand::Rng;

use crate::{
    chain::{
        catalog::{LfoSpec, SoundCategory, StageSpec},
        Chain,
    },
    dsp::noise::NoiseBuffer,
    graph::{
        arena::{GraphError, NodeArena, NodeId, ParamTarget},
        filter::FilterNode,
        gain::GainNode,
        lfo::LfoNode,
        player::BufferPlayer,
    },
};

/// Turns catalog rows into playable chains.
///
/// Every chain gets freshly generated noise, so two chains of the same
/// soundscape are never sample-identical unless they share an RNG seed.
#[derive(Debug, Clone, Copy)]
pub struct ChainBuilder {
    sample_rate: f32,
    buffer_seconds: f32,
}

impl ChainBuilder {
    pub fn new(sample_rate: f32, buffer_seconds: f32) -> Self {
        Self {
            sample_rate,
            buffer_seconds,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Build the chain for `category`, master gain at zero and nothing started.
    pub fn build<R: Rng + ?Sized>(
        &self,
        category: SoundCategory,
        rng: &mut R,
    ) -> Result<Chain, GraphError> {
        let spec = category.spec();
        let mut arena = NodeArena::new();

        let noise = NoiseBuffer::generate(spec.color, self.buffer_seconds, self.sample_rate, rng);
        let mut tail = arena.add(BufferPlayer::new(noise));

        for stage in spec.stages {
            tail = match *stage {
                StageSpec::Lowpass { cutoff } => {
                    let filter = arena.add(FilterNode::lowpass(cutoff));
                    arena.connect(tail, filter)?;
                    filter
                }
                StageSpec::SweptBandpass { center, q, sweep } => {
                    let depth = add_modulator(&mut arena, sweep)?;
                    let filter = arena.add(FilterNode::bandpass(center, q));
                    arena.connect(tail, filter)?;
                    arena.connect_param(depth, filter, ParamTarget::Cutoff)?;
                    filter
                }
                StageSpec::Tremolo { base, lfos } => {
                    let depths = lfos
                        .iter()
                        .map(|&lfo| add_modulator(&mut arena, lfo))
                        .collect::<Result<Vec<_>, _>>()?;
                    let gain = arena.add(GainNode::new(base));
                    arena.connect(tail, gain)?;
                    for depth in depths {
                        arena.connect_param(depth, gain, ParamTarget::Gain)?;
                    }
                    gain
                }
            };
        }

        let master = arena.add(GainNode::new(0.0));
        arena.connect(tail, master)?;

        Ok(Chain::new(category, arena, master))
    }
}

// lfo -> depth gain; returns the depth node, ready to be routed into a param
fn add_modulator(arena: &mut NodeArena, lfo: LfoSpec) -> Result<NodeId, GraphError> {
    let osc = arena.add(LfoNode::sine(lfo.frequency));
    let depth = arena.add(GainNode::new(lfo.depth));
    arena.connect(osc, depth)?;
    Ok(depth)
}
