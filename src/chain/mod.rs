//! Per-soundscape signal chains.
//!
//! A [`Chain`] is one playing instance of a soundscape: a looping noise
//! source, its shaping stages and a master gain, all owned by a single
//! [`NodeArena`]. Chains are assembled from the [`catalog`] by the
//! [`builder`].

pub mod builder;
pub mod catalog;

use crate::{
    dsp::amplify::accumulate,
    graph::{
        arena::{NodeArena, NodeId, NodeKind},
        node::RenderCtx,
    },
    MAX_BLOCK_SIZE,
};

pub use builder::ChainBuilder;
pub use catalog::{ChainSpec, LfoSpec, SoundCategory, StageSpec};

pub struct Chain {
    category: SoundCategory,
    arena: NodeArena,
    master: NodeId,
    stopped: bool,
}

impl Chain {
    pub(crate) fn new(category: SoundCategory, arena: NodeArena, master: NodeId) -> Self {
        Self {
            category,
            arena,
            master,
            stopped: false,
        }
    }

    pub fn category(&self) -> SoundCategory {
        self.category
    }

    /// Current master gain (where its ramp is right now).
    pub fn master_gain(&self) -> f32 {
        self.arena.gain(self.master).map_or(0.0, |g| g.gain())
    }

    /// Value the master gain is ramping toward.
    pub fn master_target(&self) -> f32 {
        self.arena.gain(self.master).map_or(0.0, |g| g.target())
    }

    pub fn set_master_target(&mut self, target: f32, time_constant: f32) {
        if let Some(master) = self.arena.gain_mut(self.master) {
            master.set_target(target, time_constant);
        }
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Kind of every node in processing order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, NodeKind)> + '_ {
        self.arena.nodes().map(|(id, node)| (id, node.kind()))
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn master(&self) -> NodeId {
        self.master
    }

    /// Start the noise source and every LFO.
    pub fn start(&mut self) {
        self.arena.start_all();
    }

    /// Stop every source in the chain. Calling this twice is harmless.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.arena.stop_all();
            self.stopped = true;
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Render one block and add the master output onto `out`.
    ///
    /// Only the first `MAX_BLOCK_SIZE` samples of `out` are touched.
    pub fn mix_into(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let n = self.arena.render(out.len(), ctx);
        accumulate(&mut out[..n], self.arena.output(self.master, n));
    }

    /// Render `out.len()` samples of master output, overwriting `out`.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let mut frame = ctx.frame;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            chunk.fill(0.0);
            self.mix_into(chunk, &RenderCtx::at_frame(ctx.sample_rate, frame));
            frame += chunk.len() as u64;
        }
    }
}
