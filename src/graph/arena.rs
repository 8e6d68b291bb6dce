use thiserror::Error;

use crate::{
    dsp::amplify::accumulate,
    graph::{
        filter::{FilterNode, FilterParam},
        gain::{GainNode, GainParam},
        lfo::LfoNode,
        node::{GraphNode, Modulatable, RenderCtx},
        player::BufferPlayer,
    },
    MAX_BLOCK_SIZE,
};

/*
Node Arena
==========

Every chain owns one arena. Nodes are pushed into a Vec and addressed by
their index (NodeId); routes are stored on the receiving node as lists of
NodeIds. Nothing outside the arena holds a node, so dropping the arena
releases the whole chain at once and no half-torn-down graph can exist.

Two kinds of route:

  audio   [from] ──→ [to]            to's input = Σ outputs of its sources
  param   [from] ──→ [to].param      param = base + Σ outputs of its sources

A route must point from a lower id to a higher id. Nodes are rendered in id
order, so every input is ready before the node that reads it, and a cycle
cannot be expressed.

    id:   0        1         2        3         4
        [lfo] → [depth] ──┐
                          ▼ cutoff
        [player] ──────→ [bandpass] ──→ [master]
*/

/// Index of a node inside its own arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Player,
    Filter,
    Oscillator,
    Gain,
}

/// Parameter a modulation route can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamTarget {
    Cutoff,
    Q,
    Gain,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("node {0:?} does not exist in this chain")]
    UnknownNode(NodeId),
    #[error("route {from:?} -> {to:?} runs against processing order")]
    BackwardRoute { from: NodeId, to: NodeId },
    #[error("{kind:?} node has no {target:?} parameter")]
    UnsupportedParam { kind: NodeKind, target: ParamTarget },
}

/// Any stage a chain can contain.
pub enum ProcessingNode {
    Player(BufferPlayer),
    Filter(FilterNode),
    Oscillator(LfoNode),
    Gain(GainNode),
}

impl ProcessingNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ProcessingNode::Player(_) => NodeKind::Player,
            ProcessingNode::Filter(_) => NodeKind::Filter,
            ProcessingNode::Oscillator(_) => NodeKind::Oscillator,
            ProcessingNode::Gain(_) => NodeKind::Gain,
        }
    }

    fn supports(&self, target: ParamTarget) -> bool {
        matches!(
            (self, target),
            (ProcessingNode::Filter(_), ParamTarget::Cutoff | ParamTarget::Q)
                | (ProcessingNode::Gain(_), ParamTarget::Gain)
        )
    }

    fn modulate(&mut self, target: ParamTarget, modulation: &[f32]) {
        match (self, target) {
            (ProcessingNode::Filter(f), ParamTarget::Cutoff) => {
                f.apply_modulation(FilterParam::Cutoff, modulation)
            }
            (ProcessingNode::Filter(f), ParamTarget::Q) => {
                f.apply_modulation(FilterParam::Q, modulation)
            }
            (ProcessingNode::Gain(g), ParamTarget::Gain) => {
                g.apply_modulation(GainParam::Gain, modulation)
            }
            // rejected by connect_param
            _ => {}
        }
    }

    fn as_node_mut(&mut self) -> &mut dyn GraphNode {
        match self {
            ProcessingNode::Player(n) => n,
            ProcessingNode::Filter(n) => n,
            ProcessingNode::Oscillator(n) => n,
            ProcessingNode::Gain(n) => n,
        }
    }

    fn as_node(&self) -> &dyn GraphNode {
        match self {
            ProcessingNode::Player(n) => n,
            ProcessingNode::Filter(n) => n,
            ProcessingNode::Oscillator(n) => n,
            ProcessingNode::Gain(n) => n,
        }
    }
}

impl GraphNode for ProcessingNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.as_node_mut().render_block(out, ctx)
    }

    fn start(&mut self) {
        self.as_node_mut().start()
    }

    fn stop(&mut self) {
        self.as_node_mut().stop()
    }

    fn is_active(&self) -> bool {
        self.as_node().is_active()
    }
}

impl From<BufferPlayer> for ProcessingNode {
    fn from(node: BufferPlayer) -> Self {
        ProcessingNode::Player(node)
    }
}

impl From<FilterNode> for ProcessingNode {
    fn from(node: FilterNode) -> Self {
        ProcessingNode::Filter(node)
    }
}

impl From<LfoNode> for ProcessingNode {
    fn from(node: LfoNode) -> Self {
        ProcessingNode::Oscillator(node)
    }
}

impl From<GainNode> for ProcessingNode {
    fn from(node: GainNode) -> Self {
        ProcessingNode::Gain(node)
    }
}

struct Slot {
    node: ProcessingNode,
    audio_inputs: Vec<NodeId>,
    param_inputs: Vec<(ParamTarget, Vec<NodeId>)>,
    output: Vec<f32>,
}

/// Owner of every node in one chain, plus the routes between them.
pub struct NodeArena {
    slots: Vec<Slot>,
    scratch: Vec<f32>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn add(&mut self, node: impl Into<ProcessingNode>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            node: node.into(),
            audio_inputs: Vec::new(),
            param_inputs: Vec::new(),
            output: vec![0.0; MAX_BLOCK_SIZE],
        });
        id
    }

    fn check_route(&self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        for id in [from, to] {
            if id.0 >= self.slots.len() {
                return Err(GraphError::UnknownNode(id));
            }
        }
        if from >= to {
            return Err(GraphError::BackwardRoute { from, to });
        }
        Ok(())
    }

    /// Route `from`'s output into `to`'s audio input.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), GraphError> {
        self.check_route(from, to)?;
        self.slots[to.0].audio_inputs.push(from);
        Ok(())
    }

    /// Route `from`'s output into parameter `target` of `to`.
    pub fn connect_param(
        &mut self,
        from: NodeId,
        to: NodeId,
        target: ParamTarget,
    ) -> Result<(), GraphError> {
        self.check_route(from, to)?;

        let slot = &mut self.slots[to.0];
        if !slot.node.supports(target) {
            return Err(GraphError::UnsupportedParam {
                kind: slot.node.kind(),
                target,
            });
        }

        match slot.param_inputs.iter_mut().find(|(t, _)| *t == target) {
            Some((_, sources)) => sources.push(from),
            None => slot.param_inputs.push((target, vec![from])),
        }
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&ProcessingNode> {
        self.slots.get(id.0).map(|slot| &slot.node)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ProcessingNode> {
        self.slots.get_mut(id.0).map(|slot| &mut slot.node)
    }

    pub fn gain(&self, id: NodeId) -> Option<&GainNode> {
        match self.get(id) {
            Some(ProcessingNode::Gain(gain)) => Some(gain),
            _ => None,
        }
    }

    pub fn gain_mut(&mut self, id: NodeId) -> Option<&mut GainNode> {
        match self.get_mut(id) {
            Some(ProcessingNode::Gain(gain)) => Some(gain),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Every node in processing order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &ProcessingNode)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (NodeId(i), &slot.node))
    }

    /// Audio routes feeding `id`.
    pub fn inputs(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.0)
            .map(|slot| slot.audio_inputs.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of audio and parameter routes.
    pub fn route_count(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| {
                slot.audio_inputs.len()
                    + slot.param_inputs.iter().map(|(_, s)| s.len()).sum::<usize>()
            })
            .sum()
    }

    pub fn start_all(&mut self) {
        for slot in &mut self.slots {
            slot.node.start();
        }
    }

    pub fn stop_all(&mut self) {
        for slot in &mut self.slots {
            slot.node.stop();
        }
    }

    /// Render one block through every node in order.
    ///
    /// `frames` is capped at `MAX_BLOCK_SIZE`; the rendered length is
    /// returned. Never allocates.
    pub fn render(&mut self, frames: usize, ctx: &RenderCtx) -> usize {
        let n = frames.min(MAX_BLOCK_SIZE);

        for i in 0..self.slots.len() {
            let (done, rest) = self.slots.split_at_mut(i);
            let Slot {
                node,
                audio_inputs,
                param_inputs,
                output,
            } = &mut rest[0];

            for (target, sources) in param_inputs.iter() {
                let sum = &mut self.scratch[..n];
                sum.fill(0.0);
                for src in sources {
                    accumulate(sum, &done[src.0].output[..n]);
                }
                node.modulate(*target, sum);
            }

            let out = &mut output[..n];
            out.fill(0.0);
            for src in audio_inputs.iter() {
                accumulate(out, &done[src.0].output[..n]);
            }
            node.render_block(out, ctx);
        }
        n
    }

    /// Output of `id` from the last rendered block.
    pub fn output(&self, id: NodeId, frames: usize) -> &[f32] {
        self.slots
            .get(id.0)
            .map(|slot| &slot.output[..frames.min(MAX_BLOCK_SIZE)])
            .unwrap_or(&[])
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}
