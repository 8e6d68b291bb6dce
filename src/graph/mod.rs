//! Processing nodes and the arena that wires them into a chain.
//!
//! Nodes wrap the low-level DSP primitives with what a chain needs: start and
//! stop, block-based rendering, and parameter inputs for modulation.

/// Per-chain node storage with audio and parameter routes.
pub mod arena;
/// Lowpass and bandpass filter node.
pub mod filter;
/// Smoothed, modulatable gain stage.
pub mod gain;
/// Low frequency oscillators for parameter modulation.
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Looping noise buffer source.
pub mod player;

pub use arena::{GraphError, NodeArena, NodeId, NodeKind, ParamTarget, ProcessingNode};
pub use node::{GraphNode, Modulatable, RenderCtx};
