//! Real-time rendering and chain lifecycle.
//!
//! The control thread talks to the audio thread only through lock-free
//! rings: [`command::Command`]s go in, [`command::Retired`] chains come back
//! to be dropped off the audio thread.

pub mod command;
pub mod context;
pub mod lifecycle;
pub mod renderer;

pub use command::VoiceId;
pub use context::{ContextState, RenderContext};
pub use lifecycle::{Lifecycle, PlaybackPhase};
pub use renderer::{Renderer, VoiceInfo, MAX_VOICES};
