use std::fmt;

use crate::chain::{Chain, SoundCategory};

/// Identity of one chain instance.
///
/// Ids are never reused, so a command aimed at a chain that has already been
/// torn down (or replaced by a newer chain of the same category) misses
/// harmlessly instead of touching the wrong sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(u64);

impl VoiceId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Control thread to audio thread.
pub enum Command {
    /// Add a started chain and ramp its master toward `volume`.
    Start {
        id: VoiceId,
        chain: Box<Chain>,
        volume: f32,
        time_constant: f32,
    },
    /// Retarget a playing chain's master gain.
    Ramp {
        id: VoiceId,
        target: f32,
        time_constant: f32,
    },
    /// Fade a chain to silence and tear it down `grace_frames` later.
    Stop {
        id: VoiceId,
        time_constant: f32,
        grace_frames: u64,
    },
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Start { id, chain, volume, .. } => f
                .debug_struct("Start")
                .field("id", id)
                .field("category", &chain.category())
                .field("volume", volume)
                .finish(),
            Command::Ramp { id, target, .. } => f
                .debug_struct("Ramp")
                .field("id", id)
                .field("target", target)
                .finish(),
            Command::Stop { id, grace_frames, .. } => f
                .debug_struct("Stop")
                .field("id", id)
                .field("grace_frames", grace_frames)
                .finish(),
        }
    }
}

/// Audio thread to control thread: a chain that has been torn down.
///
/// The chain travels back so that its memory is released off the audio
/// thread.
pub struct Retired {
    pub id: VoiceId,
    pub category: SoundCategory,
    pub chain: Box<Chain>,
}

impl fmt::Debug for Retired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retired")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("nodes", &self.chain.node_count())
            .finish()
    }
}
