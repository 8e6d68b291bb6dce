use rand::{rngs::StdRng, SeedableRng};

use crate::{
    chain::{ChainBuilder, SoundCategory},
    config::{clamp_volume, MixerConfig},
    engine::{
        command::{Command, VoiceId},
        context::RenderContext,
    },
};

/*
Playback Lifecycle
==================

Per category:

            start                      stop
  Inactive ───────→ Starting ──→ Active ─────→ Stopping ──(grace + poll)──→ Inactive
                                   ▲                │
                                   └──── start ─────┘   (new chain; the old
                                                         one keeps fading)

Starting covers building the chain and handing it to the renderer. A chain
is Active from the moment the renderer owns it; the fade in happens on the
audio side. Stopping lasts until the renderer has torn the chain down and
sent it back to be dropped here.

Every chain carries its own VoiceId. Commands address ids, not categories,
so a stop aimed at an old chain never touches its replacement.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackPhase {
    Inactive,
    Starting,
    Active,
    Stopping,
}

#[derive(Debug, Default)]
struct TrackSlot {
    active: Option<VoiceId>,
    fading: Vec<VoiceId>,
}

impl TrackSlot {
    fn phase(&self) -> PlaybackPhase {
        match (self.active, self.fading.is_empty()) {
            (Some(_), _) => PlaybackPhase::Active,
            (None, false) => PlaybackPhase::Stopping,
            (None, true) => PlaybackPhase::Inactive,
        }
    }
}

/// Control-side owner of the render context and of every category's chains.
pub struct Lifecycle {
    ctx: RenderContext,
    builder: ChainBuilder,
    rng: StdRng,
    config: MixerConfig,
    grace_frames: u64,
    next_id: u64,
    slots: [TrackSlot; SoundCategory::ALL.len()],
}

impl Lifecycle {
    pub fn new(ctx: RenderContext, config: MixerConfig) -> Self {
        let sample_rate = ctx.sample_rate();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            builder: ChainBuilder::new(sample_rate, config.buffer_seconds),
            grace_frames: config.grace_frames(sample_rate),
            ctx,
            rng,
            config,
            next_id: 0,
            slots: Default::default(),
        }
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.ctx
    }

    pub fn phase(&self, category: SoundCategory) -> PlaybackPhase {
        self.slots[category.index()].phase()
    }

    /// Id of the chain currently playing `category`, if any.
    pub fn active_voice(&self, category: SoundCategory) -> Option<VoiceId> {
        self.slots[category.index()].active
    }

    /// Ids of `category`'s chains that are fading out.
    pub fn fading_voices(&self, category: SoundCategory) -> &[VoiceId] {
        &self.slots[category.index()].fading
    }

    /// Chains handed to the renderer and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.slots
            .iter()
            .map(|slot| slot.active.iter().count() + slot.fading.len())
            .sum()
    }

    fn allocate_id(&mut self) -> VoiceId {
        let id = VoiceId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Build and start `category`'s chain, fading in toward `volume`.
    ///
    /// Returns whether the category is playing afterwards. Does nothing if
    /// it already is. Refuses while as many chains are in flight as the
    /// retired ring can hold; `poll` frees room.
    pub fn start(&mut self, category: SoundCategory, volume: f32) -> bool {
        if self.phase(category) == PlaybackPhase::Active {
            return true;
        }

        let in_flight = self.outstanding();
        if in_flight >= self.ctx.retired_capacity() {
            tracing::warn!(%category, in_flight, "too many chains awaiting release, start refused");
            return false;
        }

        if let Err(err) = self.ctx.resume() {
            tracing::warn!(%category, %err, "could not resume render context");
            return false;
        }

        tracing::debug!(%category, phase = ?PlaybackPhase::Starting, "building chain");
        let mut chain = match self.builder.build(category, &mut self.rng) {
            Ok(chain) => chain,
            Err(err) => {
                tracing::warn!(%category, %err, "chain build failed, staying silent");
                return false;
            }
        };
        chain.start();
        let nodes = chain.node_count();

        let id = self.allocate_id();
        let volume = clamp_volume(volume);
        let command = Command::Start {
            id,
            chain: Box::new(chain),
            volume,
            time_constant: self.config.fade_in.as_secs_f32(),
        };

        if let Err(err) = self.ctx.send(command) {
            tracing::warn!(%category, %err, "dropping start");
            return false;
        }

        self.slots[category.index()].active = Some(id);
        tracing::debug!(%category, %id, volume, nodes, "chain active");
        true
    }

    /// Retarget the playing chain's volume. Returns whether it was applied.
    pub fn set_volume(&mut self, category: SoundCategory, volume: f32) -> bool {
        let Some(id) = self.slots[category.index()].active else {
            return false;
        };

        let command = Command::Ramp {
            id,
            target: clamp_volume(volume),
            time_constant: self.config.volume_ramp.as_secs_f32(),
        };
        match self.ctx.send(command) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%category, %err, "dropping volume change");
                false
            }
        }
    }

    /// Fade the playing chain out and schedule its teardown.
    ///
    /// Returns whether the category is no longer playing afterwards.
    pub fn stop(&mut self, category: SoundCategory) -> bool {
        let Some(id) = self.slots[category.index()].active else {
            return true;
        };

        let command = Command::Stop {
            id,
            time_constant: self.config.fade_out.as_secs_f32(),
            grace_frames: self.grace_frames,
        };
        if let Err(err) = self.ctx.send(command) {
            tracing::warn!(%category, %err, "dropping stop");
            return false;
        }

        let slot = &mut self.slots[category.index()];
        slot.active = None;
        slot.fading.push(id);
        tracing::debug!(%category, %id, phase = ?PlaybackPhase::Stopping, "chain fading out");
        true
    }

    /// Stop every playing category.
    pub fn teardown_all(&mut self) {
        for category in SoundCategory::ALL {
            self.stop(category);
        }
    }

    /// Collect chains the renderer has torn down and drop them.
    ///
    /// Returns the number of nodes released.
    pub fn poll(&mut self) -> usize {
        let mut released = 0;

        while let Some(retired) = self.ctx.recv_retired() {
            let slot = &mut self.slots[retired.category.index()];
            slot.fading.retain(|&id| id != retired.id);
            // a start the renderer had no room for
            if slot.active == Some(retired.id) {
                tracing::warn!(category = %retired.category, id = %retired.id, "renderer full, start rejected");
                slot.active = None;
            }

            let nodes = retired.chain.node_count();
            released += nodes;
            tracing::debug!(
                category = %retired.category,
                id = %retired.id,
                nodes,
                phase = ?slot.phase(),
                "chain released"
            );
        }

        released
    }
}
