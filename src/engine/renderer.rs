use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use rtrb::{Consumer, Producer};

use crate::{
    chain::{Chain, SoundCategory},
    engine::command::{Command, Retired, VoiceId},
    graph::node::RenderCtx,
    MAX_BLOCK_SIZE,
};

/// Most chains the renderer mixes at once.
///
/// Five categories, each with at most one playing chain plus whatever is
/// still fading out after a quick stop/start, fit comfortably.
pub const MAX_VOICES: usize = 16;

struct Voice {
    id: VoiceId,
    chain: Box<Chain>,
    teardown_at: Option<u64>,
}

/// Snapshot of one voice, for inspection off the hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceInfo {
    pub id: VoiceId,
    pub category: SoundCategory,
    pub node_count: usize,
    pub master_gain: f32,
    pub master_target: f32,
    pub teardown_at: Option<u64>,
}

/// Audio-thread half of a render context.
///
/// Drains commands, mixes every live chain, and retires chains whose
/// teardown deadline has passed. Voice storage is allocated up front;
/// `render` neither allocates nor frees.
pub struct Renderer {
    sample_rate: f32,
    commands: Consumer<Command>,
    retired: Producer<Retired>,
    voices: Vec<Voice>,
    clock: Arc<AtomicU64>,
    frame: u64,
}

impl Renderer {
    pub(crate) fn new(
        sample_rate: f32,
        commands: Consumer<Command>,
        retired: Producer<Retired>,
        clock: Arc<AtomicU64>,
    ) -> Self {
        Self {
            sample_rate,
            commands,
            retired,
            voices: Vec::with_capacity(MAX_VOICES),
            clock,
            frame: 0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames rendered so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Fill `out` with the mono mix of every live chain.
    pub fn render(&mut self, out: &mut [f32]) {
        self.drain_commands();

        for block in out.chunks_mut(MAX_BLOCK_SIZE) {
            block.fill(0.0);
            let ctx = RenderCtx::at_frame(self.sample_rate, self.frame);
            for voice in &mut self.voices {
                voice.chain.mix_into(block, &ctx);
            }
            self.frame += block.len() as u64;
            self.retire_due();
        }

        self.clock.store(self.frame, Ordering::Release);
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                Command::Start {
                    id,
                    mut chain,
                    volume,
                    time_constant,
                } => {
                    if self.voices.len() < MAX_VOICES {
                        chain.set_master_target(volume, time_constant);
                        self.voices.push(Voice {
                            id,
                            chain,
                            teardown_at: None,
                        });
                    } else {
                        self.retire(id, chain);
                    }
                }
                Command::Ramp {
                    id,
                    target,
                    time_constant,
                } => {
                    if let Some(voice) = self.find_live(id) {
                        voice.chain.set_master_target(target, time_constant);
                    }
                }
                Command::Stop {
                    id,
                    time_constant,
                    grace_frames,
                } => {
                    let deadline = self.frame + grace_frames;
                    if let Some(voice) = self.find_live(id) {
                        voice.chain.set_master_target(0.0, time_constant);
                        voice.teardown_at = Some(deadline);
                    }
                }
            }
        }
    }

    // voices already scheduled for teardown ignore further ramps and stops
    fn find_live(&mut self, id: VoiceId) -> Option<&mut Voice> {
        self.voices
            .iter_mut()
            .find(|v| v.id == id && v.teardown_at.is_none())
    }

    fn retire_due(&mut self) {
        let now = self.frame;
        let mut i = 0;
        while i < self.voices.len() {
            if self.voices[i].teardown_at.is_some_and(|at| at <= now) {
                let voice = self.voices.swap_remove(i);
                self.retire(voice.id, voice.chain);
            } else {
                i += 1;
            }
        }
    }

    fn retire(&mut self, id: VoiceId, mut chain: Box<Chain>) {
        chain.stop();
        let category = chain.category();
        // the control side never has more chains in flight than the ring holds
        let _ = self.retired.push(Retired {
            id,
            category,
            chain,
        });
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn voices(&self) -> impl Iterator<Item = VoiceInfo> + '_ {
        self.voices.iter().map(|v| VoiceInfo {
            id: v.id,
            category: v.chain.category(),
            node_count: v.chain.node_count(),
            master_gain: v.chain.master_gain(),
            master_target: v.chain.master_target(),
            teardown_at: v.teardown_at,
        })
    }

    pub fn voice(&self, id: VoiceId) -> Option<VoiceInfo> {
        self.voices().find(|v| v.id == id)
    }

    /// Nodes owned by live chains of `category`.
    pub fn node_count(&self, category: SoundCategory) -> usize {
        self.voices()
            .filter(|v| v.category == category)
            .map(|v| v.node_count)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::ChainBuilder;
    use rand::{rngs::StdRng, SeedableRng};
    use rtrb::RingBuffer;

    const SR: f32 = 48_000.0;

    struct Rig {
        renderer: Renderer,
        tx: Producer<Command>,
        rx: Consumer<Retired>,
        clock: Arc<AtomicU64>,
        rng: StdRng,
    }

    fn rig() -> Rig {
        let (tx, commands) = RingBuffer::new(64);
        let (retired, rx) = RingBuffer::new(64);
        let clock = Arc::new(AtomicU64::new(0));
        Rig {
            renderer: Renderer::new(SR, commands, retired, clock.clone()),
            tx,
            rx,
            clock,
            rng: StdRng::seed_from_u64(11),
        }
    }

    impl Rig {
        fn start(&mut self, id: u64, category: SoundCategory, volume: f32) -> VoiceId {
            let id = VoiceId::new(id);
            let mut chain = ChainBuilder::new(SR, 0.5)
                .build(category, &mut self.rng)
                .unwrap();
            chain.start();
            self.tx
                .push(Command::Start {
                    id,
                    chain: Box::new(chain),
                    volume,
                    time_constant: 0.01,
                })
                .unwrap();
            id
        }

        fn run(&mut self, frames: usize) -> Vec<f32> {
            let mut out = vec![0.0; frames];
            self.renderer.render(&mut out);
            out
        }
    }

    #[test]
    fn silent_without_voices() {
        let mut rig = rig();
        let out = rig.run(4096);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(rig.clock.load(Ordering::Acquire), 4096);
    }

    #[test]
    fn start_fades_in_toward_volume() {
        let mut rig = rig();
        let id = rig.start(1, SoundCategory::Rain, 0.5);
        let out = rig.run(SR as usize / 10);

        assert!(out.iter().any(|&s| s != 0.0));
        let info = rig.renderer.voice(id).unwrap();
        assert_eq!(info.master_target, 0.5);
        assert!((info.master_gain - 0.5).abs() < 1e-3);
        assert_eq!(info.node_count, 3);
    }

    #[test]
    fn ramp_retargets_only_its_voice() {
        let mut rig = rig();
        let fire = rig.start(1, SoundCategory::Fire, 0.5);
        let thunder = rig.start(2, SoundCategory::Thunder, 0.5);
        rig.run(256);

        rig.tx
            .push(Command::Ramp {
                id: fire,
                target: 0.2,
                time_constant: 0.1,
            })
            .unwrap();
        rig.run(256);

        assert_eq!(rig.renderer.voice(fire).unwrap().master_target, 0.2);
        assert_eq!(rig.renderer.voice(thunder).unwrap().master_target, 0.5);
    }

    #[test]
    fn stop_retires_after_grace() {
        let mut rig = rig();
        let id = rig.start(1, SoundCategory::Wind, 0.5);
        rig.run(1024);

        rig.tx
            .push(Command::Stop {
                id,
                time_constant: 0.1,
                grace_frames: 9_600,
            })
            .unwrap();
        rig.run(1024);
        let info = rig.renderer.voice(id).unwrap();
        assert_eq!(info.master_target, 0.0);
        assert_eq!(info.teardown_at, Some(1024 + 9_600));
        assert!(rig.rx.pop().is_err());

        rig.run(9_600);
        assert_eq!(rig.renderer.voice_count(), 0);

        let retired = rig.rx.pop().unwrap();
        assert_eq!(retired.id, id);
        assert_eq!(retired.category, SoundCategory::Wind);
        assert!(retired.chain.is_stopped());
    }

    #[test]
    fn commands_for_unknown_voices_are_ignored() {
        let mut rig = rig();
        rig.tx
            .push(Command::Stop {
                id: VoiceId::new(99),
                time_constant: 0.1,
                grace_frames: 0,
            })
            .unwrap();
        rig.run(64);
        assert_eq!(rig.renderer.voice_count(), 0);
        assert!(rig.rx.pop().is_err());
    }

    #[test]
    fn overflow_start_is_retired_at_once() {
        let mut rig = rig();
        for i in 0..MAX_VOICES as u64 {
            rig.start(i, SoundCategory::Focus, 0.1);
        }
        rig.run(64);
        let extra = rig.start(100, SoundCategory::Focus, 0.1);
        rig.run(64);

        assert_eq!(rig.renderer.voice_count(), MAX_VOICES);
        assert_eq!(rig.rx.pop().unwrap().id, extra);
    }

    #[test]
    fn restart_during_fade_keeps_both_voices() {
        let mut rig = rig();
        let old = rig.start(1, SoundCategory::Rain, 0.5);
        rig.run(512);
        rig.tx
            .push(Command::Stop {
                id: old,
                time_constant: 0.1,
                grace_frames: 4_800,
            })
            .unwrap();
        let new = rig.start(2, SoundCategory::Rain, 0.5);
        rig.run(512);

        assert_eq!(rig.renderer.voice_count(), 2);
        assert_eq!(rig.renderer.node_count(SoundCategory::Rain), 6);

        rig.run(4_800);
        assert!(rig.renderer.voice(old).is_none());
        assert!(rig.renderer.voice(new).is_some());
        assert_eq!(rig.renderer.node_count(SoundCategory::Rain), 3);
    }
}
