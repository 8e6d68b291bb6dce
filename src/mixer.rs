use std::{
    collections::BTreeMap,
    thread,
    time::{Duration, Instant},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chain::SoundCategory,
    config::{clamp_volume, MixerConfig},
    engine::{
        context::RenderContext,
        lifecycle::{Lifecycle, PlaybackPhase},
        renderer::Renderer,
    },
};

/// Target volume of every playing category. Absent means silent.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixerState {
    volumes: BTreeMap<SoundCategory, f32>,
}

impl MixerState {
    pub fn volume(&self, category: SoundCategory) -> Option<f32> {
        self.volumes.get(&category).copied()
    }

    pub fn is_active(&self, category: SoundCategory) -> bool {
        self.volumes.contains_key(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoundCategory, f32)> + '_ {
        self.volumes.iter().map(|(&c, &v)| (c, v))
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }
}

impl<const N: usize> From<[(SoundCategory, f32); N]> for MixerState {
    fn from(entries: [(SoundCategory, f32); N]) -> Self {
        Self {
            volumes: BTreeMap::from(entries),
        }
    }
}

enum Engine {
    Unopened,
    Ready(Lifecycle),
    Unavailable,
}

/// Ambient noise mixer: up to five soundscapes layered at their own volumes.
///
/// ```no_run
/// use ambient_dsp::{Mixer, MixerConfig, SoundCategory};
///
/// let mut mixer = Mixer::new(MixerConfig::default());
/// mixer.toggle(SoundCategory::Rain);
/// mixer.set_volume(SoundCategory::Rain, 0.2);
/// ```
///
/// The audio device is opened on the first toggle. If that fails the mixer
/// logs a warning and stays silent for good; every call becomes a no-op.
///
/// Every operation first releases chains the renderer is done with, so
/// stopped categories settle back to inactive without extra calls.
pub struct Mixer {
    config: MixerConfig,
    engine: Engine,
    state: MixerState,
}

impl Mixer {
    /// Mixer on the default output device, opened lazily.
    pub fn new(config: MixerConfig) -> Self {
        Self {
            config,
            engine: Engine::Unopened,
            state: MixerState::default(),
        }
    }

    /// Mixer on an already created context.
    pub fn with_context(ctx: RenderContext, config: MixerConfig) -> Self {
        Self {
            engine: Engine::Ready(Lifecycle::new(ctx, config.clone())),
            config,
            state: MixerState::default(),
        }
    }

    /// Mixer on an offline context; the caller drives the returned renderer.
    pub fn offline(config: MixerConfig) -> (Self, Renderer) {
        let (ctx, renderer) =
            RenderContext::offline(config.offline_sample_rate, config.command_capacity);
        (Self::with_context(ctx, config), renderer)
    }

    fn lifecycle(&mut self) -> Option<&mut Lifecycle> {
        if let Engine::Unopened = self.engine {
            self.engine = match RenderContext::open_default(&self.config) {
                Ok(ctx) => Engine::Ready(Lifecycle::new(ctx, self.config.clone())),
                Err(err) => {
                    tracing::warn!(%err, "audio output unavailable, mixer disabled");
                    Engine::Unavailable
                }
            };
        }

        match &mut self.engine {
            Engine::Ready(lifecycle) => Some(lifecycle),
            _ => None,
        }
    }

    /// Start `category` at the default volume, or stop it if it is playing.
    ///
    /// Returns whether the category is playing afterwards.
    pub fn toggle(&mut self, category: SoundCategory) -> bool {
        let volume = clamp_volume(self.config.default_volume);
        if self.lifecycle().is_none() {
            return false;
        }
        self.poll();

        let was_active = self.state.is_active(category);
        let Engine::Ready(lifecycle) = &mut self.engine else {
            return false;
        };

        if was_active {
            if lifecycle.stop(category) {
                self.state.volumes.remove(&category);
            }
        } else if lifecycle.start(category, volume) {
            self.state.volumes.insert(category, volume);
        }

        self.state.is_active(category)
    }

    /// Ramp a playing category to `volume` (clamped to [0, 1]).
    ///
    /// Returns `false`, changing nothing, if the category is not playing.
    /// NaN counts as silence.
    pub fn set_volume(&mut self, category: SoundCategory, volume: f32) -> bool {
        self.poll();
        if !self.state.is_active(category) {
            tracing::debug!(%category, "volume change for inactive category ignored");
            return false;
        }

        let volume = clamp_volume(volume);
        let applied = match &mut self.engine {
            Engine::Ready(lifecycle) => lifecycle.set_volume(category, volume),
            _ => false,
        };
        if applied {
            self.state.volumes.insert(category, volume);
        }
        applied
    }

    /// Stop every playing category.
    pub fn teardown_all(&mut self) {
        self.poll();
        if let Engine::Ready(lifecycle) = &mut self.engine {
            lifecycle.teardown_all();
            for category in SoundCategory::ALL {
                if lifecycle.phase(category) != PlaybackPhase::Active {
                    self.state.volumes.remove(&category);
                }
            }
        }
    }

    pub fn state(&self) -> &MixerState {
        &self.state
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// `false` once opening the audio output has failed.
    pub fn is_available(&self) -> bool {
        !matches!(self.engine, Engine::Unavailable)
    }

    pub fn phase(&self, category: SoundCategory) -> PlaybackPhase {
        match &self.engine {
            Engine::Ready(lifecycle) => lifecycle.phase(category),
            _ => PlaybackPhase::Inactive,
        }
    }

    pub fn context(&self) -> Option<&RenderContext> {
        match &self.engine {
            Engine::Ready(lifecycle) => Some(lifecycle.context()),
            _ => None,
        }
    }

    /// Release chains the renderer has finished with.
    ///
    /// Returns the number of nodes released. The other operations do this
    /// on their own; call it directly to release chains while idle.
    pub fn poll(&mut self) -> usize {
        let Engine::Ready(lifecycle) = &mut self.engine else {
            return 0;
        };

        let released = lifecycle.poll();
        // starts the renderer had to reject
        self.state
            .volumes
            .retain(|&category, _| lifecycle.phase(category) == PlaybackPhase::Active);
        released
    }

    /// Stop everything and shut the audio output down.
    ///
    /// On a device this waits (briefly) for the fades to finish so the
    /// output does not cut off mid-sound.
    pub fn close(mut self) {
        self.teardown_all();

        if let Engine::Ready(lifecycle) = &mut self.engine {
            if !lifecycle.context().is_offline() {
                let deadline = Instant::now() + self.config.grace_delay + Duration::from_secs(1);
                while lifecycle.outstanding() > 0 && Instant::now() < deadline {
                    thread::sleep(Duration::from_millis(10));
                    lifecycle.poll();
                }
            }
            lifecycle.poll();
            lifecycle.context_mut().close();
        }
        self.engine = Engine::Unavailable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixer() -> (Mixer, Renderer) {
        Mixer::offline(MixerConfig::new().seed(1).buffer_seconds(0.25))
    }

    #[test]
    fn toggle_inserts_default_volume() {
        let (mut mixer, _renderer) = mixer();
        assert!(mixer.toggle(SoundCategory::Rain));
        assert_eq!(mixer.state(), &MixerState::from([(SoundCategory::Rain, 0.5)]));
        assert!(!mixer.toggle(SoundCategory::Rain));
        assert!(mixer.state().is_empty());
    }

    #[test]
    fn set_volume_clamps_and_ignores_inactive() {
        let (mut mixer, _renderer) = mixer();
        assert!(!mixer.set_volume(SoundCategory::Wind, 0.3));
        assert!(mixer.state().is_empty());

        mixer.toggle(SoundCategory::Wind);
        assert!(mixer.set_volume(SoundCategory::Wind, -1.0));
        assert_eq!(mixer.state().volume(SoundCategory::Wind), Some(0.0));
        assert!(mixer.set_volume(SoundCategory::Wind, 7.0));
        assert_eq!(mixer.state().volume(SoundCategory::Wind), Some(1.0));
    }

    #[test]
    fn teardown_all_clears_state() {
        let (mut mixer, _renderer) = mixer();
        mixer.toggle(SoundCategory::Fire);
        mixer.toggle(SoundCategory::Focus);
        assert_eq!(mixer.state().len(), 2);

        mixer.teardown_all();
        assert!(mixer.state().is_empty());
        assert_eq!(mixer.phase(SoundCategory::Fire), PlaybackPhase::Stopping);
    }

    #[test]
    fn offline_mixer_is_available() {
        let (mixer, _renderer) = mixer();
        assert!(mixer.is_available());
        assert_eq!(mixer.phase(SoundCategory::Thunder), PlaybackPhase::Inactive);
        assert!(mixer.context().is_some());
    }

    #[test]
    fn nan_volume_is_silence_not_poison() {
        let (mut mixer, mut renderer) = mixer();
        mixer.toggle(SoundCategory::Rain);
        mixer.toggle(SoundCategory::Fire);
        let mut out = vec![0.0; 22_050];
        renderer.render(&mut out);

        assert!(mixer.set_volume(SoundCategory::Rain, f32::NAN));
        assert_eq!(mixer.state().volume(SoundCategory::Rain), Some(0.0));
        renderer.render(&mut out);
        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|&s| s != 0.0));

        assert!(mixer.set_volume(SoundCategory::Rain, 0.5));
        renderer.render(&mut out);
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn toggle_clamps_configured_default_volume() {
        let config = MixerConfig {
            default_volume: 3.0,
            ..MixerConfig::new().seed(1).buffer_seconds(0.25)
        };
        let (mut mixer, _renderer) = Mixer::offline(config);
        assert!(mixer.toggle(SoundCategory::Rain));
        assert_eq!(mixer.state().volume(SoundCategory::Rain), Some(1.0));
    }

    #[test]
    fn stopped_category_settles_without_explicit_poll() {
        let (mut mixer, mut renderer) = mixer();
        let rain = SoundCategory::Rain;
        // longer than the 200 ms grace delay
        let mut out = vec![0.0; 11_025];

        for _ in 0..100 {
            assert!(mixer.toggle(rain));
            assert!(!mixer.toggle(rain));
            renderer.render(&mut out);
        }

        assert!(!mixer.set_volume(rain, 0.3));
        assert_eq!(mixer.phase(rain), PlaybackPhase::Inactive);
        assert_eq!(renderer.voice_count(), 0);
        let Engine::Ready(lifecycle) = &mixer.engine else {
            panic!("offline mixer should be ready");
        };
        assert_eq!(lifecycle.outstanding(), 0);
        assert_eq!(mixer.poll(), 0);
    }

    #[test]
    fn unavailable_output_leaves_everything_inert() {
        let (mut mixer, _renderer) = mixer();
        mixer.engine = Engine::Unavailable;

        assert!(!mixer.is_available());
        assert!(!mixer.toggle(SoundCategory::Thunder));
        assert!(!mixer.set_volume(SoundCategory::Thunder, 0.4));
        assert!(mixer.state().is_empty());
        assert_eq!(mixer.phase(SoundCategory::Thunder), PlaybackPhase::Inactive);
        assert!(mixer.context().is_none());
        assert_eq!(mixer.poll(), 0);

        mixer.teardown_all();
        mixer.close();
    }

    #[test]
    fn close_after_toggle_does_not_hang() {
        let (mut mixer, _renderer) = mixer();
        mixer.toggle(SoundCategory::Rain);
        mixer.close();
    }
}
