use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::MixerConfig,
    engine::{
        command::{Command, Retired},
        renderer::{Renderer, MAX_VOICES},
    },
    error::MixerError,
    MAX_BLOCK_SIZE,
};

/*
Render Context
==============

The context is the control-thread handle to a running renderer:

  control thread                         audio thread
  ──────────────                         ────────────
  RenderContext ── Command ring ──────→  Renderer
                ←─ Retired ring ───────
                ←─ frame clock (atomic) ─

Two backends:

  Device   cpal output stream; the renderer lives inside the stream callback.
           Created paused, resume() starts it.
  Offline  the caller gets the Renderer back and pulls blocks itself (tests,
           benches, rendering to a file).

Every chain handed to the renderer comes back through the retired ring
exactly once. The control side keeps the number of chains in flight at or
below the ring's capacity, so the audio thread never has to drop one.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Suspended,
    Running,
    Closed,
}

enum Backend {
    Offline,
    Device(cpal::Stream),
}

/// Control-thread handle to a renderer.
///
/// `state()` reflects what this handle has asked for. A device stream that
/// the host later suspends or loses is only reported through an error log;
/// the state keeps reading `Running` and `resume()` does not restart it.
pub struct RenderContext {
    backend: Backend,
    state: ContextState,
    sample_rate: f32,
    clock: Arc<AtomicU64>,
    commands: Producer<Command>,
    retired: Consumer<Retired>,
    retired_capacity: usize,
}

struct Channels {
    commands: Producer<Command>,
    retired: Consumer<Retired>,
    retired_capacity: usize,
    clock: Arc<AtomicU64>,
    renderer: Renderer,
}

fn channels(sample_rate: f32, capacity: usize) -> Channels {
    let (commands, command_rx) = RingBuffer::<Command>::new(capacity.max(1));
    // room for every voice plus every start that could overflow
    let retired_capacity = capacity.max(1) + MAX_VOICES;
    let (retired_tx, retired) = RingBuffer::<Retired>::new(retired_capacity);
    let clock = Arc::new(AtomicU64::new(0));
    let renderer = Renderer::new(sample_rate, command_rx, retired_tx, clock.clone());
    Channels {
        commands,
        retired,
        retired_capacity,
        clock,
        renderer,
    }
}

impl RenderContext {
    /// Context whose renderer is driven by the caller.
    pub fn offline(sample_rate: f32, command_capacity: usize) -> (Self, Renderer) {
        let Channels {
            commands,
            retired,
            retired_capacity,
            clock,
            renderer,
        } = channels(sample_rate, command_capacity);

        let ctx = Self {
            backend: Backend::Offline,
            state: ContextState::Suspended,
            sample_rate,
            clock,
            commands,
            retired,
            retired_capacity,
        };
        (ctx, renderer)
    }

    /// Open the default output device. The stream starts paused.
    pub fn open_default(config: &MixerConfig) -> Result<Self, MixerError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(MixerError::NoOutputDevice)?;
        let supported = device.default_output_config()?;

        let format = supported.sample_format();
        if format != cpal::SampleFormat::F32 {
            return Err(MixerError::UnsupportedSampleFormat(format));
        }

        let sample_rate = supported.sample_rate().0 as f32;
        let channel_count = supported.channels() as usize;

        let Channels {
            commands,
            retired,
            retired_capacity,
            clock,
            mut renderer,
        } = channels(sample_rate, config.command_capacity);

        let mut mono = vec![0.0f32; MAX_BLOCK_SIZE];
        let stream = device.build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                // mono mix fanned out to every channel
                for frames in data.chunks_mut(MAX_BLOCK_SIZE * channel_count) {
                    let block = &mut mono[..frames.len() / channel_count];
                    renderer.render(block);
                    for (frame, &sample) in frames.chunks_mut(channel_count).zip(block.iter()) {
                        frame.fill(sample);
                    }
                }
            },
            |err| tracing::error!(%err, "audio stream error"),
            None,
        )?;

        // some hosts start streams on creation
        if let Err(err) = stream.pause() {
            tracing::debug!(%err, "could not pause new stream");
        }

        tracing::info!(sample_rate, channels = channel_count, "opened output device");

        Ok(Self {
            backend: Backend::Device(stream),
            state: ContextState::Suspended,
            sample_rate,
            clock,
            commands,
            retired,
            retired_capacity,
        })
    }

    /// Start (or restart) rendering. A closed context stays closed.
    pub fn resume(&mut self) -> Result<(), MixerError> {
        if self.state != ContextState::Suspended {
            return Ok(());
        }
        if let Backend::Device(stream) = &self.backend {
            stream.play()?;
        }
        self.state = ContextState::Running;
        tracing::info!("render context running");
        Ok(())
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.backend, Backend::Offline)
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames the renderer has produced so far.
    pub fn current_frame(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    /// Render clock in seconds.
    pub fn current_time(&self) -> f64 {
        self.current_frame() as f64 / self.sample_rate as f64
    }

    pub(crate) fn send(&mut self, command: Command) -> Result<(), MixerError> {
        self.commands
            .push(command)
            .map_err(|_| MixerError::CommandQueueFull)
    }

    /// Free space in the command queue.
    pub(crate) fn command_slots(&self) -> usize {
        self.commands.slots()
    }

    /// Most chains that can be in flight at once without overflowing the
    /// retired ring.
    pub(crate) fn retired_capacity(&self) -> usize {
        self.retired_capacity
    }

    pub(crate) fn recv_retired(&mut self) -> Option<Retired> {
        self.retired.pop().ok()
    }

    /// Stop rendering for good. Pending commands are discarded.
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        if let Backend::Device(stream) = &self.backend {
            if let Err(err) = stream.pause() {
                tracing::debug!(%err, "could not pause stream on close");
            }
        }
        self.backend = Backend::Offline;
        self.state = ContextState::Closed;
        tracing::info!("render context closed");
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_starts_suspended() {
        let (mut ctx, _renderer) = RenderContext::offline(44_100.0, 8);
        assert_eq!(ctx.state(), ContextState::Suspended);
        assert!(ctx.is_offline());

        ctx.resume().unwrap();
        assert_eq!(ctx.state(), ContextState::Running);

        ctx.close();
        ctx.resume().unwrap();
        assert_eq!(ctx.state(), ContextState::Closed);
    }

    #[test]
    fn clock_follows_renderer() {
        let (ctx, mut renderer) = RenderContext::offline(44_100.0, 8);
        let mut out = vec![0.0; 4_410];
        renderer.render(&mut out);
        assert_eq!(ctx.current_frame(), 4_410);
        assert!((ctx.current_time() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn full_queue_reports_error() {
        use crate::engine::command::VoiceId;

        let (mut ctx, _renderer) = RenderContext::offline(44_100.0, 2);
        let ramp = || Command::Ramp {
            id: VoiceId::new(0),
            target: 0.0,
            time_constant: 0.1,
        };
        assert!(ctx.send(ramp()).is_ok());
        assert!(ctx.send(ramp()).is_ok());
        assert_eq!(ctx.command_slots(), 0);
        assert!(matches!(ctx.send(ramp()), Err(MixerError::CommandQueueFull)));
    }
}
