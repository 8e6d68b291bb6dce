use crate::{
    dsp::noise::NoiseBuffer,
    graph::node::{GraphNode, RenderCtx},
};

/*
Buffer Player
=============

Plays a pre-rendered NoiseBuffer from start to end and wraps back around
forever. Generating two seconds of noise once and looping it costs nothing
per sample, and two seconds is long enough that the ear does not pick up
the repetition in broadband noise.

The jump from the last sample back to the first is not smoothed. For noise
this is one more random step among thousands and is not heard as a click.

A player is silent until start() and silent again after stop(). Stopping is
final: a stopped player does not restart.
*/

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayState {
    Idle,
    Playing,
    Stopped,
}

pub struct BufferPlayer {
    buffer: NoiseBuffer,
    position: usize,
    state: PlayState,
}

impl BufferPlayer {
    pub fn new(buffer: NoiseBuffer) -> Self {
        Self {
            buffer,
            position: 0,
            state: PlayState::Idle,
        }
    }

    pub fn buffer(&self) -> &NoiseBuffer {
        &self.buffer
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlayState::Playing
    }
}

impl GraphNode for BufferPlayer {
    fn render_block(&mut self, out: &mut [f32], _ctx: &RenderCtx) {
        let samples = self.buffer.samples();
        if self.state != PlayState::Playing || samples.is_empty() {
            out.fill(0.0);
            return;
        }

        let mut written = 0;
        while written < out.len() {
            if self.position >= samples.len() {
                self.position = 0;
            }

            let take = (samples.len() - self.position).min(out.len() - written);
            out[written..written + take]
                .copy_from_slice(&samples[self.position..self.position + take]);
            self.position += take;
            written += take;
        }
    }

    fn start(&mut self) {
        if self.state == PlayState::Idle {
            self.state = PlayState::Playing;
        }
    }

    fn stop(&mut self) {
        self.state = PlayState::Stopped;
    }

    fn is_active(&self) -> bool {
        self.state == PlayState::Playing
    }
}
