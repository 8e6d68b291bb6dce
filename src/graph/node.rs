/// Context passed to graph nodes during rendering
///
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - frame: Render-clock position of the first sample in the block
pub struct RenderCtx {
    pub sample_rate: f32,
    pub frame: u64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            frame: 0,
        }
    }

    pub fn at_frame(sample_rate: f32, frame: u64) -> Self {
        Self { sample_rate, frame }
    }

    /// Clock position in seconds.
    pub fn time(&self) -> f64 {
        self.frame as f64 / self.sample_rate as f64
    }
}

/// Trait for nodes that expose parameters to modulation inputs
pub trait Modulatable: Send {
    type Param: Copy + Send;

    fn get_param(&self, param: Self::Param) -> f32;

    /// Apply one block of summed modulation to `param`.
    ///
    /// `modulation` holds one value per sample of the block about to be
    /// rendered; nodes choose whether they follow it per sample or per block.
    fn apply_modulation(&mut self, param: Self::Param, modulation: &[f32]);
}

/// Core trait for audio processing graph nodes
///
/// `out` arrives holding the node's summed audio input (or silence for
/// sources) and is processed in place.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Begin producing output (sources and oscillators).
    ///
    /// Default implementation does nothing (processors are always live).
    fn start(&mut self) {}

    /// Stop producing output. Stopping twice is harmless.
    fn stop(&mut self) {}

    /// Check if this node is still producing sound
    fn is_active(&self) -> bool {
        true
    }
}
