use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`Mixer`](crate::mixer::Mixer).
///
/// Defaults give a gentle half-second fade in, quick 100 ms volume and
/// fade-out ramps, and a 200 ms grace period before a stopped chain is torn
/// down.
///
/// ```
/// use std::time::Duration;
/// use ambient_dsp::MixerConfig;
///
/// let config = MixerConfig::new()
///     .default_volume(0.3)
///     .fade_in(Duration::from_secs(1));
/// assert_eq!(config.default_volume, 0.3);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MixerConfig {
    /// Volume a category starts at when toggled on.
    pub default_volume: f32,
    /// Time constant of the fade in after a start.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub fade_in: Duration,
    /// Time constant of a volume change.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub volume_ramp: Duration,
    /// Time constant of the fade out after a stop.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub fade_out: Duration,
    /// Delay between a stop and the teardown of the chain.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub grace_delay: Duration,
    /// Length of the looped noise buffer, in seconds.
    pub buffer_seconds: f32,
    /// Capacity of the control-to-audio command queue.
    pub command_capacity: usize,
    /// Sample rate of offline render contexts.
    pub offline_sample_rate: f32,
    /// Fixed seed for noise generation; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl MixerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_volume(mut self, volume: f32) -> Self {
        self.default_volume = clamp_volume(volume);
        self
    }

    pub fn fade_in(mut self, time_constant: Duration) -> Self {
        self.fade_in = time_constant;
        self
    }

    pub fn volume_ramp(mut self, time_constant: Duration) -> Self {
        self.volume_ramp = time_constant;
        self
    }

    pub fn fade_out(mut self, time_constant: Duration) -> Self {
        self.fade_out = time_constant;
        self
    }

    pub fn grace_delay(mut self, delay: Duration) -> Self {
        self.grace_delay = delay;
        self
    }

    pub fn buffer_seconds(mut self, seconds: f32) -> Self {
        self.buffer_seconds = seconds;
        self
    }

    pub fn command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = capacity.max(1);
        self
    }

    pub fn offline_sample_rate(mut self, sample_rate: f32) -> Self {
        self.offline_sample_rate = sample_rate;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Grace delay expressed in frames at `sample_rate`.
    pub fn grace_frames(&self, sample_rate: f32) -> u64 {
        (self.grace_delay.as_secs_f64() * sample_rate as f64).round() as u64
    }
}

/// Clamp a volume into [0, 1]. NaN is treated as silence.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            default_volume: 0.5,
            fade_in: Duration::from_millis(500),
            volume_ramp: Duration::from_millis(100),
            fade_out: Duration::from_millis(100),
            grace_delay: Duration::from_millis(200),
            buffer_seconds: 2.0,
            command_capacity: 64,
            offline_sample_rate: 44_100.0,
            seed: None,
        }
    }
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MixerConfig::default();
        assert_eq!(config.default_volume, 0.5);
        assert_eq!(config.fade_in, Duration::from_millis(500));
        assert_eq!(config.grace_delay, Duration::from_millis(200));
        assert_eq!(config.command_capacity, 64);
    }

    #[test]
    fn builder_clamps() {
        let config = MixerConfig::new().default_volume(3.0).command_capacity(0);
        assert_eq!(config.default_volume, 1.0);
        assert_eq!(config.command_capacity, 1);
    }

    #[test]
    fn volume_clamp_handles_non_finite() {
        assert_eq!(clamp_volume(f32::NAN), 0.0);
        assert_eq!(clamp_volume(f32::INFINITY), 1.0);
        assert_eq!(clamp_volume(f32::NEG_INFINITY), 0.0);
        assert_eq!(clamp_volume(0.25), 0.25);
    }

    #[test]
    fn grace_in_frames() {
        let config = MixerConfig::new();
        assert_eq!(config.grace_frames(44_100.0), 8_820);
        assert_eq!(config.grace_frames(48_000.0), 9_600);
    }
}
