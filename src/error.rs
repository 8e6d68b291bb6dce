use thiserror::Error;

/// Failures of the mixer's audio plumbing.
#[derive(Debug, Error)]
pub enum MixerError {
    #[error("no default output device available")]
    NoOutputDevice,
    #[error("failed to fetch default output config")]
    DeviceConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("output sample format {0:?} is not supported (need f32)")]
    UnsupportedSampleFormat(cpal::SampleFormat),
    #[error("render command queue is full")]
    CommandQueueFull,
}
