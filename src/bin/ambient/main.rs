//! ambient - layered noise soundscapes in the terminal
//!
//! Run with: cargo run -- [focus|rain|fire|wind|thunder]...

mod app;

use ambient_dsp::{MixerConfig, SoundCategory};
use app::App;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let initial = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<SoundCategory>())
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("usage: ambient [focus|rain|fire|wind|thunder]...")?;

    App::new(MixerConfig::default()).run(&initial)
}
