use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dsp::noise::NoiseColor;

/*
Soundscape Catalog
==================

Each soundscape is a noise color plus an ordered list of shaping stages.
The builder walks the list; adding a soundscape means adding a row here.

  focus    pink  ─→ LP 4 kHz ──────────────────────────────────→ master
  rain     white ─→ LP 800 Hz ─────────────────────────────────→ master
  fire     brown ─→ gain 1.0 ± (8 Hz × 0.1 + 0.5 Hz × 0.2) ─────→ master
  wind     pink  ─→ BP 400 Hz ± (0.15 Hz × 300), Q 1 ──────────→ master
  thunder  brown ─→ LP 180 Hz ─→ gain 0.6 ± (0.1 Hz × 0.4) ─────→ master
*/

/// One soundscape the mixer can play.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundCategory {
    Focus,
    Rain,
    Fire,
    Wind,
    Thunder,
}

impl SoundCategory {
    pub const ALL: [SoundCategory; 5] = [
        SoundCategory::Focus,
        SoundCategory::Rain,
        SoundCategory::Fire,
        SoundCategory::Wind,
        SoundCategory::Thunder,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SoundCategory::Focus => "focus",
            SoundCategory::Rain => "rain",
            SoundCategory::Fire => "fire",
            SoundCategory::Wind => "wind",
            SoundCategory::Thunder => "thunder",
        }
    }

    /// Position in `ALL`, handy for fixed-size per-category tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The chain recipe for this soundscape.
    pub fn spec(self) -> &'static ChainSpec {
        match self {
            SoundCategory::Focus => &FOCUS,
            SoundCategory::Rain => &RAIN,
            SoundCategory::Fire => &FIRE,
            SoundCategory::Wind => &WIND,
            SoundCategory::Thunder => &THUNDER,
        }
    }
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown soundscape '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for SoundCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoundCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A sine LFO and how far it pushes its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LfoSpec {
    pub frequency: f32,
    pub depth: f32,
}

/// One shaping stage between the noise source and the master gain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageSpec {
    /// Fixed lowpass.
    Lowpass { cutoff: f32 },
    /// Bandpass whose center is swept by an LFO.
    SweptBandpass { center: f32, q: f32, sweep: LfoSpec },
    /// Gain stage around `base`, wobbled by the sum of its LFOs.
    Tremolo {
        base: f32,
        lfos: &'static [LfoSpec],
    },
}

/// Recipe for a full signal chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSpec {
    pub color: NoiseColor,
    pub stages: &'static [StageSpec],
}

impl ChainSpec {
    /// Number of nodes the builder creates for this recipe, master included.
    pub fn node_count(&self) -> usize {
        let stages: usize = self
            .stages
            .iter()
            .map(|stage| match stage {
                StageSpec::Lowpass { .. } => 1,
                // filter + lfo + depth
                StageSpec::SweptBandpass { .. } => 3,
                // gain + (lfo + depth) per modulator
                StageSpec::Tremolo { lfos, .. } => 1 + 2 * lfos.len(),
            })
            .sum();
        // player + stages + master
        1 + stages + 1
    }
}

const FOCUS: ChainSpec = ChainSpec {
    color: NoiseColor::Pink,
    stages: &[StageSpec::Lowpass { cutoff: 4_000.0 }],
};

const RAIN: ChainSpec = ChainSpec {
    color: NoiseColor::White,
    stages: &[StageSpec::Lowpass { cutoff: 800.0 }],
};

const FIRE: ChainSpec = ChainSpec {
    color: NoiseColor::Brown,
    stages: &[StageSpec::Tremolo {
        base: 1.0,
        lfos: &[
            // flicker
            LfoSpec {
                frequency: 8.0,
                depth: 0.1,
            },
            // swell
            LfoSpec {
                frequency: 0.5,
                depth: 0.2,
            },
        ],
    }],
};

const WIND: ChainSpec = ChainSpec {
    color: NoiseColor::Pink,
    stages: &[StageSpec::SweptBandpass {
        center: 400.0,
        q: 1.0,
        sweep: LfoSpec {
            frequency: 0.15,
            depth: 300.0,
        },
    }],
};

const THUNDER: ChainSpec = ChainSpec {
    color: NoiseColor::Brown,
    stages: &[
        StageSpec::Lowpass { cutoff: 180.0 },
        StageSpec::Tremolo {
            base: 0.6,
            lfos: &[LfoSpec {
                frequency: 0.1,
                depth: 0.4,
            }],
        },
    ],
};
