use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::stats::PlayerStats;

/// Preflop decisions needed before a player gets a tag.
pub const MIN_SAMPLE: u32 = 5;

const LOOSE_VPIP: f32 = 0.40;
const AGGRESSIVE_PFR: f32 = 0.30;
const TIGHT_VPIP: f32 = 0.15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerTag {
    Fish,
    Maniac,
    Nit,
    Reg,
    Unknown,
}

impl PlayerTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerTag::Fish => "FISH",
            PlayerTag::Maniac => "MANIAC",
            PlayerTag::Nit => "NIT",
            PlayerTag::Reg => "REG",
            PlayerTag::Unknown => "UNKNOWN",
        }
    }
}

impl Display for PlayerTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags a player from live counters. Below [`MIN_SAMPLE`] the answer is always
/// `Unknown`.
pub fn classify(stats: &PlayerStats) -> PlayerTag {
    if stats.vpip.denom < MIN_SAMPLE {
        return PlayerTag::Unknown;
    }
    let vpip = stats.vpip.num as f32 / stats.vpip.denom as f32;
    let pfr = stats.pfr.ratio().unwrap_or(0.0);

    if vpip > LOOSE_VPIP && pfr > AGGRESSIVE_PFR {
        PlayerTag::Maniac
    } else if vpip > LOOSE_VPIP {
        PlayerTag::Fish
    } else if vpip < TIGHT_VPIP {
        PlayerTag::Nit
    } else {
        PlayerTag::Reg
    }
}
