//! Static preflop range charts keyed by position.

use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::Card;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    Utg,
    Mp,
    Hj,
    Co,
    Btn,
    Sb,
    Bb,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Utg => "UTG",
            Position::Mp => "MP",
            Position::Hj => "HJ",
            Position::Co => "CO",
            Position::Btn => "BTN",
            Position::Sb => "SB",
            Position::Bb => "BB",
        }
    }

    pub fn is_late(self) -> bool {
        matches!(self, Position::Btn | Position::Co)
    }

    /// Maps a scraped seat label onto a chart position. A missing label is
    /// read as the button; labels we cannot place give `None`.
    pub fn normalize(label: Option<&str>) -> Option<Position> {
        let Some(label) = label else {
            return Some(Position::Btn);
        };
        let mut cleaned = label.trim().to_lowercase();
        if let Some((head, tail)) = cleaned.rsplit_once('_')
            && !tail.is_empty()
            && tail.chars().all(|c| c.is_ascii_digit())
        {
            cleaned = head.to_string();
        }
        if let Some(rest) = cleaned.strip_prefix("seat")
            && rest.chars().all(|c| c.is_ascii_digit())
        {
            return Some(Position::Btn);
        }
        match cleaned.trim() {
            "button" | "btn" | "d" | "dealer" | "unknown" => Some(Position::Btn),
            "cutoff" | "co" => Some(Position::Co),
            "hijack" | "hj" => Some(Position::Hj),
            "sb" | "small blind" | "small_blind" => Some(Position::Sb),
            "bb" | "big blind" | "big_blind" => Some(Position::Bb),
            "utg" | "under the gun" => Some(Position::Utg),
            "mp" | "middle position" => Some(Position::Mp),
            _ => None,
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical two-card descriptor: higher rank first, `s`/`o` suffix, pairs bare
/// (`AKo`, `T9s`, `QQ`).
pub fn canonical_hand(cards: &[Card]) -> Option<String> {
    let [first, second] = cards.get(..2)? else {
        return None;
    };
    let (high, low) = if first.rank >= second.rank {
        (first, second)
    } else {
        (second, first)
    };
    if high.rank == low.rank {
        return Some(format!("{}{}", high.rank, low.rank));
    }
    let suffix = if high.suit == low.suit { 's' } else { 'o' };
    Some(format!("{}{}{}", high.rank, low.rank, suffix))
}

/// Normalises chart entries. Pairs may be written `AAs`/`AAo` in hand-made
/// charts; both mean `AA`.
fn normalize_hand(entry: &str) -> String {
    let upper: Vec<char> = entry.trim().chars().collect();
    match upper.as_slice() {
        [a, b, _] if a.eq_ignore_ascii_case(b) => {
            format!("{}{}", a.to_ascii_uppercase(), b.to_ascii_uppercase())
        }
        [a, b, suffix] => format!(
            "{}{}{}",
            a.to_ascii_uppercase(),
            b.to_ascii_uppercase(),
            suffix.to_ascii_lowercase()
        ),
        _ => entry.trim().to_ascii_uppercase(),
    }
}

type Range = HashSet<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeCharts {
    opening: HashMap<Position, Range>,
    three_bet: HashMap<Position, Range>,
    calling: HashMap<Position, Range>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeKind {
    Opening,
    ThreeBet,
    Calling,
}

impl RangeCharts {
    pub fn contains(&self, kind: RangeKind, position: Option<Position>, hand: &str) -> bool {
        let Some(position) = position else {
            return false;
        };
        let table = match kind {
            RangeKind::Opening => &self.opening,
            RangeKind::ThreeBet => &self.three_bet,
            RangeKind::Calling => &self.calling,
        };
        table
            .get(&position)
            .is_some_and(|range| range.contains(hand))
    }

    pub fn range_size(&self, kind: RangeKind, position: Position) -> usize {
        let table = match kind {
            RangeKind::Opening => &self.opening,
            RangeKind::ThreeBet => &self.three_bet,
            RangeKind::Calling => &self.calling,
        };
        table.get(&position).map_or(0, HashSet::len)
    }

    /// Loads charts from a JSON file shaped like
    /// `{"preflop": {"opening_ranges": {"BTN": ["AKo", ..]}, ..}}`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading range charts from {}", path.display()))?;
        let file: ChartFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing range charts in {}", path.display()))?;
        Ok(Self {
            opening: table_from_file(file.preflop.opening_ranges),
            three_bet: table_from_file(file.preflop.threebet_ranges),
            calling: table_from_file(file.preflop.calling_ranges),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChartFile {
    preflop: PreflopFile,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct PreflopFile {
    opening_ranges: HashMap<String, Vec<String>>,
    threebet_ranges: HashMap<String, Vec<String>>,
    calling_ranges: HashMap<String, Vec<String>>,
}

fn table_from_file(raw: HashMap<String, Vec<String>>) -> HashMap<Position, Range> {
    let mut table: HashMap<Position, Range> = HashMap::new();
    for (label, hands) in raw {
        match Position::normalize(Some(&label)) {
            Some(position) => table
                .entry(position)
                .or_default()
                .extend(hands.iter().map(|hand| normalize_hand(hand))),
            None => debug!(label = %label, "skipping chart for unknown position"),
        }
    }
    table
}

const PREMIUMS: &[&str] = &["AA", "KK", "QQ", "JJ", "TT", "AKs", "AKo", "AQs"];
const BROAD_OPEN: &[&str] = &[
    "99", "88", "77", "66", "AJs", "AJo", "ATs", "ATo", "KQs", "KQo", "AQo", "QJs", "QJo", "JTs",
];
const MID_OPEN: &[&str] = &[
    "55", "44", "33", "22", "A9s", "A9o", "A8s", "A7s", "A6s", "A5s", "A4s", "A3s", "A2s", "KJs",
    "KJo", "KTs", "KTo", "QTs", "QTo", "J9s", "T9s", "T8s", "98s", "97s", "87s", "76s",
];
const LATE_OPEN: &[&str] = &[
    "K9s", "K9o", "Q9s", "J8s", "T7s", "96s", "86s", "75s", "65s", "64s", "54s", "53s", "K8s",
    "K7s", "K6s", "K5s", "K4s", "Q8s", "J7s", "A5o", "A4o", "A3o", "A2o",
];
const THREE_BET: &[&str] = &[
    "AA", "KK", "QQ", "JJ", "TT", "AKs", "AKo", "AQs", "AQo", "AJs", "KQs",
];
const CALLING: &[&str] = &[
    "99", "88", "77", "66", "55", "44", "33", "22", "AQo", "AJs", "AJo", "ATs", "KQs", "KQo",
    "KJs", "QJs", "JTs", "T9s", "98s",
];

fn build(parts: &[&[&str]]) -> Range {
    parts
        .iter()
        .flat_map(|part| part.iter())
        .map(|hand| hand.to_string())
        .collect()
}

impl Default for RangeCharts {
    fn default() -> Self {
        let opening = HashMap::from([
            (Position::Utg, build(&[PREMIUMS, &BROAD_OPEN[..8]])),
            (Position::Mp, build(&[PREMIUMS, BROAD_OPEN])),
            (Position::Hj, build(&[PREMIUMS, BROAD_OPEN, &MID_OPEN[..12]])),
            (Position::Co, build(&[PREMIUMS, BROAD_OPEN, MID_OPEN])),
            (Position::Btn, build(&[PREMIUMS, BROAD_OPEN, MID_OPEN, LATE_OPEN])),
            (
                Position::Sb,
                build(&[PREMIUMS, BROAD_OPEN, MID_OPEN, &LATE_OPEN[..15]]),
            ),
            (Position::Bb, Range::new()),
        ]);
        let three_bet = HashMap::from([
            (Position::Utg, build(&[&THREE_BET[..6]])),
            (Position::Mp, build(&[&THREE_BET[..8]])),
            (Position::Hj, build(&[&THREE_BET[..9]])),
            (Position::Co, build(&[THREE_BET])),
            (Position::Btn, build(&[THREE_BET, &["A5s", "A4s", "A3s", "A2s"]])),
            (Position::Sb, build(&[THREE_BET])),
            (Position::Bb, build(&[THREE_BET, &["A5s", "A4s"]])),
        ]);
        let calling = HashMap::from([
            (Position::Utg, build(&[&CALLING[..5]])),
            (Position::Mp, build(&[&CALLING[..8]])),
            (Position::Hj, build(&[&CALLING[..12]])),
            (Position::Co, build(&[CALLING])),
            (
                Position::Btn,
                build(&[CALLING, &["A9o", "A8o", "K9s", "QTs", "J9s", "87s", "76s"]]),
            ),
            (Position::Sb, build(&[CALLING])),
            (
                Position::Bb,
                build(&[
                    CALLING,
                    &["A9o", "A8o", "K9s", "Q9s", "J9s", "T8s", "97s", "86s", "75s"],
                ]),
            ),
        ]);
        Self {
            opening,
            three_bet,
            calling,
        }
    }
}
