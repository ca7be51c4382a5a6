//! Heuristic postflop hand strength.
//!
//! Strength is a fixed ordinal ladder of named tiers, each with a score in
//! `[0, 1]`. It is a cheap, explainable proxy for equity and not an exact
//! equity calculation.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::{Card, Rank, Suit};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BoardTexture {
    /// No community cards.
    Dry,
    Monotone,
    TwoTone,
    Connected,
    Rainbow,
}

impl BoardTexture {
    pub fn as_str(self) -> &'static str {
        match self {
            BoardTexture::Dry => "dry",
            BoardTexture::Monotone => "monotone",
            BoardTexture::TwoTone => "two-tone",
            BoardTexture::Connected => "connected",
            BoardTexture::Rainbow => "rainbow",
        }
    }

    /// Only the empty board reads as dry; a dealt rainbow flop does not.
    pub fn is_dry(self) -> bool {
        self == BoardTexture::Dry
    }
}

impl Display for BoardTexture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn board_texture(board: &[Card]) -> BoardTexture {
    if board.is_empty() {
        return BoardTexture::Dry;
    }
    let suits = board.iter().map(|card| card.suit).unique().count();
    let max_gap = board
        .iter()
        .map(Card::rank_value)
        .sorted()
        .tuple_windows()
        .map(|(low, high)| high - low)
        .max()
        .unwrap_or(0);

    match suits {
        1 => BoardTexture::Monotone,
        2 => BoardTexture::TwoTone,
        _ if max_gap <= 2 && board.len() >= 3 => BoardTexture::Connected,
        _ => BoardTexture::Rainbow,
    }
}

/// Named rungs of the strength ladder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrengthTier {
    StraightFlush,
    Quads,
    FullHouse,
    Flush,
    Straight,
    Trips,
    TwoPair,
    TwoPairPairedBoard,
    Overpair,
    TopPair,
    MiddlePair,
    BottomPair,
    BoardPair,
    ComboDraw,
    FlushDraw,
    StraightDraw,
    TwoOvercards,
    OneOvercard,
    Air,
    /// Not enough cards to judge (preflop or missing hole cards).
    Unknown,
}

impl StrengthTier {
    /// Every tier, strongest score first.
    pub const LADDER: [StrengthTier; 20] = [
        StrengthTier::StraightFlush,
        StrengthTier::Quads,
        StrengthTier::FullHouse,
        StrengthTier::Flush,
        StrengthTier::Straight,
        StrengthTier::Trips,
        StrengthTier::TwoPair,
        StrengthTier::Overpair,
        StrengthTier::TwoPairPairedBoard,
        StrengthTier::TopPair,
        StrengthTier::MiddlePair,
        StrengthTier::ComboDraw,
        StrengthTier::BottomPair,
        StrengthTier::Unknown,
        StrengthTier::FlushDraw,
        StrengthTier::StraightDraw,
        StrengthTier::BoardPair,
        StrengthTier::TwoOvercards,
        StrengthTier::OneOvercard,
        StrengthTier::Air,
    ];

    pub fn score(self) -> f32 {
        match self {
            StrengthTier::StraightFlush => 0.99,
            StrengthTier::Quads => 0.97,
            StrengthTier::FullHouse => 0.94,
            StrengthTier::Flush => 0.88,
            StrengthTier::Straight => 0.85,
            StrengthTier::Trips => 0.80,
            StrengthTier::TwoPair => 0.72,
            StrengthTier::TwoPairPairedBoard => 0.65,
            StrengthTier::Overpair => 0.72,
            StrengthTier::TopPair => 0.62,
            StrengthTier::MiddlePair => 0.52,
            StrengthTier::BottomPair => 0.42,
            StrengthTier::BoardPair => 0.30,
            StrengthTier::ComboDraw => 0.46,
            StrengthTier::FlushDraw => 0.38,
            StrengthTier::StraightDraw => 0.32,
            StrengthTier::TwoOvercards => 0.28,
            StrengthTier::OneOvercard => 0.22,
            StrengthTier::Air => 0.15,
            StrengthTier::Unknown => 0.40,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            StrengthTier::StraightFlush => "straight flush",
            StrengthTier::Quads => "quads",
            StrengthTier::FullHouse => "full house",
            StrengthTier::Flush => "flush",
            StrengthTier::Straight => "straight",
            StrengthTier::Trips => "trips",
            StrengthTier::TwoPair => "two pair",
            StrengthTier::TwoPairPairedBoard => "two pair on a paired board",
            StrengthTier::Overpair => "overpair",
            StrengthTier::TopPair => "top pair",
            StrengthTier::MiddlePair => "middle pair",
            StrengthTier::BottomPair => "bottom pair",
            StrengthTier::BoardPair => "board pair only",
            StrengthTier::ComboDraw => "flush + straight draw",
            StrengthTier::FlushDraw => "flush draw",
            StrengthTier::StraightDraw => "straight draw",
            StrengthTier::TwoOvercards => "two overcards",
            StrengthTier::OneOvercard => "one overcard",
            StrengthTier::Air => "air",
            StrengthTier::Unknown => "unknown holding",
        }
    }
}

/// Places the hero's holding on the ladder.
pub fn strength_tier(hero: &[Card], board: &[Card]) -> StrengthTier {
    if hero.len() < 2 || board.len() < 3 {
        return StrengthTier::Unknown;
    }
    let all: Vec<Card> = hero.iter().chain(board.iter()).copied().collect();

    let rank_counts: HashMap<Rank, usize> = all.iter().map(|card| card.rank).counts();
    let suit_counts: HashMap<Suit, usize> = all.iter().map(|card| card.suit).counts();

    let max_of_a_kind = rank_counts.values().copied().max().unwrap_or(0);
    let paired_ranks = rank_counts.values().filter(|&&count| count >= 2).count();

    let has_flush = suit_counts.values().any(|&count| count >= 5);
    let has_flush_draw = hero
        .iter()
        .any(|card| suit_counts.get(&card.suit).copied().unwrap_or(0) >= 4);

    let run = longest_rank_run(&all);
    let has_straight = run >= 5 || has_wheel(&all);
    let has_straight_draw = run >= 4;

    if has_straight && has_flush {
        return StrengthTier::StraightFlush;
    }
    if max_of_a_kind >= 4 {
        return StrengthTier::Quads;
    }
    if max_of_a_kind == 3 && paired_ranks >= 2 {
        return StrengthTier::FullHouse;
    }
    if has_flush {
        return StrengthTier::Flush;
    }
    if has_straight {
        return StrengthTier::Straight;
    }
    if max_of_a_kind == 3 {
        return StrengthTier::Trips;
    }

    if paired_ranks >= 2 {
        let board_paired = board.iter().map(|card| card.rank).unique().count() < board.len();
        return if board_paired {
            StrengthTier::TwoPairPairedBoard
        } else {
            StrengthTier::TwoPair
        };
    }

    if paired_ranks == 1 {
        let Some(pair_rank) = rank_counts
            .iter()
            .find(|(_, count)| **count >= 2)
            .map(|(rank, _)| *rank)
        else {
            return StrengthTier::BoardPair;
        };
        if !hero.iter().any(|card| card.rank == pair_rank) {
            return StrengthTier::BoardPair;
        }
        let board_desc: Vec<Rank> = board
            .iter()
            .map(|card| card.rank)
            .sorted_by(|a, b| b.cmp(a))
            .collect();
        return if pair_rank > board_desc[0] {
            StrengthTier::Overpair
        } else if pair_rank == board_desc[0] {
            StrengthTier::TopPair
        } else if pair_rank == board_desc[1] {
            StrengthTier::MiddlePair
        } else {
            StrengthTier::BottomPair
        };
    }

    let top_board = board.iter().map(|card| card.rank).max().unwrap_or(Rank::Two);
    let overcards = hero.iter().filter(|card| card.rank > top_board).count();

    match (has_flush_draw, has_straight_draw) {
        (true, true) => StrengthTier::ComboDraw,
        (true, false) => StrengthTier::FlushDraw,
        (false, true) => StrengthTier::StraightDraw,
        (false, false) if overcards >= 2 => StrengthTier::TwoOvercards,
        (false, false) if overcards == 1 => StrengthTier::OneOvercard,
        (false, false) => StrengthTier::Air,
    }
}

pub fn hand_strength(hero: &[Card], board: &[Card]) -> f32 {
    strength_tier(hero, board).score()
}

/// Longest run of consecutive distinct ranks, aces high only.
fn longest_rank_run(cards: &[Card]) -> usize {
    let ranks: Vec<u8> = cards.iter().map(Card::rank_value).unique().sorted().collect();
    let mut best = usize::from(!ranks.is_empty());
    let mut current = best;
    for (low, high) in ranks.iter().tuple_windows() {
        current = if *high == low + 1 { current + 1 } else { 1 };
        best = best.max(current);
    }
    best
}

fn has_wheel(cards: &[Card]) -> bool {
    [Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five]
        .iter()
        .all(|rank| cards.iter().any(|card| card.rank == *rank))
}
