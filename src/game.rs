use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnError, DeserializeFromStr, SerializeDisplay, VecSkipError, serde_as};

use crate::cards::Card;

pub const MAX_HERO_CARDS: usize = 2;
pub const MAX_BOARD_CARDS: usize = 5;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Street {
    #[default]
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
    HandOver,
}

impl Street {
    /// Street implied by the number of community cards; `None` for lengths no
    /// street can have.
    pub fn from_board_len(len: usize) -> Option<Street> {
        match len {
            0 => Some(Street::Preflop),
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    pub fn is_preflop(self) -> bool {
        matches!(self, Street::Waiting | Street::Preflop)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Street::Waiting => "WAITING",
            Street::Preflop => "PREFLOP",
            Street::Flop => "FLOP",
            Street::Turn => "TURN",
            Street::River => "RIVER",
            Street::Showdown => "SHOWDOWN",
            Street::HandOver => "HAND_OVER",
        }
    }
}

impl Display for Street {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the five recommendable actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Fold => "FOLD",
            Action::Check => "CHECK",
            Action::Call => "CALL",
            Action::Bet => "BET",
            Action::Raise => "RAISE",
        }
    }

    pub fn is_aggressive(self) -> bool {
        matches!(self, Action::Bet | Action::Raise)
    }

    pub fn puts_chips_in(self) -> bool {
        matches!(self, Action::Call | Action::Bet | Action::Raise)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FOLD" => Ok(Action::Fold),
            "CHECK" => Ok(Action::Check),
            "CALL" => Ok(Action::Call),
            "BET" => Ok(Action::Bet),
            "RAISE" => Ok(Action::Raise),
            _ => Err(format!("Invalid action '{s}'")),
        }
    }
}

/// An action as reported by the data source. Strings outside the five known
/// actions are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum ActionKind {
    Known(Action),
    Other(String),
}

impl ActionKind {
    pub fn action(&self) -> Option<Action> {
        match self {
            ActionKind::Known(action) => Some(*action),
            ActionKind::Other(_) => None,
        }
    }
}

impl Default for ActionKind {
    fn default() -> Self {
        ActionKind::Other(String::new())
    }
}

impl From<Action> for ActionKind {
    fn from(action: Action) -> Self {
        ActionKind::Known(action)
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Known(action) => f.write_str(action.as_str()),
            ActionKind::Other(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for ActionKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<Action>() {
            Ok(action) => ActionKind::Known(action),
            Err(_) => ActionKind::Other(s.to_string()),
        })
    }
}

/// Bet sizing descriptor, rendered the way the HUD shows it (`2.5x`, `67% pot`).
#[derive(Debug, Clone, PartialEq, SerializeDisplay, DeserializeFromStr)]
pub enum Sizing {
    Multiple(f32),
    PotPercent(u32),
    Custom(String),
}

impl Display for Sizing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Sizing::Multiple(factor) if factor.fract() == 0.0 => write!(f, "{factor:.0}x"),
            Sizing::Multiple(factor) => write!(f, "{factor}x"),
            Sizing::PotPercent(pct) => write!(f, "{pct}% pot"),
            Sizing::Custom(raw) => f.write_str(raw),
        }
    }
}

impl FromStr for Sizing {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(factor) = trimmed
            .strip_suffix(['x', 'X'])
            .and_then(|raw| raw.trim().parse::<f32>().ok())
        {
            return Ok(Sizing::Multiple(factor));
        }
        if let Some(pct) = trimmed
            .strip_suffix("pot")
            .map(str::trim)
            .and_then(|raw| raw.strip_suffix('%'))
            .and_then(|raw| raw.trim().parse::<u32>().ok())
        {
            return Ok(Sizing::PotPercent(pct));
        }
        Ok(Sizing::Custom(trimmed.to_string()))
    }
}

/// Output of a single policy (GTO or exploit) before blending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDecision {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<Sizing>,
    pub reasoning: String,
}

impl PolicyDecision {
    pub fn new(action: Action, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            sizing: None,
            reasoning: reasoning.into(),
        }
    }

    pub fn sized(action: Action, sizing: Sizing, reasoning: impl Into<String>) -> Self {
        Self {
            action,
            sizing: Some(sizing),
            reasoning: reasoning.into(),
        }
    }

    /// Compact form such as `RAISE 2.5x` or `CHECK`.
    pub fn label(&self) -> String {
        match &self.sizing {
            Some(sizing) => format!("{} {}", self.action, sizing),
            None => self.action.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionOrigin {
    RuleBased,
    External,
    Fallback,
}

/// Final recommendation handed to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Decision {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<Sizing>,
    pub reasoning: String,
    pub confidence: f32,
    pub effective_lambda: f32,
    pub gto_action: String,
    pub exploit_action: String,
    pub origin: DecisionOrigin,
}

impl Decision {
    pub fn label(&self) -> String {
        match &self.sizing {
            Some(sizing) => format!("{} {}", self.action, sizing),
            None => self.action.to_string(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Villain {
    #[serde_as(as = "DefaultOnError")]
    pub player_id: String,
    #[serde_as(as = "DefaultOnError")]
    pub position: String,
    #[serde_as(as = "DefaultOnError")]
    pub stack_bb: f32,
}

/// Point-in-time view consumed by the policy evaluators.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct GameState {
    #[serde_as(as = "DefaultOnError")]
    pub street: Street,
    #[serde_as(as = "DefaultOnError")]
    pub hero_position: Option<String>,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub hero_cards: Vec<Card>,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub board: Vec<Card>,
    #[serde_as(as = "DefaultOnError")]
    pub pot_bb: f32,
    #[serde_as(as = "DefaultOnError")]
    pub to_call_bb: f32,
    #[serde_as(as = "DefaultOnError")]
    pub stack_bb: f32,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub villains: Vec<Villain>,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub action_history: Vec<String>,
}

impl GameState {
    /// Drops cards beyond what a hold'em hand can hold and clamps negative
    /// amounts to zero.
    pub fn sanitized(mut self) -> Self {
        self.hero_cards.truncate(MAX_HERO_CARDS);
        self.board.truncate(MAX_BOARD_CARDS);
        self.pot_bb = self.pot_bb.max(0.0);
        self.to_call_bb = self.to_call_bb.max(0.0);
        self.stack_bb = self.stack_bb.max(0.0);
        self
    }

    pub fn primary_villain(&self) -> Option<&Villain> {
        self.villains.first()
    }

    pub fn pot_odds(&self) -> f32 {
        if self.to_call_bb <= 0.0 {
            return 0.0;
        }
        let total = self.pot_bb + self.to_call_bb;
        if total <= 0.0 {
            0.0
        } else {
            self.to_call_bb / total
        }
    }

    pub fn stack_to_pot(&self) -> f32 {
        self.stack_bb / self.pot_bb.max(1.0)
    }

    pub fn facing_raise(&self) -> bool {
        self.action_history.iter().any(|token| {
            let lowered = token.to_lowercase();
            lowered.contains("raise") || lowered.contains("3-bet") || lowered.contains("3bet")
        })
    }
}
