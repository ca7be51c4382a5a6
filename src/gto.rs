use crate::game::{Action, GameState, PolicyDecision, Sizing};
use crate::ranges::{Position, RangeCharts, RangeKind, canonical_hand};
use crate::strength::{board_texture, strength_tier};

const VALUE_BET: f32 = 0.70;
const STANDARD_BET: f32 = 0.55;
const PROBE_BET: f32 = 0.38;
const VALUE_RAISE: f32 = 0.72;
const CALL_MARGIN: f32 = 0.08;
const FOLD_MARGIN: f32 = 0.05;
const LOW_SPR: f32 = 3.0;

pub(crate) fn pct(value: f32) -> String {
    format!("{:.0}%", value * 100.0)
}

/// Baseline strategy: static preflop charts, heuristic strength postflop.
/// Holds no mutable state, so identical inputs always give identical output.
#[derive(Debug, Clone, Default)]
pub struct GtoEvaluator {
    charts: RangeCharts,
}

impl GtoEvaluator {
    pub fn new(charts: RangeCharts) -> Self {
        Self { charts }
    }

    pub fn charts(&self) -> &RangeCharts {
        &self.charts
    }

    pub fn evaluate(&self, state: &GameState) -> PolicyDecision {
        if state.street.is_preflop() {
            self.preflop(state)
        } else {
            postflop(state)
        }
    }

    fn preflop(&self, state: &GameState) -> PolicyDecision {
        let position = Position::normalize(state.hero_position.as_deref());
        let pos_label = position.map_or_else(
            || state.hero_position.clone().unwrap_or_default().to_uppercase(),
            |p| p.to_string(),
        );
        let hand = canonical_hand(&state.hero_cards).unwrap_or_else(|| "unknown".to_string());
        let in_range = |kind| self.charts.contains(kind, position, &hand);

        if state.facing_raise() {
            if in_range(RangeKind::ThreeBet) {
                return PolicyDecision::sized(
                    Action::Raise,
                    Sizing::Multiple(3.0),
                    format!("{hand} is in GTO 3-bet range from {pos_label}"),
                );
            }
            if in_range(RangeKind::Calling) {
                return PolicyDecision::new(
                    Action::Call,
                    format!("{hand} is in GTO calling range vs raise from {pos_label}"),
                );
            }
            return PolicyDecision::new(
                Action::Fold,
                format!("{hand} is outside GTO defend range from {pos_label} vs a raise"),
            );
        }

        if in_range(RangeKind::Opening) {
            let sizing = if position.is_some_and(Position::is_late) {
                Sizing::Multiple(2.5)
            } else {
                Sizing::Multiple(3.0)
            };
            return PolicyDecision::sized(
                Action::Raise,
                sizing,
                format!("{hand} is in GTO opening range from {pos_label}"),
            );
        }

        PolicyDecision::new(
            Action::Fold,
            format!("{hand} is outside GTO opening range from {pos_label}"),
        )
    }
}

fn postflop(state: &GameState) -> PolicyDecision {
    let texture = board_texture(&state.board);
    let tier = strength_tier(&state.hero_cards, &state.board);
    let strength = tier.score();
    let pot_odds = state.pot_odds();

    if state.to_call_bb <= 0.0 {
        if strength >= VALUE_BET {
            let sizing = if state.stack_to_pot() < LOW_SPR {
                Sizing::PotPercent(100)
            } else {
                Sizing::PotPercent(67)
            };
            let reasoning = format!(
                "GTO value bet {sizing}: strong hand ({}, {}) on {texture} board",
                tier.describe(),
                pct(strength)
            );
            return PolicyDecision::sized(Action::Bet, sizing, reasoning);
        }
        if strength >= STANDARD_BET {
            return PolicyDecision::sized(
                Action::Bet,
                Sizing::PotPercent(50),
                format!(
                    "GTO standard bet: {} ({}) on {texture} board",
                    tier.describe(),
                    pct(strength)
                ),
            );
        }
        if strength >= PROBE_BET && texture.is_dry() {
            return PolicyDecision::sized(
                Action::Bet,
                Sizing::PotPercent(33),
                format!("GTO probe: {texture} board, balanced range bets small"),
            );
        }
        return PolicyDecision::new(
            Action::Check,
            format!(
                "GTO check: {} ({}) on {texture} board, protect check range",
                tier.describe(),
                pct(strength)
            ),
        );
    }

    if strength >= VALUE_RAISE {
        return PolicyDecision::sized(
            Action::Raise,
            Sizing::Multiple(2.5),
            format!(
                "GTO raise: strong hand ({}, {}), build pot and deny equity",
                tier.describe(),
                pct(strength)
            ),
        );
    }
    if strength > pot_odds + CALL_MARGIN {
        return PolicyDecision::new(
            Action::Call,
            format!(
                "GTO call: equity {} exceeds pot odds {}",
                pct(strength),
                pct(pot_odds)
            ),
        );
    }
    if strength < pot_odds - FOLD_MARGIN {
        return PolicyDecision::new(
            Action::Fold,
            format!(
                "GTO fold: equity {} below pot odds {}",
                pct(strength),
                pct(pot_odds)
            ),
        );
    }
    PolicyDecision::new(
        Action::Call,
        format!(
            "GTO borderline call: equity {} close to pot odds {}",
            pct(strength),
            pct(pot_odds)
        ),
    )
}
