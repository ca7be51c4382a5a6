//! Opponent-specific adjustments on top of the GTO baseline.

use crate::classify::{MIN_SAMPLE, PlayerTag, classify};
use crate::game::{Action, GameState, PolicyDecision, Sizing};
use crate::gto::{GtoEvaluator, pct};
use crate::ranges::{Position, RangeKind, canonical_hand};
use crate::stats::PlayerStats;
use crate::strength::hand_strength;

const PREMIUMS: [&str; 5] = ["AA", "KK", "QQ", "AKs", "AKo"];
const FOLDS_TOO_MUCH: f32 = 0.60;

const FISH_VALUE: f32 = 0.55;
const BLUFF_CEILING: f32 = 0.38;
const TRAP_STRENGTH: f32 = 0.70;

const NIT_RAISE: f32 = 0.85;
const NIT_CALL_MARGIN: f32 = 0.18;
const MANIAC_RAISE: f32 = 0.72;
const MANIAC_CALL_MARGIN: f32 = 0.05;
const FISH_RAISE: f32 = 0.62;

/// Tendencies the adjustments key off.
#[derive(Debug, Clone, Copy)]
struct Read {
    tag: PlayerTag,
    aggression: Option<f32>,
    fold_to_cbet: Option<f32>,
    fold_to_three_bet: Option<f32>,
}

impl Read {
    fn of(stats: &PlayerStats) -> Self {
        Self {
            tag: classify(stats),
            aggression: stats.aggression.factor(),
            fold_to_cbet: stats.fold_to_cbet.ratio(),
            fold_to_three_bet: stats.fold_to_three_bet.ratio(),
        }
    }

    fn passive(&self) -> bool {
        self.aggression.is_some_and(|af| af < 1.0)
    }

    fn hyper_aggressive(&self) -> bool {
        self.aggression.is_some_and(|af| af > 3.0)
    }
}

/// Bends the GTO line toward what a specific villain does badly.
#[derive(Debug, Clone, Default)]
pub struct ExploitEvaluator {
    baseline: GtoEvaluator,
}

impl ExploitEvaluator {
    pub fn new(baseline: GtoEvaluator) -> Self {
        Self { baseline }
    }

    pub fn baseline(&self) -> &GtoEvaluator {
        &self.baseline
    }

    pub fn evaluate(&self, state: &GameState, villain: Option<&PlayerStats>) -> PolicyDecision {
        let gto = self.baseline.evaluate(state);
        let Some(stats) = villain else {
            return noted(gto, "no villain stats, playing GTO");
        };
        if stats.sample_size() < MIN_SAMPLE {
            let note = format!(
                "only {} hands on villain, playing GTO",
                stats.sample_size()
            );
            return noted(gto, &note);
        }

        let read = Read::of(stats);
        let adjusted = if state.street.is_preflop() {
            self.preflop(state, &read, &gto)
        } else if state.to_call_bb <= 0.0 {
            unbet(state, &read, &gto)
        } else {
            facing_bet(state, &read)
        };
        adjusted.unwrap_or_else(|| {
            let note = format!("no exploit vs {}", read.tag);
            noted(gto, &note)
        })
    }

    fn preflop(&self, state: &GameState, read: &Read, gto: &PolicyDecision) -> Option<PolicyDecision> {
        let charts = self.baseline.charts();
        let position = Position::normalize(state.hero_position.as_deref());
        let hand = canonical_hand(&state.hero_cards)?;
        let in_range = |kind| charts.contains(kind, position, &hand);
        let tag = read.tag;

        if state.facing_raise() {
            return match tag {
                PlayerTag::Maniac if in_range(RangeKind::ThreeBet) || in_range(RangeKind::Calling) => {
                    Some(PolicyDecision::sized(
                        Action::Raise,
                        Sizing::Multiple(3.0),
                        format!("Exploit vs MANIAC: widen 3-bet with {hand}, they open too wide"),
                    ))
                }
                PlayerTag::Nit if PREMIUMS.contains(&hand.as_str()) => Some(PolicyDecision::sized(
                    Action::Raise,
                    Sizing::Multiple(3.0),
                    format!("Exploit vs NIT: {hand} is a premium, 3-bet for value"),
                )),
                PlayerTag::Nit if in_range(RangeKind::ThreeBet) => Some(PolicyDecision::new(
                    Action::Call,
                    format!("Exploit vs NIT: flat {hand}, their raise is narrow"),
                )),
                PlayerTag::Nit => Some(PolicyDecision::new(
                    Action::Fold,
                    format!("Exploit vs NIT: fold {hand}, their raise is premium-heavy"),
                )),
                PlayerTag::Fish if in_range(RangeKind::ThreeBet) => Some(PolicyDecision::sized(
                    Action::Raise,
                    Sizing::Multiple(3.5),
                    format!("Exploit vs FISH: 3-bet {hand} larger, they call too wide"),
                )),
                PlayerTag::Fish if in_range(RangeKind::Calling) || in_range(RangeKind::Opening) => {
                    Some(PolicyDecision::new(
                        Action::Call,
                        format!("Exploit vs FISH: call with {hand} and play postflop"),
                    ))
                }
                PlayerTag::Reg
                    if read.fold_to_three_bet.is_some_and(|f| f > FOLDS_TOO_MUCH)
                        && in_range(RangeKind::Opening) =>
                {
                    Some(PolicyDecision::sized(
                        Action::Raise,
                        Sizing::Multiple(3.0),
                        format!(
                            "Exploit vs REG: folds to 3-bet {}, 3-bet {hand} light",
                            pct(read.fold_to_three_bet.unwrap_or_default())
                        ),
                    ))
                }
                _ => None,
            };
        }

        let steal = matches!(tag, PlayerTag::Nit | PlayerTag::Fish)
            && gto.action == Action::Fold
            && charts.contains(RangeKind::Opening, Some(Position::Btn), &hand);
        steal.then(|| {
            let why = if tag == PlayerTag::Nit {
                "they fold too often to steals"
            } else {
                "isolate the weak player"
            };
            PolicyDecision::sized(
                Action::Raise,
                Sizing::Multiple(3.0),
                format!("Exploit vs {tag}: open {hand} wider, {why}"),
            )
        })
    }
}

fn unbet(state: &GameState, read: &Read, gto: &PolicyDecision) -> Option<PolicyDecision> {
    let strength = hand_strength(&state.hero_cards, &state.board);

    if let Some(folds) = read.fold_to_cbet
        && folds > FOLDS_TOO_MUCH
        && gto.action == Action::Check
    {
        return Some(PolicyDecision::sized(
            Action::Bet,
            Sizing::PotPercent(33),
            format!("Exploit: villain folds to c-bets {}, bet small with any two", pct(folds)),
        ));
    }

    if read.tag == PlayerTag::Fish || read.passive() {
        if strength >= FISH_VALUE {
            return Some(PolicyDecision::sized(
                Action::Bet,
                Sizing::PotPercent(75),
                format!(
                    "Exploit vs {}: value bet big ({}), they call too much",
                    read.tag,
                    pct(strength)
                ),
            ));
        }
        if strength < BLUFF_CEILING {
            return Some(PolicyDecision::new(
                Action::Check,
                format!("Exploit vs {}: no bluffs, they do not fold", read.tag),
            ));
        }
    }

    if read.tag == PlayerTag::Maniac && strength >= TRAP_STRENGTH {
        return Some(PolicyDecision::new(
            Action::Check,
            format!("Exploit vs MANIAC: check {} to induce", pct(strength)),
        ));
    }

    None
}

fn facing_bet(state: &GameState, read: &Read) -> Option<PolicyDecision> {
    let strength = hand_strength(&state.hero_cards, &state.board);
    let pot_odds = state.pot_odds();

    if read.tag == PlayerTag::Nit || read.passive() {
        let decision = if strength >= NIT_RAISE {
            PolicyDecision::sized(
                Action::Raise,
                Sizing::Multiple(2.5),
                format!("Exploit vs {}: raise only the nuts ({})", read.tag, pct(strength)),
            )
        } else if strength > pot_odds + NIT_CALL_MARGIN {
            PolicyDecision::new(
                Action::Call,
                format!(
                    "Exploit vs {}: their bets are strong, call only with {} vs odds {}",
                    read.tag,
                    pct(strength),
                    pct(pot_odds)
                ),
            )
        } else {
            PolicyDecision::new(
                Action::Fold,
                format!("Exploit vs {}: passive bet means strength, fold", read.tag),
            )
        };
        return Some(decision);
    }

    if read.tag == PlayerTag::Maniac || read.hyper_aggressive() {
        let decision = if strength >= MANIAC_RAISE {
            PolicyDecision::sized(
                Action::Raise,
                Sizing::Multiple(2.5),
                format!("Exploit vs {}: raise for value ({})", read.tag, pct(strength)),
            )
        } else if strength > pot_odds - MANIAC_CALL_MARGIN {
            PolicyDecision::new(
                Action::Call,
                format!(
                    "Exploit vs {}: bluff-catch wider, {} vs odds {}",
                    read.tag,
                    pct(strength),
                    pct(pot_odds)
                ),
            )
        } else {
            PolicyDecision::new(
                Action::Fold,
                format!("Exploit vs {}: too weak even against a maniac", read.tag),
            )
        };
        return Some(decision);
    }

    (read.tag == PlayerTag::Fish && strength >= FISH_RAISE).then(|| {
        PolicyDecision::sized(
            Action::Raise,
            Sizing::Multiple(3.0),
            format!("Exploit vs FISH: raise {} for value, they pay off", pct(strength)),
        )
    })
}

fn noted(mut decision: PolicyDecision, note: &str) -> PolicyDecision {
    decision.reasoning = format!("{} ({note})", decision.reasoning);
    decision
}
