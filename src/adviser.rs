//! Turns a [`GameState`] into a single recommendation.
//!
//! The rule-based path (GTO baseline, exploit adjustment, λ blend) is always
//! computed. An optional external [`DecisionSource`] may override it, but a
//! failing or slow source never leaves the caller without an answer: the
//! rule-based decision is returned with origin [`DecisionOrigin::Fallback`].

use std::time::Duration;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::blend::{blend, clamp_lambda};
use crate::classify::classify;
use crate::error::{AdviceError, SourceError};
use crate::exploit::ExploitEvaluator;
use crate::game::{Action, Decision, DecisionOrigin, GameState, MAX_HERO_CARDS, PolicyDecision, Sizing};
use crate::gto::{GtoEvaluator, pct};
use crate::stats::PlayerStats;

/// Everything an external source gets to see when asked for a decision.
#[derive(Debug, Clone, Serialize)]
pub struct Briefing {
    pub state: GameState,
    pub lambda: f32,
    pub strategy_mode: String,
    pub villain: String,
    pub gto: PolicyDecision,
    pub exploit: PolicyDecision,
    pub rule_based: Decision,
}

/// Answer from an external source. `confidence` is optional; the rule-based
/// confidence is used when it is missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceDecision {
    pub action: Action,
    #[serde(default)]
    pub sizing: Option<Sizing>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl SourceDecision {
    /// Parses a JSON reply, tolerating a surrounding markdown code fence.
    pub fn parse(text: &str) -> Result<Self, SourceError> {
        let body = text
            .trim()
            .trim_start_matches("```json")
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim();
        Ok(serde_json::from_str(body)?)
    }
}

/// An out-of-process decision maker, e.g. a language-model call.
pub trait DecisionSource: Send + Sync {
    fn decide<'a>(&'a self, briefing: &'a Briefing)
    -> BoxFuture<'a, Result<SourceDecision, SourceError>>;
}

pub fn strategy_mode(lambda: f32) -> String {
    if lambda < 0.2 {
        "Pure GTO, ignore villain tendencies".to_string()
    } else if lambda > 0.8 {
        "Maximum exploit, heavily weight villain tendencies".to_string()
    } else {
        format!("Balanced (λ={lambda:.2}), blend GTO with villain reads")
    }
}

/// One-line read on the villain, e.g. `[FISH] 42 hands: VPIP=55%, ...`.
pub fn villain_summary(stats: Option<&PlayerStats>) -> String {
    let Some(stats) = stats.filter(|s| s.sample_size() > 0) else {
        return "No villain data yet (new player or first hands).".to_string();
    };
    let ratio = |r: Option<f32>| r.map_or_else(|| "N/A".to_string(), pct);
    format!(
        "[{}] {} hands: VPIP={}, PFR={}, AF={}, Fold→3bet={}, Fold→Cbet={}",
        classify(stats),
        stats.sample_size(),
        ratio(stats.vpip.ratio()),
        ratio(stats.pfr.ratio()),
        stats
            .aggression
            .factor()
            .map_or_else(|| "N/A".to_string(), |af| format!("{af:.2}")),
        ratio(stats.fold_to_three_bet.ratio()),
        ratio(stats.fold_to_cbet.ratio()),
    )
}

struct Evaluated {
    state: GameState,
    gto: PolicyDecision,
    exploit: PolicyDecision,
    decision: Decision,
}

#[derive(Debug, Clone, Default)]
pub struct Adviser {
    exploit: ExploitEvaluator,
}

impl Adviser {
    pub fn new(gto: GtoEvaluator) -> Self {
        Self {
            exploit: ExploitEvaluator::new(gto),
        }
    }

    pub fn gto(&self) -> &GtoEvaluator {
        self.exploit.baseline()
    }

    pub fn exploit(&self) -> &ExploitEvaluator {
        &self.exploit
    }

    fn evaluate(
        &self,
        state: &GameState,
        lambda: f32,
        villain: Option<&PlayerStats>,
    ) -> Result<Evaluated, AdviceError> {
        let state = state.clone().sanitized();
        if state.hero_cards.len() < MAX_HERO_CARDS {
            return Err(AdviceError::MissingHeroCards);
        }
        let gto = self.gto().evaluate(&state);
        let exploit = self.exploit.evaluate(&state, villain);
        let sample_size = villain.map_or(0, PlayerStats::sample_size);
        let decision = blend(&gto, &exploit, lambda, sample_size);
        debug!(
            gto = %decision.gto_action,
            exploit = %decision.exploit_action,
            effective_lambda = decision.effective_lambda,
            "rule-based decision"
        );
        Ok(Evaluated {
            state,
            gto,
            exploit,
            decision,
        })
    }

    /// Rule-based recommendation.
    pub fn decide(
        &self,
        state: &GameState,
        lambda: f32,
        villain: Option<&PlayerStats>,
    ) -> Result<Decision, AdviceError> {
        self.evaluate(state, lambda, villain).map(|e| e.decision)
    }

    /// Asks `source` first and falls back to the rule-based decision when it
    /// errors or does not answer within `timeout`.
    pub async fn advise_with(
        &self,
        source: &dyn DecisionSource,
        state: &GameState,
        lambda: f32,
        villain: Option<&PlayerStats>,
        timeout: Duration,
    ) -> Result<Decision, AdviceError> {
        let evaluated = self.evaluate(state, lambda, villain)?;
        let lambda = clamp_lambda(lambda);
        let briefing = Briefing {
            state: evaluated.state,
            lambda,
            strategy_mode: strategy_mode(lambda),
            villain: villain_summary(villain),
            gto: evaluated.gto,
            exploit: evaluated.exploit,
            rule_based: evaluated.decision,
        };

        let outcome = match tokio::time::timeout(timeout, source.decide(&briefing)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(timeout)),
        };
        let rule_based = briefing.rule_based;

        match outcome {
            Ok(external) => Ok(Decision {
                action: external.action,
                sizing: external.sizing,
                reasoning: external.reasoning,
                confidence: external
                    .confidence
                    .filter(|c| c.is_finite())
                    .map_or(rule_based.confidence, |c| c.clamp(0.0, 1.0)),
                origin: DecisionOrigin::External,
                ..rule_based
            }),
            Err(err) => {
                warn!(error = %err, "external decision source failed, using rule-based decision");
                Ok(Decision {
                    reasoning: format!("{err}; rule-based fallback: {}", rule_based.reasoning),
                    origin: DecisionOrigin::Fallback,
                    ..rule_based
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_replies_parse() {
        let reply = "```json\n{\"action\":\"RAISE\",\"sizing\":\"3x\",\"reasoning\":\"value\"}\n```";
        let parsed = SourceDecision::parse(reply).unwrap();
        assert_eq!(parsed.action, Action::Raise);
        assert_eq!(parsed.sizing, Some(Sizing::Multiple(3.0)));
        assert_eq!(parsed.confidence, None);
    }

    #[test]
    fn garbage_replies_are_malformed() {
        let err = SourceDecision::parse("I would fold here").unwrap_err();
        assert!(matches!(err, SourceError::Malformed(_)));
    }

    #[test]
    fn strategy_mode_buckets_lambda() {
        assert!(strategy_mode(0.1).starts_with("Pure GTO"));
        assert!(strategy_mode(0.9).starts_with("Maximum exploit"));
        assert_eq!(
            strategy_mode(0.5),
            "Balanced (λ=0.50), blend GTO with villain reads"
        );
    }

    #[test]
    fn villain_summary_without_data() {
        assert_eq!(
            villain_summary(None),
            "No villain data yet (new player or first hands)."
        );
    }
}
