use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use poker_adviser::adviser::{Briefing, SourceDecision};
use poker_adviser::cards::parse_cards;
use poker_adviser::game::{Action, DecisionOrigin, GameState, Street};
use poker_adviser::stats::{Counter, PlayerStats};
use poker_adviser::{AdviceError, Adviser, DecisionSource, SourceError};

struct Slow;

impl DecisionSource for Slow {
    fn decide<'a>(&'a self, _: &'a Briefing) -> BoxFuture<'a, Result<SourceDecision, SourceError>> {
        async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            SourceDecision::parse(r#"{"action":"FOLD","reasoning":"too late"}"#)
        }
        .boxed()
    }
}

struct Broken;

impl DecisionSource for Broken {
    fn decide<'a>(&'a self, _: &'a Briefing) -> BoxFuture<'a, Result<SourceDecision, SourceError>> {
        async { Err(SourceError::Unavailable("connection refused".into())) }.boxed()
    }
}

/// Echoes back the rule-based signals it was briefed with.
struct Echo;

impl DecisionSource for Echo {
    fn decide<'a>(
        &'a self,
        briefing: &'a Briefing,
    ) -> BoxFuture<'a, Result<SourceDecision, SourceError>> {
        async move {
            let reply = format!(
                r#"```json
{{"action":"CALL","sizing":null,"reasoning":"{} | {}","confidence":0.9}}
```"#,
                briefing.gto.label(),
                briefing.villain
            );
            SourceDecision::parse(&reply)
        }
        .boxed()
    }
}

fn button_ace_king() -> GameState {
    GameState {
        street: Street::Preflop,
        hero_position: Some("BTN".into()),
        hero_cards: parse_cards("As Kd").unwrap(),
        pot_bb: 1.5,
        stack_bb: 100.0,
        ..GameState::default()
    }
}

#[test]
fn missing_hero_cards_yield_no_recommendation() {
    let adviser = Adviser::default();
    let mut state = button_ace_king();
    state.hero_cards.truncate(1);
    assert_eq!(
        adviser.decide(&state, 0.5, None).unwrap_err(),
        AdviceError::MissingHeroCards
    );
}

#[test]
fn oversized_card_lists_are_truncated() {
    let adviser = Adviser::default();
    let mut state = button_ace_king();
    state.hero_cards = parse_cards("As Kd Qh").unwrap();
    let decision = adviser.decide(&state, 0.5, None).unwrap();
    assert_eq!(decision.label(), "RAISE 2.5x");
}

#[tokio::test]
async fn slow_sources_fall_back_to_rules() {
    let adviser = Adviser::default();
    let decision = adviser
        .advise_with(&Slow, &button_ace_king(), 0.5, None, Duration::from_millis(20))
        .await
        .unwrap();
    assert_eq!(decision.origin, DecisionOrigin::Fallback);
    assert_eq!(decision.action, Action::Raise);
    assert!(decision.reasoning.starts_with("decision source timed out"));
}

#[tokio::test]
async fn failing_sources_fall_back_to_rules() {
    let adviser = Adviser::default();
    let decision = adviser
        .advise_with(&Broken, &button_ace_king(), 0.5, None, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(decision.origin, DecisionOrigin::Fallback);
    assert_eq!(decision.label(), "RAISE 2.5x");
    assert!(decision.reasoning.contains("connection refused"));
}

#[tokio::test]
async fn external_answers_keep_rule_based_signals() {
    let adviser = Adviser::default();
    let villain = PlayerStats {
        vpip: Counter::new(45, 100),
        pfr: Counter::new(35, 100),
        ..PlayerStats::default()
    };
    let decision = adviser
        .advise_with(&Echo, &button_ace_king(), 0.5, Some(&villain), Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(decision.origin, DecisionOrigin::External);
    assert_eq!(decision.action, Action::Call);
    assert_eq!(decision.sizing, None);
    assert_eq!(decision.confidence, 0.9);
    assert_eq!(decision.gto_action, "RAISE 2.5x");
    assert!(decision.reasoning.starts_with("RAISE 2.5x | [MANIAC] 100 hands"));
}
