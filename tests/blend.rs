use poker_adviser::blend::{blend, confidence};
use poker_adviser::game::{Action, DecisionOrigin, PolicyDecision, Sizing};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn gto() -> PolicyDecision {
    PolicyDecision::new(Action::Check, "GTO check: balanced range")
}

fn exploit() -> PolicyDecision {
    PolicyDecision::sized(
        Action::Bet,
        Sizing::PotPercent(33),
        "Exploit: villain folds to c-bets 70%, bet small with any two",
    )
}

#[test]
fn no_sample_means_pure_gto() {
    let decision = blend(&gto(), &exploit(), 1.0, 0);
    assert_eq!(decision.action, Action::Check);
    assert_eq!(decision.sizing, None);
    assert_eq!(decision.confidence, 0.0);
    assert_eq!(decision.effective_lambda, 0.0);
    assert_eq!(
        decision.reasoning,
        "GTO check: balanced range. Low confidence (0 hands)."
    );
    assert_eq!(decision.gto_action, "CHECK");
    assert_eq!(decision.exploit_action, "BET 33% pot");
    assert_eq!(decision.origin, DecisionOrigin::RuleBased);
}

#[test]
fn full_lambda_with_enough_hands_exploits() {
    let decision = blend(&gto(), &exploit(), 1.0, 30);
    assert_eq!(decision.label(), "BET 33% pot");
    assert_eq!(decision.confidence, 1.0);
    assert_eq!(decision.effective_lambda, 1.0);
    assert!(decision.reasoning.ends_with("High confidence (30 hands)."));
}

#[test]
fn confidence_gates_lambda() {
    let medium = blend(&gto(), &exploit(), 0.9, 15);
    assert_eq!(medium.action, Action::Check);
    assert!(medium.reasoning.ends_with("Medium confidence (15 hands)."));

    let enough = blend(&gto(), &exploit(), 1.0, 15);
    assert_eq!(enough.action, Action::Bet);
}

#[test]
fn invalid_lambda_is_clamped() {
    assert_eq!(blend(&gto(), &exploit(), f32::NAN, 100).action, Action::Check);
    assert_eq!(blend(&gto(), &exploit(), -2.0, 100).effective_lambda, 0.0);
    assert_eq!(blend(&gto(), &exploit(), 5.0, 100).effective_lambda, 1.0);
}

#[test]
fn blend_outputs_stay_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..500 {
        let lambda: f32 = rng.gen_range(-1.0..2.0);
        let sample: u32 = rng.gen_range(0..200);
        let decision = blend(&gto(), &exploit(), lambda, sample);
        assert!((0.0..=1.0).contains(&decision.confidence));
        assert!((0.0..=1.0).contains(&decision.effective_lambda));
        assert_eq!(decision.confidence, confidence(sample));
        let exploited = decision.effective_lambda >= 0.5;
        assert_eq!(decision.action == Action::Bet, exploited);
    }
}
