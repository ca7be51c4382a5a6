use poker_adviser::cards::parse_cards;
use poker_adviser::game::{Action, GameState, Street};
use poker_adviser::gto::GtoEvaluator;

fn preflop(position: &str, hero: &str, history: &[&str]) -> GameState {
    GameState {
        street: Street::Preflop,
        hero_position: Some(position.to_string()),
        hero_cards: parse_cards(hero).unwrap(),
        pot_bb: 1.5,
        stack_bb: 100.0,
        action_history: history.iter().map(|s| s.to_string()).collect(),
        ..GameState::default()
    }
}

fn postflop(hero: &str, board: &str, pot: f32, to_call: f32, stack: f32) -> GameState {
    let board = parse_cards(board).unwrap();
    GameState {
        street: Street::from_board_len(board.len()).unwrap(),
        hero_position: Some("BTN".into()),
        hero_cards: parse_cards(hero).unwrap(),
        board,
        pot_bb: pot,
        to_call_bb: to_call,
        stack_bb: stack,
        ..GameState::default()
    }
}

#[test]
fn button_opens_ace_king_small() {
    let gto = GtoEvaluator::default();
    let decision = gto.evaluate(&preflop("BTN", "As Kd", &[]));
    insta::assert_snapshot!(decision.label(), @"RAISE 2.5x");
    assert_eq!(decision.reasoning, "AKo is in GTO opening range from BTN");
}

#[test]
fn early_position_opens_larger() {
    let gto = GtoEvaluator::default();
    let decision = gto.evaluate(&preflop("UTG", "As Kd", &[]));
    insta::assert_snapshot!(decision.label(), @"RAISE 3x");
}

#[test]
fn missing_position_reads_as_button() {
    let gto = GtoEvaluator::default();
    let mut state = preflop("BTN", "Ks 5s", &[]);
    state.hero_position = None;
    assert_eq!(gto.evaluate(&state).label(), "RAISE 2.5x");
}

#[test]
fn unplaceable_position_folds() {
    let gto = GtoEvaluator::default();
    let decision = gto.evaluate(&preflop("lojack", "Ac Ad", &[]));
    assert_eq!(decision.action, Action::Fold);
}

#[test]
fn facing_a_raise_uses_defend_ranges() {
    let gto = GtoEvaluator::default();
    let raised = ["v1 RAISE 3"];
    assert_eq!(gto.evaluate(&preflop("BTN", "Ac Ad", &raised)).label(), "RAISE 3x");
    assert_eq!(gto.evaluate(&preflop("BTN", "9c 9d", &raised)).label(), "CALL");
    assert_eq!(gto.evaluate(&preflop("BTN", "7c 2d", &raised)).label(), "FOLD");

    let three_bet = ["v1 3-bet"];
    assert_eq!(gto.evaluate(&preflop("BTN", "9c 9d", &three_bet)).label(), "CALL");
}

#[test]
fn monotone_flop_with_overcards_checks() {
    let gto = GtoEvaluator::default();
    let decision = gto.evaluate(&postflop("As Kd", "7h 4h 2h", 6.0, 0.0, 97.0));
    assert_eq!(decision.action, Action::Check);
    assert!(decision.reasoning.contains("monotone"), "{}", decision.reasoning);
}

#[test]
fn value_bet_sizing_follows_spr() {
    let gto = GtoEvaluator::default();
    let deep = gto.evaluate(&postflop("Ac As", "Kd 7c 2s", 10.0, 0.0, 100.0));
    insta::assert_snapshot!(deep.label(), @"BET 67% pot");
    let shallow = gto.evaluate(&postflop("Ac As", "Kd 7c 2s", 10.0, 0.0, 20.0));
    insta::assert_snapshot!(shallow.label(), @"BET 100% pot");
}

#[test]
fn medium_hands_bet_smaller_and_weak_made_hands_check() {
    let gto = GtoEvaluator::default();
    let top_pair = gto.evaluate(&postflop("Kc Qs", "Kd 7c 2s", 10.0, 0.0, 100.0));
    assert_eq!(top_pair.label(), "BET 50% pot");
    let middle_pair = gto.evaluate(&postflop("7h Qs", "Kd 7c 2s", 10.0, 0.0, 100.0));
    assert_eq!(middle_pair.label(), "CHECK");
    assert!(middle_pair.reasoning.contains("on rainbow board"));
    let bottom_pair = gto.evaluate(&postflop("2h Qs", "Kd 7c 2s", 10.0, 0.0, 100.0));
    assert_eq!(bottom_pair.label(), "CHECK");
}

#[test]
fn facing_a_bet_compares_strength_with_pot_odds() {
    let gto = GtoEvaluator::default();
    let raise = gto.evaluate(&postflop("Ac As", "Kd 7c 2s", 10.0, 5.0, 100.0));
    assert_eq!(raise.label(), "RAISE 2.5x");
    let call = gto.evaluate(&postflop("Kc Qs", "Kd 7c 2s", 10.0, 3.0, 100.0));
    assert_eq!(call.label(), "CALL");
    let fold = gto.evaluate(&postflop("3s 4d", "Th 8c Kh", 10.0, 8.0, 100.0));
    assert_eq!(fold.label(), "FOLD");
    assert!(fold.reasoning.contains("below pot odds"));
}

#[test]
fn evaluation_is_idempotent() {
    let gto = GtoEvaluator::default();
    let states = [
        preflop("CO", "Jh Td", &[]),
        preflop("BB", "Ah 5h", &["v1 RAISE 2.5"]),
        postflop("9h Th", "Jh Qh 3c", 12.0, 4.0, 80.0),
        postflop("2h Qs", "Kd 7c 2s", 8.0, 0.0, 60.0),
    ];
    for state in &states {
        assert_eq!(gto.evaluate(state), gto.evaluate(state));
    }
}
