use poker_adviser::game::{Action, ActionKind, Street};
use poker_adviser::stats::{
    Counter, InMemoryStatsStore, Observation, PlayerStats, StatsStore, StreetContext,
    apply_observation, observe,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const STREETS: [Street; 5] = [
    Street::Preflop,
    Street::Flop,
    Street::Turn,
    Street::River,
    Street::Showdown,
];

fn random_observation(rng: &mut ChaCha8Rng) -> Observation {
    let actions = [
        ActionKind::Known(Action::Fold),
        ActionKind::Known(Action::Check),
        ActionKind::Known(Action::Call),
        ActionKind::Known(Action::Bet),
        ActionKind::Known(Action::Raise),
        ActionKind::Other("ALL_IN".into()),
    ];
    if rng.gen_bool(0.05) {
        Observation::Showdown
    } else {
        Observation::Action(actions.choose(rng).cloned().unwrap_or_default())
    }
}

fn counters(stats: &PlayerStats) -> [Counter; 5] {
    [
        stats.vpip,
        stats.pfr,
        stats.fold_to_cbet,
        stats.fold_to_three_bet,
        stats.went_to_showdown,
    ]
}

#[test]
fn counters_only_grow_and_never_overflow_their_denominator() {
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut stats = PlayerStats::default();
        for _ in 0..300 {
            let before = counters(&stats);
            let aggression = stats.aggression;
            let ctx = StreetContext {
                street: *STREETS.choose(&mut rng).unwrap_or(&Street::Preflop),
                facing_three_bet: rng.gen_bool(0.2),
            };
            apply_observation(&mut stats, &random_observation(&mut rng), ctx);

            for (old, new) in before.iter().zip(counters(&stats)) {
                assert!(new.denom >= old.denom);
                assert!(new.num >= old.num);
                assert!(new.num <= new.denom);
            }
            assert!(stats.aggression.bets >= aggression.bets);
            assert!(stats.aggression.calls >= aggression.calls);
        }
    }
}

#[test]
fn every_preflop_decision_moves_pfr() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut stats = PlayerStats::default();
    let mut decisions = 0;
    for _ in 0..200 {
        let observation = random_observation(&mut rng);
        if matches!(observation, Observation::Action(_)) {
            decisions += 1;
        }
        apply_observation(&mut stats, &observation, StreetContext::on(Street::Preflop));
    }
    assert_eq!(stats.pfr.denom, decisions);
    assert!(stats.vpip.denom <= stats.pfr.denom);
}

#[test]
fn concurrent_observations_are_not_lost() {
    let store = InMemoryStatsStore::new();
    store.register("p1", "Alice");
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..250 {
                    observe(
                        &store,
                        "p1",
                        &Observation::Action(Action::Call.into()),
                        StreetContext::on(Street::Preflop),
                    );
                }
            });
        }
    });
    let stats = store.stats("p1").unwrap();
    assert_eq!(stats.vpip, Counter::new(2000, 2000));
    assert_eq!(stats.aggression.calls, 2000);
}
