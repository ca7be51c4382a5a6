use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::game::{Action, ActionKind, Street};

/// Stable player id: SHA-256 hex of the trimmed, lower-cased display name.
pub fn player_id_for_name(name: &str) -> String {
    let digest = Sha256::digest(name.trim().to_lowercase().as_bytes());
    format!("{digest:x}")
}

/// A numerator/denominator pair. The ratio is undefined until something has
/// been counted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Counter {
    pub num: u32,
    pub denom: u32,
}

impl Counter {
    pub fn new(num: u32, denom: u32) -> Self {
        Self { num, denom }
    }

    pub fn hit(&mut self) {
        self.num += 1;
        self.denom += 1;
    }

    pub fn miss(&mut self) {
        self.denom += 1;
    }

    pub fn ratio(&self) -> Option<f32> {
        (self.denom > 0).then(|| self.num as f32 / self.denom as f32)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Aggression {
    pub bets: u32,
    pub calls: u32,
}

impl Aggression {
    /// Aggression factor, bets per call.
    pub fn factor(&self) -> Option<f32> {
        (self.calls > 0).then(|| self.bets as f32 / self.calls as f32)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PlayerStats {
    pub vpip: Counter,
    pub pfr: Counter,
    pub aggression: Aggression,
    pub fold_to_cbet: Counter,
    pub fold_to_three_bet: Counter,
    pub went_to_showdown: Counter,
}

impl PlayerStats {
    /// Number of observed preflop decisions; drives classification and
    /// blending confidence.
    pub fn sample_size(&self) -> u32 {
        self.vpip.denom
    }
}

/// What the aggregator is told about a player.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Action(ActionKind),
    /// Synthetic observation emitted for every player reaching showdown.
    Showdown,
}

impl Observation {
    fn action(&self) -> Option<Action> {
        match self {
            Observation::Action(kind) => kind.action(),
            Observation::Showdown => None,
        }
    }
}

/// Street the observation happened on, plus facts derived from the hand so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreetContext {
    pub street: Street,
    /// The player opened the pot preflop and has since been re-raised.
    pub facing_three_bet: bool,
}

impl StreetContext {
    pub fn on(street: Street) -> Self {
        Self {
            street,
            facing_three_bet: false,
        }
    }
}

/// Applies one observation to a set of counters.
pub fn apply_observation(stats: &mut PlayerStats, observation: &Observation, ctx: StreetContext) {
    if matches!(observation, Observation::Showdown) {
        stats.went_to_showdown.hit();
        return;
    }
    let action = observation.action();

    if ctx.street == Street::Preflop {
        match action {
            Some(Action::Call | Action::Raise | Action::Bet) => stats.vpip.hit(),
            Some(Action::Fold | Action::Check) => stats.vpip.miss(),
            None => {}
        }
        match action {
            Some(Action::Raise | Action::Bet) => stats.pfr.hit(),
            _ => stats.pfr.miss(),
        }
        if ctx.facing_three_bet {
            match action {
                Some(Action::Fold) => stats.fold_to_three_bet.hit(),
                Some(Action::Call | Action::Raise | Action::Bet) => stats.fold_to_three_bet.miss(),
                _ => {}
            }
        }
    }

    match action {
        Some(Action::Bet | Action::Raise) => stats.aggression.bets += 1,
        Some(Action::Call) => stats.aggression.calls += 1,
        _ => {}
    }

    if ctx.street == Street::Flop {
        match action {
            Some(Action::Fold) => stats.fold_to_cbet.hit(),
            Some(Action::Call | Action::Raise) => stats.fold_to_cbet.miss(),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecord {
    pub id: String,
    pub name: String,
    pub hands_seen: u32,
    pub stats: PlayerStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Created,
    Seen,
}

/// Persistent per-player counters. Implementations must apply `update`
/// atomically per player.
pub trait StatsStore: Send + Sync {
    /// Creates the player on first sighting, otherwise bumps `hands_seen`.
    fn register(&self, player_id: &str, name: &str) -> Registration;

    fn record(&self, player_id: &str) -> Option<PlayerRecord>;

    /// Every known player, most often seen first.
    fn players(&self) -> Vec<PlayerRecord>;

    /// Runs `f` against the player's counters; `false` when the player is unknown.
    fn update(&self, player_id: &str, f: &mut dyn FnMut(&mut PlayerStats)) -> bool;

    fn stats(&self, player_id: &str) -> Option<PlayerStats> {
        self.record(player_id).map(|record| record.stats)
    }
}

/// Feeds one observation into the store. Unregistered players are ignored.
pub fn observe<P: StatsStore + ?Sized>(
    store: &P,
    player_id: &str,
    observation: &Observation,
    ctx: StreetContext,
) -> bool {
    let applied = store.update(player_id, &mut |stats: &mut PlayerStats| {
        apply_observation(stats, observation, ctx)
    });
    if !applied {
        trace!(player_id, "observation for unregistered player dropped");
    }
    applied
}

#[derive(Default)]
pub struct InMemoryStatsStore {
    players: RwLock<HashMap<String, Arc<Mutex<PlayerRecord>>>>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, player_id: &str) -> Option<Arc<Mutex<PlayerRecord>>> {
        self.players.read().get(player_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.players.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StatsStore for InMemoryStatsStore {
    fn register(&self, player_id: &str, name: &str) -> Registration {
        if let Some(entry) = self.entry(player_id) {
            entry.lock().hands_seen += 1;
            return Registration::Seen;
        }
        let mut players = self.players.write();
        match players.get(player_id) {
            Some(entry) => {
                entry.lock().hands_seen += 1;
                Registration::Seen
            }
            None => {
                let record = PlayerRecord {
                    id: player_id.to_string(),
                    name: name.to_string(),
                    hands_seen: 0,
                    stats: PlayerStats::default(),
                };
                players.insert(player_id.to_string(), Arc::new(Mutex::new(record)));
                Registration::Created
            }
        }
    }

    fn record(&self, player_id: &str) -> Option<PlayerRecord> {
        self.entry(player_id).map(|entry| entry.lock().clone())
    }

    fn players(&self) -> Vec<PlayerRecord> {
        let entries: Vec<_> = self.players.read().values().cloned().collect();
        entries
            .iter()
            .map(|entry| entry.lock().clone())
            .sorted_by(|a, b| b.hands_seen.cmp(&a.hands_seen).then_with(|| a.id.cmp(&b.id)))
            .collect()
    }

    fn update(&self, player_id: &str, f: &mut dyn FnMut(&mut PlayerStats)) -> bool {
        match self.entry(player_id) {
            Some(entry) => {
                f(&mut entry.lock().stats);
                true
            }
            None => false,
        }
    }
}
