//! Hand history and raw event log, kept for reviewing a session afterwards.
//!
//! One [`HandRecord`] is opened per `HAND_START` and kept in sync with the
//! tracked hand: cards, board, the hero's last action and the last
//! recommendation served for it. Event logs live only as long as their
//! session; hand records outlive it up to the store's capacity.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::event::GameEvent;
use crate::game::{Action, Decision, DecisionOrigin};
use crate::tracker::HandState;

pub const DEFAULT_HAND_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub hand_id: Option<String>,
    pub event: GameEvent,
}

/// Wire form: the event itself plus the hand it belonged to.
#[derive(Serialize)]
struct LoggedEventRef<'a> {
    hand_id: Option<&'a str>,
    #[serde(flatten)]
    event: &'a GameEvent,
}

impl Serialize for LoggedEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        LoggedEventRef {
            hand_id: self.hand_id.as_deref(),
            event: &self.event,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRecord {
    pub session_id: String,
    pub hand_id: Option<String>,
    /// Timestamp of the `HAND_START` that opened the hand.
    pub played_at: i64,
    pub hero_position: Option<String>,
    pub hero_cards: Vec<Card>,
    pub board: Vec<Card>,
    /// The hero's most recent action in this hand.
    pub hero_decision: Option<Action>,
    /// Label of the last recommendation served for this hand.
    pub recommended: Option<String>,
    pub lambda_used: Option<f32>,
    pub origin: Option<DecisionOrigin>,
}

impl HandRecord {
    pub fn opened(state: &HandState, played_at: i64) -> Self {
        Self {
            session_id: state.session_id.clone(),
            hand_id: state.hand_id.clone(),
            played_at,
            hero_position: state.hero_position.clone(),
            hero_cards: state.hero_cards.clone(),
            board: state.board.clone(),
            hero_decision: None,
            recommended: None,
            lambda_used: None,
            origin: None,
        }
    }

    pub fn sync(&mut self, state: &HandState) {
        self.hero_position.clone_from(&state.hero_position);
        self.hero_cards.clone_from(&state.hero_cards);
        self.board.clone_from(&state.board);
    }

    pub fn recommend(&mut self, decision: &Decision) {
        self.recommended = Some(decision.label());
        self.lambda_used = Some(decision.effective_lambda);
        self.origin = Some(decision.origin);
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DecisionCounts {
    pub fold: u32,
    pub check: u32,
    pub call: u32,
    pub bet: u32,
    pub raise: u32,
}

impl DecisionCounts {
    pub fn tally(&mut self, action: Action) {
        let slot = match action {
            Action::Fold => &mut self.fold,
            Action::Check => &mut self.check,
            Action::Call => &mut self.call,
            Action::Bet => &mut self.bet,
            Action::Raise => &mut self.raise,
        };
        *slot += 1;
    }

    pub fn total(&self) -> u32 {
        self.fold + self.check + self.call + self.bet + self.raise
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub session_id: String,
    pub hands_played: usize,
    /// `played_at` of the earliest recorded hand.
    pub session_start: Option<i64>,
    pub events_logged: usize,
    pub hero_decisions: DecisionCounts,
    /// Hands for which a recommendation was served, by recommended action.
    pub recommendations: DecisionCounts,
}

impl SessionSummary {
    pub fn new(session_id: &str, hands: &[HandRecord], events_logged: usize) -> Self {
        let mut hero_decisions = DecisionCounts::default();
        let mut recommendations = DecisionCounts::default();
        for hand in hands {
            if let Some(action) = hand.hero_decision {
                hero_decisions.tally(action);
            }
            if let Some(action) = hand
                .recommended
                .as_deref()
                .and_then(|label| label.split_whitespace().next())
                .and_then(|head| head.parse::<Action>().ok())
            {
                recommendations.tally(action);
            }
        }
        Self {
            session_id: session_id.to_string(),
            hands_played: hands.len(),
            session_start: hands.iter().map(|hand| hand.played_at).min(),
            events_logged,
            hero_decisions,
            recommendations,
        }
    }
}

/// Storage for hand records and per-session event logs.
pub trait HistoryStore: Send + Sync {
    fn log_event(&self, session_id: &str, hand_id: Option<&str>, event: &GameEvent);

    fn events(&self, session_id: &str) -> Vec<LoggedEvent>;

    /// Drops the event log of every session `keep` rejects, returning how
    /// many logs went. `keep` runs without any of the store's locks held.
    fn prune_events(&self, keep: &dyn Fn(&str) -> bool) -> usize;

    fn open_hand(&self, record: HandRecord);

    /// Runs `f` on the session's latest hand; `false` when it has none.
    fn update_hand(&self, session_id: &str, f: &mut dyn FnMut(&mut HandRecord)) -> bool;

    /// The session's hands, oldest first.
    fn session_hands(&self, session_id: &str) -> Vec<HandRecord>;

    /// Up to `limit` hands across all sessions, newest first.
    fn recent_hands(&self, limit: usize) -> Vec<HandRecord>;
}

pub struct InMemoryHistoryStore {
    capacity: usize,
    hands: RwLock<VecDeque<HandRecord>>,
    events: RwLock<HashMap<String, Vec<LoggedEvent>>>,
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HAND_CAPACITY)
    }
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` hand records, dropping the oldest first.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            hands: RwLock::new(VecDeque::new()),
            events: RwLock::new(HashMap::new()),
        }
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn log_event(&self, session_id: &str, hand_id: Option<&str>, event: &GameEvent) {
        self.events
            .write()
            .entry(session_id.to_string())
            .or_default()
            .push(LoggedEvent {
                hand_id: hand_id.map(str::to_string),
                event: event.clone(),
            });
    }

    fn events(&self, session_id: &str) -> Vec<LoggedEvent> {
        self.events.read().get(session_id).cloned().unwrap_or_default()
    }

    fn prune_events(&self, keep: &dyn Fn(&str) -> bool) -> usize {
        let logged: Vec<String> = self.events.read().keys().cloned().collect();
        let doomed: Vec<String> = logged.into_iter().filter(|id| !keep(id.as_str())).collect();
        let mut events = self.events.write();
        doomed.iter().filter(|id| events.remove(id.as_str()).is_some()).count()
    }

    fn open_hand(&self, record: HandRecord) {
        let mut hands = self.hands.write();
        if hands.len() == self.capacity {
            hands.pop_front();
        }
        hands.push_back(record);
    }

    fn update_hand(&self, session_id: &str, f: &mut dyn FnMut(&mut HandRecord)) -> bool {
        let mut hands = self.hands.write();
        match hands.iter_mut().rev().find(|hand| hand.session_id == session_id) {
            Some(hand) => {
                f(hand);
                true
            }
            None => false,
        }
    }

    fn session_hands(&self, session_id: &str) -> Vec<HandRecord> {
        self.hands
            .read()
            .iter()
            .filter(|hand| hand.session_id == session_id)
            .cloned()
            .collect()
    }

    fn recent_hands(&self, limit: usize) -> Vec<HandRecord> {
        self.hands.read().iter().rev().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn hand(session_id: &str, hand_id: &str, played_at: i64) -> HandRecord {
        let state = HandState {
            hand_id: Some(hand_id.into()),
            ..HandState::fresh(session_id)
        };
        HandRecord::opened(&state, played_at)
    }

    #[test]
    fn capacity_drops_oldest_hands() {
        let store = InMemoryHistoryStore::with_capacity(2);
        store.open_hand(hand("s1", "h1", 1));
        store.open_hand(hand("s1", "h2", 2));
        store.open_hand(hand("s2", "h3", 3));

        let recent = store.recent_hands(10);
        let ids: Vec<_> = recent.iter().filter_map(|h| h.hand_id.as_deref()).collect();
        assert_eq!(ids, ["h3", "h2"]);
        assert_eq!(store.session_hands("s1").len(), 1);
    }

    #[test]
    fn updates_land_on_the_latest_hand_of_the_session() {
        let store = InMemoryHistoryStore::new();
        store.open_hand(hand("s1", "h1", 1));
        store.open_hand(hand("s1", "h2", 2));
        store.open_hand(hand("s2", "h3", 3));

        assert!(store.update_hand("s1", &mut |h| h.hero_decision = Some(Action::Call)));
        assert!(!store.update_hand("s9", &mut |_| {}));

        let hands = store.session_hands("s1");
        assert_eq!(hands[0].hero_decision, None);
        assert_eq!(hands[1].hero_decision, Some(Action::Call));
    }

    #[test]
    fn pruning_keeps_only_accepted_logs() {
        let store = InMemoryHistoryStore::new();
        let event = GameEvent::new(1, EventKind::Unknown("PING".into()));
        store.log_event("s1", None, &event);
        store.log_event("s2", Some("h1"), &event);

        assert_eq!(store.prune_events(&|id| id == "s2"), 1);
        assert!(store.events("s1").is_empty());
        assert_eq!(store.events("s2")[0].hand_id.as_deref(), Some("h1"));
    }

    #[test]
    fn summary_counts_hero_actions_and_recommendations() {
        let mut first = hand("s1", "h1", 20);
        first.hero_decision = Some(Action::Raise);
        first.recommended = Some("RAISE 2.5x".into());
        let mut second = hand("s1", "h2", 10);
        second.hero_decision = Some(Action::Fold);
        let third = hand("s1", "h3", 30);

        let summary = SessionSummary::new("s1", &[first, second, third], 7);
        assert_eq!(summary.hands_played, 3);
        assert_eq!(summary.session_start, Some(10));
        assert_eq!(summary.events_logged, 7);
        assert_eq!(summary.hero_decisions.raise, 1);
        assert_eq!(summary.hero_decisions.fold, 1);
        assert_eq!(summary.hero_decisions.total(), 2);
        assert_eq!(summary.recommendations.raise, 1);
        assert_eq!(summary.recommendations.total(), 1);
    }
}
