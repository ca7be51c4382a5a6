//! Folds the event stream of each session into a single [`HandState`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cards::Card;
use crate::event::{DealTarget, EventKind, GameEvent, HandStart, PlayerAction, Seat};
use crate::game::{Action, ActionKind, GameState, MAX_BOARD_CARDS, MAX_HERO_CARDS, Street, Villain};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordedAction {
    pub player_id: String,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_bb: Option<f32>,
}

impl RecordedAction {
    fn is_aggressive(&self) -> bool {
        self.action.action().is_some_and(Action::is_aggressive)
    }

    /// History token such as `p2 RAISE 2.5`.
    pub fn token(&self) -> String {
        match self.amount_bb {
            Some(amount) => format!("{} {} {}", self.player_id, self.action, amount),
            None => format!("{} {}", self.player_id, self.action),
        }
    }
}

impl From<&PlayerAction> for RecordedAction {
    fn from(action: &PlayerAction) -> Self {
        Self {
            player_id: action.player_id.clone(),
            action: action.action.clone(),
            amount_bb: action.amount_bb,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HandState {
    pub session_id: String,
    pub hand_id: Option<String>,
    pub street: Street,
    pub hero_position: Option<String>,
    pub hero_id: Option<String>,
    pub hero_cards: Vec<Card>,
    pub board: Vec<Card>,
    pub pot_bb: f32,
    pub players: Vec<Seat>,
    pub actions: BTreeMap<Street, Vec<RecordedAction>>,
    /// Events applied since the last `HAND_START` (inclusive).
    pub event_count: u32,
}

impl HandState {
    /// Empty state for a session that has not seen a hand start yet.
    pub fn fresh(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            ..Self::default()
        }
    }

    fn started(session_id: &str, start: &HandStart) -> Self {
        let (small_blind, big_blind) = start.blinds();
        Self {
            session_id: session_id.to_string(),
            hand_id: start.hand_id.clone(),
            street: Street::Preflop,
            hero_position: start.hero_position.clone(),
            hero_id: start.hero_id.clone(),
            pot_bb: small_blind + big_blind,
            players: start.players.clone(),
            ..Self::default()
        }
    }

    pub fn street_actions(&self, street: Street) -> &[RecordedAction] {
        self.actions.get(&street).map_or(&[], Vec::as_slice)
    }

    pub fn seat(&self, player_id: &str) -> Option<&Seat> {
        self.players.iter().find(|seat| seat.id == player_id)
    }

    /// True when `player_id` made the first preflop raise, someone else has
    /// re-raised since, and the player has not acted after that re-raise.
    pub fn facing_three_bet(&self, player_id: &str) -> bool {
        let preflop = self.street_actions(Street::Preflop);
        let Some(open) = preflop.iter().position(RecordedAction::is_aggressive) else {
            return false;
        };
        if preflop[open].player_id != player_id {
            return false;
        }
        let after_open = &preflop[open + 1..];
        let Some(reraise) = after_open
            .iter()
            .position(|action| action.player_id != player_id && action.is_aggressive())
        else {
            return false;
        };
        !after_open[reraise + 1..]
            .iter()
            .any(|action| action.player_id == player_id)
    }

    /// Chips each player has put in on `street`.
    fn commitments(&self, street: Street) -> HashMap<&str, f32> {
        let mut committed: HashMap<&str, f32> = HashMap::new();
        for action in self.street_actions(street) {
            if action.action.action().is_some_and(Action::puts_chips_in) {
                *committed.entry(action.player_id.as_str()).or_default() +=
                    action.amount_bb.unwrap_or(0.0).max(0.0);
            }
        }
        committed
    }

    /// Projects the tracked hand into the view the evaluators work from.
    pub fn game_state(&self) -> GameState {
        let hero_id = self.hero_id.as_deref();
        let committed = self.commitments(self.street);
        let largest = committed.values().copied().fold(0.0_f32, f32::max);
        let hero_in = hero_id
            .and_then(|id| committed.get(id).copied())
            .unwrap_or(0.0);

        let villains = self
            .players
            .iter()
            .filter(|seat| seat.active && Some(seat.id.as_str()) != hero_id)
            .map(|seat| Villain {
                player_id: seat.id.clone(),
                position: seat.position.clone(),
                stack_bb: seat.stack_bb,
            })
            .collect();

        GameState {
            street: self.street,
            hero_position: self.hero_position.clone(),
            hero_cards: self.hero_cards.clone(),
            board: self.board.clone(),
            pot_bb: self.pot_bb,
            to_call_bb: (largest - hero_in).max(0.0),
            stack_bb: hero_id
                .and_then(|id| self.seat(id))
                .map_or(0.0, |seat| seat.stack_bb),
            villains,
            action_history: self
                .street_actions(self.street)
                .iter()
                .map(RecordedAction::token)
                .collect(),
        }
    }

    fn deal(&mut self, target: DealTarget, cards: &[Card]) {
        match target {
            DealTarget::Hero => {
                if cards.len() > MAX_HERO_CARDS {
                    warn!(dealt = cards.len(), "extra hero cards dropped");
                }
                self.hero_cards = cards.iter().take(MAX_HERO_CARDS).copied().collect();
            }
            DealTarget::Board => {
                let room = MAX_BOARD_CARDS.saturating_sub(self.board.len());
                if cards.len() > room {
                    warn!(
                        dealt = cards.len(),
                        board = self.board.len(),
                        "board full, surplus cards dropped"
                    );
                }
                self.board.extend(cards.iter().take(room).copied());
                match Street::from_board_len(self.board.len()) {
                    Some(street) if street > self.street => self.street = street,
                    Some(_) => {}
                    None => debug!(board = self.board.len(), "board length maps to no street"),
                }
            }
            DealTarget::Other => debug!("card deal without a known target ignored"),
        }
    }

    fn act(&mut self, action: &PlayerAction) {
        let recorded = RecordedAction::from(action);
        match recorded.action.action() {
            Some(kind) if kind.puts_chips_in() => {
                self.pot_bb += recorded.amount_bb.unwrap_or(0.0).max(0.0);
            }
            Some(Action::Fold) => {
                if let Some(seat) = self.players.iter_mut().find(|s| s.id == recorded.player_id) {
                    seat.active = false;
                }
            }
            Some(_) => {}
            None => debug!(action = %recorded.action, "unrecognised action recorded as-is"),
        }
        self.actions.entry(self.street).or_default().push(recorded);
    }

    fn join(&mut self, seats: &[Seat]) {
        for seat in seats {
            if self.seat(&seat.id).is_none() {
                self.players.push(seat.clone());
            }
        }
    }

    fn advance_to(&mut self, street: Street) {
        self.street = self.street.max(street);
    }

    /// Applies one event in place.
    pub fn apply(&mut self, event: &GameEvent) {
        match &event.kind {
            EventKind::HandStart(start) => {
                *self = HandState::started(&self.session_id, start);
            }
            EventKind::CardDeal(deal) => self.deal(deal.target, &deal.cards),
            EventKind::Action(action) => self.act(action),
            EventKind::PlayerJoin(join) => self.join(&join.players),
            EventKind::Showdown(_) => self.advance_to(Street::Showdown),
            EventKind::PotWin(_) => self.advance_to(Street::HandOver),
            EventKind::Unknown(kind) => {
                debug!(kind = %kind, session_id = %self.session_id, "unknown event ignored");
            }
        }
        self.event_count = self.event_count.saturating_add(1);
    }
}

#[derive(Debug)]
pub struct SessionEntry {
    pub state: HandState,
    pub last_seen: Instant,
}

impl SessionEntry {
    fn new(session_id: &str) -> Self {
        Self {
            state: HandState::fresh(session_id),
            last_seen: Instant::now(),
        }
    }
}

/// Where per-session hand state lives. Each session sits behind its own lock
/// so different sessions never contend.
pub trait SessionStore: Send + Sync {
    /// Returns the session's entry, creating it on first use.
    fn open(&self, session_id: &str) -> Arc<Mutex<SessionEntry>>;

    fn get(&self, session_id: &str) -> Option<HandState>;

    fn remove(&self, session_id: &str) -> bool;

    /// Drops sessions idle for longer than `ttl`, returning how many went.
    fn evict_idle(&self, ttl: Duration) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionEntry>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn open(&self, session_id: &str) -> Arc<Mutex<SessionEntry>> {
        if let Some(entry) = self.sessions.read().get(session_id) {
            return entry.clone();
        }
        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SessionEntry::new(session_id))))
            .clone()
    }

    fn get(&self, session_id: &str) -> Option<HandState> {
        let entry = self.sessions.read().get(session_id).cloned()?;
        let state = entry.lock().state.clone();
        Some(state)
    }

    fn remove(&self, session_id: &str) -> bool {
        self.sessions.write().remove(session_id).is_some()
    }

    fn evict_idle(&self, ttl: Duration) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.lock().last_seen.elapsed() < ttl);
        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

/// Applies events to sessions held in a [`SessionStore`].
#[derive(Clone)]
pub struct Tracker {
    store: Arc<dyn SessionStore>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(Arc::new(InMemorySessionStore::new()))
    }
}

impl Tracker {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Applies `event` to the session and returns a copy of the new state.
    pub fn apply(&self, session_id: &str, event: &GameEvent) -> HandState {
        self.apply_with(session_id, event, |_| {}, |_| {})
    }

    /// Like [`Tracker::apply`], but shows `before` the state the event lands
    /// on and `after` the state it produces. Both run under the session lock,
    /// so per-session hooks see events in order.
    pub fn apply_with(
        &self,
        session_id: &str,
        event: &GameEvent,
        before: impl FnOnce(&HandState),
        after: impl FnOnce(&HandState),
    ) -> HandState {
        let entry = self.store.open(session_id);
        let mut entry = entry.lock();
        entry.last_seen = Instant::now();
        before(&entry.state);
        entry.state.apply(event);
        after(&entry.state);
        entry.state.clone()
    }

    pub fn state(&self, session_id: &str) -> Option<HandState> {
        self.store.get(session_id)
    }

    pub fn end(&self, session_id: &str) -> bool {
        self.store.remove(session_id)
    }

    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.store.evict_idle(ttl)
    }
}
