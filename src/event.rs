//! Game events as delivered by the data source.
//!
//! On the wire an event is `{ "type": "...", "timestamp": 0, "payload": {..} }`.
//! The payload is decoded into a typed struct per kind. The scraper feeding us
//! is unreliable, so every payload field falls back to its default instead of
//! failing the whole event, and unreadable cards are skipped one by one.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{DefaultOnError, VecSkipError, serde_as};

use crate::cards::Card;
use crate::game::ActionKind;
use crate::stats::player_id_for_name;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Seat {
    #[serde_as(as = "DefaultOnError")]
    pub id: String,
    #[serde_as(as = "DefaultOnError")]
    pub name: String,
    #[serde_as(as = "DefaultOnError")]
    pub position: String,
    #[serde_as(as = "DefaultOnError")]
    pub stack_bb: f32,
    #[serde_as(as = "DefaultOnError")]
    pub active: bool,
}

impl Default for Seat {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            position: String::new(),
            stack_bb: 0.0,
            active: true,
        }
    }
}

impl Seat {
    /// Seats reported without an id are keyed by their hashed display name.
    fn normalised(mut self) -> Option<Self> {
        if self.id.is_empty() {
            if self.name.trim().is_empty() {
                return None;
            }
            self.id = player_id_for_name(&self.name);
        }
        Some(self)
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct HandStart {
    #[serde_as(as = "DefaultOnError")]
    pub hand_id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub small_blind_bb: Option<f32>,
    #[serde_as(as = "DefaultOnError")]
    pub big_blind_bb: Option<f32>,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub players: Vec<Seat>,
    #[serde_as(as = "DefaultOnError")]
    pub hero_position: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub hero_id: Option<String>,
}

impl HandStart {
    /// Missing, null or unreadable blinds count as 0.5/1.
    pub fn blinds(&self) -> (f32, f32) {
        (
            self.small_blind_bb.unwrap_or(0.5),
            self.big_blind_bb.unwrap_or(1.0),
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DealTarget {
    Hero,
    Board,
    #[default]
    Other,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CardDeal {
    #[serde_as(as = "DefaultOnError")]
    pub target: DealTarget,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub cards: Vec<Card>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PlayerAction {
    #[serde_as(as = "DefaultOnError")]
    pub player_id: String,
    #[serde_as(as = "DefaultOnError")]
    pub action: ActionKind,
    #[serde_as(as = "DefaultOnError")]
    pub amount_bb: Option<f32>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PlayerJoin {
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub players: Vec<Seat>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct ShowdownEntry {
    #[serde_as(as = "DefaultOnError")]
    pub id: String,
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub cards: Vec<Card>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Showdown {
    #[serde_as(as = "DefaultOnError<VecSkipError<_>>")]
    pub players: Vec<ShowdownEntry>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct PotWin {
    #[serde_as(as = "DefaultOnError")]
    pub winner_id: Option<String>,
    #[serde_as(as = "DefaultOnError")]
    pub amount_bb: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    HandStart(HandStart),
    CardDeal(CardDeal),
    Action(PlayerAction),
    PlayerJoin(PlayerJoin),
    Showdown(Showdown),
    PotWin(PotWin),
    /// A kind this engine does not know about yet; carried so it can be logged.
    Unknown(String),
}

impl EventKind {
    pub fn name(&self) -> &str {
        match self {
            EventKind::HandStart(_) => "HAND_START",
            EventKind::CardDeal(_) => "CARD_DEAL",
            EventKind::Action(_) => "ACTION",
            EventKind::PlayerJoin(_) => "PLAYER_JOIN",
            EventKind::Showdown(_) => "SHOWDOWN",
            EventKind::PotWin(_) => "POT_WIN",
            EventKind::Unknown(kind) => kind,
        }
    }

    /// Seats named by this event that should be registered with the stats store.
    pub fn seats(&self) -> &[Seat] {
        match self {
            EventKind::HandStart(start) => &start.players,
            EventKind::PlayerJoin(join) => &join.players,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameEvent {
    pub timestamp: i64,
    pub kind: EventKind,
}

impl GameEvent {
    pub fn new(timestamp: i64, kind: EventKind) -> Self {
        Self { timestamp, kind }
    }
}

/// Untyped wire shape; every event passes through here on its way in and out.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawEvent {
    #[serde(rename = "type")]
    #[serde_as(as = "DefaultOnError")]
    pub kind: String,
    #[serde_as(as = "DefaultOnError")]
    pub timestamp: i64,
    pub payload: Value,
}

fn decode_payload<T: DeserializeOwned + Default>(payload: Value) -> T {
    serde_json::from_value(payload).unwrap_or_default()
}

fn normalise_seats(seats: Vec<Seat>) -> Vec<Seat> {
    seats.into_iter().filter_map(Seat::normalised).collect()
}

impl From<RawEvent> for GameEvent {
    fn from(raw: RawEvent) -> Self {
        let kind = match raw.kind.trim().to_ascii_uppercase().as_str() {
            "HAND_START" => {
                let mut start: HandStart = decode_payload(raw.payload);
                start.players = normalise_seats(start.players);
                EventKind::HandStart(start)
            }
            "CARD_DEAL" => EventKind::CardDeal(decode_payload(raw.payload)),
            "ACTION" => EventKind::Action(decode_payload(raw.payload)),
            "PLAYER_JOIN" => {
                let mut join: PlayerJoin = decode_payload(raw.payload);
                join.players = normalise_seats(join.players);
                EventKind::PlayerJoin(join)
            }
            "SHOWDOWN" => EventKind::Showdown(decode_payload(raw.payload)),
            "POT_WIN" => EventKind::PotWin(decode_payload(raw.payload)),
            _ => EventKind::Unknown(raw.kind),
        };
        GameEvent {
            timestamp: raw.timestamp,
            kind,
        }
    }
}

impl From<GameEvent> for RawEvent {
    fn from(event: GameEvent) -> Self {
        let name = event.kind.name().to_string();
        let payload = match event.kind {
            EventKind::HandStart(p) => serde_json::to_value(p),
            EventKind::CardDeal(p) => serde_json::to_value(p),
            EventKind::Action(p) => serde_json::to_value(p),
            EventKind::PlayerJoin(p) => serde_json::to_value(p),
            EventKind::Showdown(p) => serde_json::to_value(p),
            EventKind::PotWin(p) => serde_json::to_value(p),
            EventKind::Unknown(_) => Ok(Value::Null),
        }
        .unwrap_or(Value::Null);
        RawEvent {
            kind: name,
            timestamp: event.timestamp,
            payload,
        }
    }
}

impl<'de> Deserialize<'de> for GameEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawEvent::deserialize(deserializer).map(GameEvent::from)
    }
}

impl Serialize for GameEvent {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        RawEvent::from(self.clone()).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Action;

    fn decode(json: &str) -> GameEvent {
        serde_json::from_str(json).expect("wire event decodes")
    }

    #[test]
    fn hand_start_defaults_blinds() {
        let event = decode(r#"{"type":"HAND_START","timestamp":1,"payload":{"hand_id":"h1"}}"#);
        match event.kind {
            EventKind::HandStart(start) => {
                assert_eq!(start.hand_id.as_deref(), Some("h1"));
                assert_eq!(start.blinds(), (0.5, 1.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn malformed_fields_default() {
        let event = decode(
            r#"{"type":"ACTION","timestamp":"soon","payload":{"player_id":7,"action":"RAISE","amount_bb":"big"}}"#,
        );
        assert_eq!(event.timestamp, 0);
        match event.kind {
            EventKind::Action(action) => {
                assert_eq!(action.player_id, "");
                assert_eq!(action.action, ActionKind::Known(Action::Raise));
                assert_eq!(action.amount_bb, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_cards_are_skipped_individually() {
        let event = decode(
            r#"{"type":"CARD_DEAL","timestamp":3,"payload":{"target":"board","cards":["Kd","?","8d"]}}"#,
        );
        match event.kind {
            EventKind::CardDeal(deal) => {
                assert_eq!(deal.target, DealTarget::Board);
                assert_eq!(deal.cards.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_kinds_survive_decoding() {
        let event = decode(r#"{"type":"CHAT","timestamp":4,"payload":{"text":"gl"}}"#);
        assert_eq!(event.kind, EventKind::Unknown("CHAT".into()));
    }

    #[test]
    fn nameless_seats_are_hashed_or_dropped() {
        let event = decode(
            r#"{"type":"PLAYER_JOIN","timestamp":5,"payload":{"players":[{"name":"Alice"},{"position":"BB"}]}}"#,
        );
        let seats = event.kind.seats();
        assert_eq!(seats.len(), 1);
        assert_eq!(seats[0].id, player_id_for_name("alice"));
        assert!(seats[0].active);
    }

    #[test]
    fn non_object_payload_is_tolerated() {
        let event = decode(r#"{"type":"POT_WIN","timestamp":6,"payload":"oops"}"#);
        assert_eq!(event.kind, EventKind::PotWin(PotWin::default()));
    }
}
