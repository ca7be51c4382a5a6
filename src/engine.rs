use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};
use uuid::Uuid;

use crate::adviser::{Adviser, DecisionSource};
use crate::config::AdviserConfig;
use crate::error::AdviceError;
use crate::event::{EventKind, GameEvent};
use crate::game::{Decision, GameState};
use crate::gto::GtoEvaluator;
use crate::history::{HandRecord, HistoryStore, InMemoryHistoryStore, LoggedEvent, SessionSummary};
use crate::profile::PlayerProfile;
use crate::ranges::RangeCharts;
use crate::stats::{InMemoryStatsStore, Observation, PlayerStats, Registration, StatsStore, StreetContext, observe};
use crate::tracker::{HandState, InMemorySessionStore, SessionStore, Tracker};

/// Wires the tracker, the stats and history stores and the adviser together.
#[derive(Clone)]
pub struct Engine {
    tracker: Tracker,
    stats: Arc<dyn StatsStore>,
    history: Arc<dyn HistoryStore>,
    adviser: Adviser,
    config: AdviserConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_stores(
            AdviserConfig::default(),
            RangeCharts::default(),
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryStatsStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
        )
    }
}

impl Engine {
    /// In-memory engine; loads range charts from `config.charts_path` if set.
    pub fn new(config: AdviserConfig) -> Result<Self> {
        let charts = config.charts()?;
        Ok(Self::with_stores(
            config,
            charts,
            Arc::new(InMemorySessionStore::new()),
            Arc::new(InMemoryStatsStore::new()),
            Arc::new(InMemoryHistoryStore::new()),
        ))
    }

    pub fn with_stores(
        config: AdviserConfig,
        charts: RangeCharts,
        sessions: Arc<dyn SessionStore>,
        stats: Arc<dyn StatsStore>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            tracker: Tracker::new(sessions),
            stats,
            history,
            adviser: Adviser::new(GtoEvaluator::new(charts)),
            config,
        }
    }

    pub fn config(&self) -> &AdviserConfig {
        &self.config
    }

    pub fn adviser(&self) -> &Adviser {
        &self.adviser
    }

    /// Registers seated players, feeds the stats aggregator, folds the event
    /// into the session's hand state and records it in the history.
    pub fn ingest(&self, session_id: &str, event: &GameEvent) -> HandState {
        for seat in event.kind.seats() {
            if self.stats.register(&seat.id, &seat.name) == Registration::Created {
                debug!(player_id = %seat.id, name = %seat.name, "new player registered");
            }
        }

        let stats = self.stats.as_ref();
        let before = |state: &HandState| match &event.kind {
            EventKind::Action(action) if !action.player_id.is_empty() => {
                let ctx = StreetContext {
                    street: state.street,
                    facing_three_bet: state.facing_three_bet(&action.player_id),
                };
                let observation = Observation::Action(action.action.clone());
                observe(stats, &action.player_id, &observation, ctx);
            }
            EventKind::Showdown(showdown) => {
                let ctx = StreetContext::on(state.street);
                for entry in &showdown.players {
                    observe(stats, &entry.id, &Observation::Showdown, ctx);
                }
            }
            _ => {}
        };
        let after = |state: &HandState| self.record_history(session_id, event, state);
        self.tracker.apply_with(session_id, event, before, after)
    }

    fn record_history(&self, session_id: &str, event: &GameEvent, state: &HandState) {
        let history = self.history.as_ref();
        history.log_event(session_id, state.hand_id.as_deref(), event);
        match &event.kind {
            EventKind::HandStart(_) => history.open_hand(HandRecord::opened(state, event.timestamp)),
            kind => {
                let hero_action = match kind {
                    EventKind::Action(action)
                        if state.hero_id.as_deref() == Some(action.player_id.as_str()) =>
                    {
                        action.action.action()
                    }
                    _ => None,
                };
                history.update_hand(session_id, &mut |record: &mut HandRecord| {
                    record.sync(state);
                    if hero_action.is_some() {
                        record.hero_decision = hero_action;
                    }
                });
            }
        }
    }

    pub fn hand_state(&self, session_id: &str) -> Option<HandState> {
        self.tracker.state(session_id)
    }

    fn villain_stats(&self, state: &GameState) -> Option<PlayerStats> {
        state
            .primary_villain()
            .and_then(|villain| self.stats.stats(&villain.player_id))
    }

    /// Rule-based decision against the primary villain's stats.
    pub fn decide(&self, state: &GameState, lambda: Option<f32>) -> Result<Decision, AdviceError> {
        let villain = self.villain_stats(state);
        self.adviser.decide(
            state,
            lambda.unwrap_or(self.config.default_lambda),
            villain.as_ref(),
        )
    }

    /// Decides for a tracked session's current hand and records the
    /// recommendation in its hand history. `None` when the session is unknown.
    pub fn decide_session(
        &self,
        session_id: &str,
        lambda: Option<f32>,
    ) -> Option<Result<Decision, AdviceError>> {
        let state = self.hand_state(session_id)?;
        let decision = self.decide(&state.game_state(), lambda);
        if let Ok(decision) = &decision {
            self.history
                .update_hand(session_id, &mut |record: &mut HandRecord| record.recommend(decision));
        }
        Some(decision)
    }

    pub async fn decide_with(
        &self,
        source: &dyn DecisionSource,
        state: &GameState,
        lambda: Option<f32>,
    ) -> Result<Decision, AdviceError> {
        let villain = self.villain_stats(state);
        self.adviser
            .advise_with(
                source,
                state,
                lambda.unwrap_or(self.config.default_lambda),
                villain.as_ref(),
                self.config.external_timeout(),
            )
            .await
    }

    pub fn lookup(&self, player_id: &str) -> PlayerProfile {
        self.stats
            .record(player_id)
            .map_or_else(|| PlayerProfile::unknown(player_id), PlayerProfile::from)
    }

    /// Every known player, most often seen first.
    pub fn players(&self) -> Vec<PlayerProfile> {
        self.stats.players().into_iter().map(PlayerProfile::from).collect()
    }

    /// Hands played, session start and decision counts; `None` when the
    /// session is neither tracked nor has any recorded hands.
    pub fn session_summary(&self, session_id: &str) -> Option<SessionSummary> {
        let hands = self.history.session_hands(session_id);
        if hands.is_empty() && self.hand_state(session_id).is_none() {
            return None;
        }
        let events = self.history.events(session_id).len();
        Some(SessionSummary::new(session_id, &hands, events))
    }

    pub fn session_events(&self, session_id: &str) -> Vec<LoggedEvent> {
        self.history.events(session_id)
    }

    /// Up to `limit` recorded hands across sessions, newest first.
    pub fn recent_hands(&self, limit: usize) -> Vec<HandRecord> {
        self.history.recent_hands(limit)
    }

    pub fn start_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.tracker.store().open(&session_id);
        session_id
    }

    /// Forgets the session and its event log; its hand records stay.
    pub fn end_session(&self, session_id: &str) -> bool {
        let ended = self.tracker.end(session_id);
        self.history.prune_events(&|id| id != session_id);
        ended
    }

    /// Drops sessions idle for longer than the configured TTL, along with
    /// their event logs.
    pub fn evict_idle(&self) -> usize {
        let evicted = self.tracker.evict_idle(self.config.session_ttl());
        if evicted > 0 {
            let tracker = &self.tracker;
            let logs = self.history.prune_events(&|id| tracker.state(id).is_some());
            info!(evicted, logs, "evicted idle sessions");
        }
        evicted
    }
}
