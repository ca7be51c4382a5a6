use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use owo_colors::OwoColorize;

use crate::cards::Card;
use crate::engine::Engine;
use crate::error::AdviceError;
use crate::event::{EventKind, GameEvent};
use crate::game::Decision;
use crate::tracker::HandState;

#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    pub lambda: Option<f32>,
    pub no_color: bool,
}

#[derive(Debug, Clone)]
pub struct ReplaySummary {
    pub events: usize,
    pub hands: usize,
    pub final_state: HandState,
    pub decision: Result<Decision, AdviceError>,
}

/// Reads wire events from a JSON array or a JSON-lines file.
pub fn load_events(path: &Path) -> Result<Vec<GameEvent>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading events from {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw)
            .with_context(|| format!("parsing event array in {}", path.display()));
    }
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("parsing event on line {} of {}", idx + 1, path.display()))
        })
        .collect()
}

/// Feeds a recorded event stream through the engine under one session.
pub struct Replayer {
    engine: Engine,
    config: ReplayConfig,
}

impl Replayer {
    pub fn new(engine: Engine, config: ReplayConfig) -> Self {
        Self { engine, config }
    }

    pub fn replay(&self, events: &[GameEvent]) -> ReplaySummary {
        let session_id = self.engine.start_session();
        let mut final_state = HandState::fresh(&session_id);
        for event in events {
            final_state = self.engine.ingest(&session_id, event);
        }
        let hands = events
            .iter()
            .filter(|event| matches!(event.kind, EventKind::HandStart(_)))
            .count();

        let decision = self.engine.decide(&final_state.game_state(), self.config.lambda);
        self.engine.end_session(&session_id);

        ReplaySummary {
            events: events.len(),
            hands,
            final_state,
            decision,
        }
    }

    pub fn run(&self, path: &Path) -> Result<ReplaySummary> {
        let events = load_events(path)?;
        let summary = self.replay(&events);
        self.print_summary(&summary);
        Ok(summary)
    }

    fn describe_cards(&self, cards: &[Card]) -> String {
        if cards.is_empty() {
            "--".to_string()
        } else if self.config.no_color {
            cards.iter().map(Card::notation).join(" ")
        } else {
            cards.iter().map(Card::pretty).join(" ")
        }
    }

    fn print_line(&self, label: &str, value: &str) {
        if self.config.no_color {
            println!("{label}: {value}");
        } else {
            println!("{} {}", format!("{label}:").bold().white(), value);
        }
    }

    pub fn print_summary(&self, summary: &ReplaySummary) {
        let state = &summary.final_state;
        let hero = self.describe_cards(&state.hero_cards);
        let board = self.describe_cards(&state.board);
        let hand_id = state.hand_id.as_deref().unwrap_or("--");

        if self.config.no_color {
            println!(
                "Replayed {} events over {} hands | Hand {} | Street {} | Hero {} | Board {} | Pot {:.1}bb",
                summary.events, summary.hands, hand_id, state.street, hero, board, state.pot_bb
            );
        } else {
            println!(
                "{} {} events, {} hands {} {} {} {} {} {} {} {} {} {:.1}bb",
                "Replayed".bold().cyan(),
                summary.events,
                summary.hands,
                "Hand".bold().white(),
                hand_id,
                "Street".bold().white(),
                state.street.bold().blue(),
                "Hero".bold().white(),
                hero.bold().yellow(),
                "Board".bold().white(),
                board.bold().blue(),
                "Pot".bold().white(),
                state.pot_bb
            );
        }

        let decision = match &summary.decision {
            Ok(decision) => decision,
            Err(err) => {
                self.print_line("No recommendation", &err.to_string());
                return;
            }
        };
        if self.config.no_color {
            println!(
                "Decision: {} (confidence {:.2}, GTO {}, exploit {})",
                decision.label(),
                decision.confidence,
                decision.gto_action,
                decision.exploit_action
            );
        } else {
            println!(
                "{} {} {} {:.2} {} {} {} {}",
                "Decision".bold().magenta(),
                decision.label().bold().green(),
                "confidence".bold().white(),
                decision.confidence,
                "GTO".bold().white(),
                decision.gto_action,
                "exploit".bold().white(),
                decision.exploit_action
            );
        }
        self.print_line("Reasoning", &decision.reasoning);
    }
}
