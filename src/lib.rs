pub mod adviser;
pub mod blend;
pub mod cards;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod exploit;
pub mod game;
pub mod gto;
pub mod history;
pub mod profile;
pub mod ranges;
pub mod replay;
pub mod stats;
pub mod strength;
pub mod tracker;
pub mod web;

pub use adviser::{Adviser, DecisionSource};
pub use classify::{PlayerTag, classify};
pub use config::AdviserConfig;
pub use engine::Engine;
pub use error::{AdviceError, SourceError};
pub use game::{Decision, GameState};
pub use replay::{ReplayConfig, Replayer};
pub use tracker::{HandState, Tracker};
