//! # Focus Battle Core
//!
//! Combat engine for Focus Battle, a two-player duel driven by streamed
//! biometric-style signals (alpha-theta power, focus, mind-wander).
//!
//! The crate is split the same way the match runs:
//!
//! - **Signals**: a [`SignalSource`](signal::SignalSource) writes each
//!   player's channels between ticks
//! - **Engine**: [`CombatEngine`] advances health, bursts, combos and round
//!   outcomes, producing [`CombatEvent`]s
//! - **Consumers**: the [`Announcer`](announcer::Announcer), leaderboard and
//!   any renderer observe the state and event list once per tick
//! - **Driver**: [`MatchDriver`](driver::MatchDriver) ties the three together
//!   and sequences round resets after dispatch
//!
//! ## Usage
//!
//! ```
//! use focus_battle_core::{CombatConfig, CombatEngine, PlayerIdentity};
//!
//! let engine = CombatEngine::new(CombatConfig::default());
//! let mut state = engine
//!     .initialize(&[
//!         PlayerIdentity::new(1, "Mark", "#00c9ff"),
//!         PlayerIdentity::new(2, "Jessica", "#ff43a6"),
//!     ])
//!     .unwrap();
//!
//! let events = engine.step(&mut state, 1.0 / 60.0).unwrap();
//! assert!(events.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod announcer;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod event;
pub mod leaderboard;
pub mod player;
pub mod signal;
pub mod state;
pub mod targeting;

#[cfg(test)]
mod tests;

pub use config::{BurstTuning, CombatConfig, DemoFeedConfig, DriverConfig, RegenTuning};
pub use engine::CombatEngine;
pub use error::{CombatError, ConfigError, Result};
pub use event::CombatEvent;
pub use player::{Player, PlayerFlags, PlayerId, PlayerIdentity, Signal};
pub use state::{MatchSnapshot, MatchState, PlayerSnapshot};
