//! Error types for the combat engine and its configuration.

use thiserror::Error;

use crate::player::PlayerId;

/// Errors raised at the engine boundary.
///
/// The per-tick arithmetic itself cannot fail; every variant here is a
/// rejected input (roster, dt, signal) or a bad configuration.
#[derive(Debug, Error)]
pub enum CombatError {
    /// A match needs at least one player.
    #[error("roster is empty")]
    EmptyRoster,

    /// Two roster entries share the same id.
    #[error("duplicate player id in roster: {0}")]
    DuplicatePlayer(PlayerId),

    /// A signal update or lookup named a player that is not in the roster.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// `dt` was negative or not finite.
    #[error("invalid dt: {0} (must be finite and >= 0)")]
    InvalidDt(f32),

    /// A signal channel fell outside `[0, 1]`.
    #[error("signal channel {channel} out of range: {value}")]
    SignalOutOfRange {
        /// Channel name (`alpha_theta`, `focus` or `mind_wander`).
        channel: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The combat configuration failed to load or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for the expected shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the engine cannot run with.
    #[error("invalid config field `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable constraint that was violated.
        reason: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CombatError>;
