//! Player types.
//!
//! - [`PlayerId`]: stable identifier for a roster slot
//! - [`PlayerIdentity`]: display metadata supplied when the match starts
//! - [`Signal`]: the three normalized channels written by a signal source
//! - [`Player`]: identity, latest signal and combat counters
//! - [`PlayerFlags`]: derived status bits for renderers
//!
//! # Example
//!
//! ```
//! use focus_battle_core::{Player, PlayerIdentity};
//!
//! let player = Player::new(PlayerIdentity::new(7, "Mark", "#00c9ff"), 100.0);
//! assert_eq!(player.id().as_u64(), 7);
//! assert_eq!(player.hp, 100.0);
//! assert!(player.is_alive());
//! ```

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};

/// Unique identifier for a player.
///
/// Ids are immutable once assigned and unique within a roster. Roster order,
/// not id order, decides iteration and tie-breaks.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Creates a new `PlayerId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PlayerId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<PlayerId> for u64 {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

/// Display metadata for one roster slot. Immutable for the match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    /// Stable id.
    pub id: PlayerId,
    /// Name used by announcer callouts and standings.
    pub name: String,
    /// Lane colour as a CSS-style string.
    pub colour: String,
}

impl PlayerIdentity {
    /// Creates an identity.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>, colour: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.into(),
            colour: colour.into(),
        }
    }
}

// =============================================================================
// Signal
// =============================================================================

/// One sample of a player's three normalized channels, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Alpha-theta band power.
    pub alpha_theta: f32,
    /// Focus level.
    pub focus: f32,
    /// Mind-wander level.
    pub mind_wander: f32,
}

impl Signal {
    /// Every channel at 0.5, the state a fresh feed starts from.
    pub const NEUTRAL: Self = Self {
        alpha_theta: 0.5,
        focus: 0.5,
        mind_wander: 0.5,
    };

    /// Creates a signal, rejecting channels outside `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::SignalOutOfRange`] naming the first bad channel.
    pub fn new(alpha_theta: f32, focus: f32, mind_wander: f32) -> Result<Self> {
        check_channel("alpha_theta", alpha_theta)?;
        check_channel("focus", focus)?;
        check_channel("mind_wander", mind_wander)?;
        Ok(Self {
            alpha_theta,
            focus,
            mind_wander,
        })
    }

    /// Creates a signal, clamping each channel into `[0, 1]`.
    ///
    /// NaN channels become 0.
    #[must_use]
    pub fn clamped(alpha_theta: f32, focus: f32, mind_wander: f32) -> Self {
        Self {
            alpha_theta: clamp_unit(alpha_theta),
            focus: clamp_unit(focus),
            mind_wander: clamp_unit(mind_wander),
        }
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

fn check_channel(channel: &'static str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CombatError::SignalOutOfRange { channel, value })
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// =============================================================================
// Player
// =============================================================================

bitflags! {
    /// Status bits derived from a player's counters, for HUD rendering.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PlayerFlags: u8 {
        /// hp is 0; out until the next round reset.
        const DEFEATED = 1 << 0;
        /// Holding burst thresholds (`burst_ready > 0`).
        const ARMING = 1 << 1;
        /// Burst on cooldown.
        const COOLING_DOWN = 1 << 2;
        /// At least one burst landed since the last miss.
        const IN_COMBO = 1 << 3;
    }
}

/// A roster slot: identity, latest signal and combat counters.
///
/// Combat counters are public for inspection and scenario setup; during a
/// match only [`CombatEngine`](crate::CombatEngine) writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    identity: PlayerIdentity,
    signal: Signal,
    /// Health in `[0, max_hp]`.
    pub hp: f32,
    /// Consecutive successful bursts without a qualifying miss.
    pub combo: u32,
    /// Seconds the burst thresholds have been held continuously.
    pub burst_ready: f32,
    /// Seconds until another burst may arm.
    pub cooldown: f32,
    /// Rounds won this match. Survives round resets.
    pub round_wins: u32,
}

impl Player {
    /// Creates a player at `max_hp` with zeroed counters and a neutral signal.
    #[must_use]
    pub fn new(identity: PlayerIdentity, max_hp: f32) -> Self {
        Self {
            identity,
            signal: Signal::NEUTRAL,
            hp: max_hp,
            combo: 0,
            burst_ready: 0.0,
            cooldown: 0.0,
            round_wins: 0,
        }
    }

    /// Returns the player's id.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.identity.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Returns the lane colour.
    #[must_use]
    pub fn colour(&self) -> &str {
        &self.identity.colour
    }

    /// Returns the full identity.
    #[must_use]
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Returns the most recent signal sample.
    #[must_use]
    pub fn signal(&self) -> Signal {
        self.signal
    }

    /// Overwrites the signal sample. Call between ticks only.
    pub fn set_signal(&mut self, signal: Signal) {
        self.signal = signal;
    }

    /// True while hp is above zero.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Derives the HUD status bits from the current counters.
    #[must_use]
    pub fn flags(&self) -> PlayerFlags {
        let mut flags = PlayerFlags::empty();
        flags.set(PlayerFlags::DEFEATED, !self.is_alive());
        flags.set(PlayerFlags::ARMING, self.burst_ready > 0.0);
        flags.set(PlayerFlags::COOLING_DOWN, self.cooldown > 0.0);
        flags.set(PlayerFlags::IN_COMBO, self.combo > 0);
        flags
    }

    /// Restores round-start values, keeping identity, signal and wins.
    pub(crate) fn reset_for_round(&mut self, max_hp: f32) {
        self.hp = max_hp;
        self.combo = 0;
        self.burst_ready = 0.0;
        self.cooldown = 0.0;
    }
}
