//! Match state container.
//!
//! [`MatchState`] owns the roster in the order it was supplied and the total
//! simulated time. Roster order is significant: the engine processes players
//! in it and breaks target ties by it, so nothing here ever re-sorts the
//! players. Sorting for display belongs to consumers (see
//! [`leaderboard`](crate::leaderboard)).
//!
//! A `MatchState` is only obtainable from
//! [`CombatEngine::initialize`](crate::CombatEngine::initialize), which
//! guarantees a non-empty roster with unique ids. It serialises for saving
//! and inspection but does not deserialise; [`MatchSnapshot`] is the
//! round-trippable view.

use serde::{Deserialize, Serialize};

use crate::error::{CombatError, Result};
use crate::player::{Player, PlayerFlags, PlayerId, Signal};

/// Ordered roster plus elapsed match time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchState {
    players: Vec<Player>,
    elapsed: f32,
}

impl MatchState {
    pub(crate) fn from_players(players: Vec<Player>) -> Self {
        Self {
            players,
            elapsed: 0.0,
        }
    }

    /// Players in roster order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Mutable access to the roster, for scenario setup and tests.
    ///
    /// Mutating combat counters mid-match bypasses the engine; the slice
    /// itself cannot be resized, so roster membership stays fixed.
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    /// Number of roster slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Always false for a state built by the engine.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Cumulative simulated seconds.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub(crate) fn advance_elapsed(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Looks up a player by id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id() == id)
    }

    /// Looks up a player by id, mutably.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id() == id)
    }

    /// Roster index of a player.
    #[must_use]
    pub fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }

    /// Players with hp above zero, in roster order.
    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_alive())
    }

    /// Writes a signal sample for one player.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::UnknownPlayer`] if `id` is not in the roster.
    pub fn apply_signal(&mut self, id: PlayerId, signal: Signal) -> Result<()> {
        let player = self.get_mut(id).ok_or(CombatError::UnknownPlayer(id))?;
        player.set_signal(signal);
        Ok(())
    }

    /// Read-only, serialisable view of the whole match for renderers.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            elapsed: self.elapsed,
            players: self.players.iter().map(PlayerSnapshot::from).collect(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Flat per-player view exposed to renderers and announcers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Lane colour.
    pub colour: String,
    /// Current health.
    pub hp: f32,
    /// Current combo.
    pub combo: u32,
    /// Seconds of held burst thresholds.
    pub burst_ready: f32,
    /// Seconds of cooldown remaining.
    pub cooldown: f32,
    /// Rounds won.
    pub round_wins: u32,
    /// Latest signal sample.
    pub signal: Signal,
    /// Derived status bits.
    pub flags: PlayerFlags,
}

impl From<&Player> for PlayerSnapshot {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            name: player.name().to_string(),
            colour: player.colour().to_string(),
            hp: player.hp,
            combo: player.combo,
            burst_ready: player.burst_ready,
            cooldown: player.cooldown,
            round_wins: player.round_wins,
            signal: player.signal(),
            flags: player.flags(),
        }
    }
}

/// Serialisable copy of a [`MatchState`] at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Cumulative simulated seconds.
    pub elapsed: f32,
    /// Players in roster order.
    pub players: Vec<PlayerSnapshot>,
}
