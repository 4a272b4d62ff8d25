//! Burst target selection.
//!
//! When a burst fires, the engine asks its [`TargetSelector`] which roster
//! slot takes the hit. The default policy, [`HealthiestOpponent`], spreads
//! damage toward the strongest opponent instead of piling onto a weak one,
//! which keeps rounds going longer.
//!
//! # Invariants
//!
//! - A selector MUST NOT return the attacker's own index
//! - A selector MUST NOT return a defeated player (hp <= 0)
//! - Selection MUST be deterministic for the same roster

use crate::player::Player;

/// Picks the target of a burst.
pub trait TargetSelector: Send + Sync {
    /// Returns the roster index of the target, or `None` when no valid
    /// target exists.
    ///
    /// # Arguments
    ///
    /// * `attacker` - Roster index of the player firing
    /// * `players` - The full roster, in roster order
    fn select(&self, attacker: usize, players: &[Player]) -> Option<usize>;
}

/// Targets the living opponent with the highest hp.
///
/// Ties go to the opponent earliest in roster order (a stable max).
///
/// # Example
///
/// ```
/// use focus_battle_core::targeting::{HealthiestOpponent, TargetSelector};
/// use focus_battle_core::{Player, PlayerIdentity};
///
/// let mut players = vec![
///     Player::new(PlayerIdentity::new(1, "A", "#fff"), 100.0),
///     Player::new(PlayerIdentity::new(2, "B", "#fff"), 100.0),
///     Player::new(PlayerIdentity::new(3, "C", "#fff"), 100.0),
/// ];
/// players[1].hp = 40.0;
///
/// assert_eq!(HealthiestOpponent.select(0, &players), Some(2));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthiestOpponent;

impl TargetSelector for HealthiestOpponent {
    fn select(&self, attacker: usize, players: &[Player]) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, candidate) in players.iter().enumerate() {
            if index == attacker || !candidate.is_alive() {
                continue;
            }
            // Strict comparison keeps the first of equal candidates.
            match best {
                Some((_, hp)) if candidate.hp <= hp => {}
                _ => best = Some((index, candidate.hp)),
            }
        }
        best.map(|(index, _)| index)
    }
}
