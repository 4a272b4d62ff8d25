//! Combat events emitted by [`CombatEngine::step`](crate::CombatEngine::step).
//!
//! Events are transient: one list per tick, handed to consumers and then
//! dropped. The engine keeps no history.
//!
//! Within a tick, `Burst`s appear in roster order of their source, and at
//! most one terminal event (`RoundEnd` or `Draw`) follows them.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;

/// Something that happened during a tick.
///
/// Serialised with an internal `"type"` tag:
///
/// ```
/// use focus_battle_core::{CombatEvent, PlayerId};
///
/// let event = CombatEvent::RoundEnd { winner: PlayerId::new(2) };
/// let json = serde_json::to_string(&event).unwrap();
/// assert_eq!(json, r#"{"type":"round_end","winner":2}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    /// An alpha burst landed.
    Burst {
        /// Attacker.
        source: PlayerId,
        /// Player that took the damage.
        target: PlayerId,
        /// Damage dealt (already rounded).
        damage: f32,
        /// Attacker's combo before this fire incremented it.
        combo_at_fire: u32,
    },
    /// Exactly one player is left standing.
    RoundEnd {
        /// The survivor, whose `round_wins` was incremented.
        winner: PlayerId,
    },
    /// Every player fell in the same tick.
    Draw,
}

impl CombatEvent {
    /// True for events that end the round.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::RoundEnd { .. } | Self::Draw)
    }

    /// Returns the burst fields if this is a burst.
    #[must_use]
    pub const fn as_burst(&self) -> Option<(PlayerId, PlayerId, f32, u32)> {
        match *self {
            Self::Burst {
                source,
                target,
                damage,
                combo_at_fire,
            } => Some((source, target, damage, combo_at_fire)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        let burst = CombatEvent::Burst {
            source: PlayerId::new(1),
            target: PlayerId::new(2),
            damage: 12.0,
            combo_at_fire: 0,
        };
        assert!(!burst.is_terminal());
        assert!(CombatEvent::Draw.is_terminal());
        assert!(CombatEvent::RoundEnd {
            winner: PlayerId::new(1)
        }
        .is_terminal());
    }

    #[test]
    fn as_burst_extracts_fields() {
        let burst = CombatEvent::Burst {
            source: PlayerId::new(1),
            target: PlayerId::new(2),
            damage: 18.0,
            combo_at_fire: 2,
        };
        assert_eq!(
            burst.as_burst(),
            Some((PlayerId::new(1), PlayerId::new(2), 18.0, 2))
        );
        assert_eq!(CombatEvent::Draw.as_burst(), None);
    }

    #[test]
    fn draw_serializes_with_tag_only() {
        let json = serde_json::to_string(&CombatEvent::Draw).unwrap();
        assert_eq!(json, r#"{"type":"draw"}"#);
    }

    #[test]
    fn burst_json_round_trip() {
        let burst = CombatEvent::Burst {
            source: PlayerId::new(1),
            target: PlayerId::new(2),
            damage: 15.0,
            combo_at_fire: 1,
        };
        let json = serde_json::to_string(&burst).unwrap();
        assert!(json.starts_with(r#"{"type":"burst""#));
        let back: CombatEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, burst);
    }
}
