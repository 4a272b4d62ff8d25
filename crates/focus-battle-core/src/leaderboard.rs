//! Match standings.
//!
//! Ordering is a pure view over [`MatchState`]; the roster itself is never
//! re-sorted.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerId};
use crate::state::MatchState;

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based position.
    pub rank: usize,
    /// Player id.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Rounds won this match.
    pub round_wins: u32,
    /// Current health.
    pub hp: f32,
    /// Latest focus sample, `[0, 1]`.
    pub focus: f32,
    /// Latest alpha-theta sample, `[0, 1]`.
    pub alpha_theta: f32,
}

/// Orders two players by score alone: more round wins first, then more hp.
#[must_use]
pub fn compare_score(a: &Player, b: &Player) -> Ordering {
    b.round_wins
        .cmp(&a.round_wins)
        .then_with(|| b.hp.total_cmp(&a.hp))
}

/// Orders two players for the leaderboard: [`compare_score`], then higher
/// focus, then higher alpha-theta. Equal players compare equal so a stable
/// sort keeps roster order.
#[must_use]
pub fn compare(a: &Player, b: &Player) -> Ordering {
    let (sa, sb) = (a.signal(), b.signal());
    compare_score(a, b)
        .then_with(|| sb.focus.total_cmp(&sa.focus))
        .then_with(|| sb.alpha_theta.total_cmp(&sa.alpha_theta))
}

/// Ranks every player by round wins, hp, focus, then alpha-theta.
///
/// ```
/// use focus_battle_core::leaderboard::standings;
/// use focus_battle_core::{CombatEngine, PlayerIdentity};
///
/// let engine = CombatEngine::default();
/// let mut state = engine
///     .initialize(&[PlayerIdentity::new(1, "A", "#fff"), PlayerIdentity::new(2, "B", "#000")])
///     .unwrap();
/// state.players_mut()[1].round_wins = 2;
///
/// let table = standings(&state);
/// assert_eq!(table[0].name, "B");
/// assert_eq!(table[1].rank, 2);
/// ```
#[must_use]
pub fn standings(state: &MatchState) -> Vec<Standing> {
    let mut ordered: Vec<&Player> = state.players().iter().collect();
    ordered.sort_by(|a, b| compare(a, b));

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, player)| Standing {
            rank: i + 1,
            id: player.id(),
            name: player.name().to_string(),
            round_wins: player.round_wins,
            hp: player.hp,
            focus: player.signal().focus,
            alpha_theta: player.signal().alpha_theta,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CombatEngine;
    use crate::player::{PlayerIdentity, Signal};

    fn trio() -> MatchState {
        CombatEngine::default()
            .initialize(&[
                PlayerIdentity::new(1, "A", "#fff"),
                PlayerIdentity::new(2, "B", "#fff"),
                PlayerIdentity::new(3, "C", "#fff"),
            ])
            .unwrap()
    }

    fn names(table: &[Standing]) -> Vec<&str> {
        table.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn wins_rank_above_hp() {
        let mut state = trio();
        state.players_mut()[0].hp = 100.0;
        state.players_mut()[1].round_wins = 1;
        state.players_mut()[1].hp = 10.0;

        assert_eq!(names(&standings(&state)), vec!["B", "A", "C"]);
    }

    #[test]
    fn hp_breaks_win_ties() {
        let mut state = trio();
        state.players_mut()[0].hp = 20.0;
        state.players_mut()[2].hp = 60.0;

        assert_eq!(names(&standings(&state)), vec!["B", "C", "A"]);
    }

    #[test]
    fn focus_breaks_score_ties() {
        let mut state = trio();
        state.players_mut()[0].round_wins = 1;
        state.players_mut()[1].round_wins = 1;
        state
            .apply_signal(PlayerId::new(1), Signal::new(0.9, 0.3, 0.0).unwrap())
            .unwrap();
        state
            .apply_signal(PlayerId::new(2), Signal::new(0.1, 0.8, 0.0).unwrap())
            .unwrap();

        let table = standings(&state);

        assert_eq!(names(&table), vec!["B", "A", "C"]);
        assert_eq!(table[0].focus, 0.8);
        assert_eq!(table[1].alpha_theta, 0.9);
    }

    #[test]
    fn alpha_theta_breaks_focus_ties() {
        let mut state = trio();
        state
            .apply_signal(PlayerId::new(2), Signal::new(0.7, 0.5, 0.2).unwrap())
            .unwrap();
        state
            .apply_signal(PlayerId::new(3), Signal::new(0.9, 0.5, 0.9).unwrap())
            .unwrap();

        assert_eq!(names(&standings(&state)), vec!["C", "B", "A"]);
    }

    #[test]
    fn score_order_ignores_signals() {
        let mut state = trio();
        state
            .apply_signal(PlayerId::new(2), Signal::new(1.0, 1.0, 0.0).unwrap())
            .unwrap();
        let players = state.players();

        assert_eq!(compare_score(&players[0], &players[1]), Ordering::Equal);
        assert_eq!(compare(&players[0], &players[1]), Ordering::Greater);
    }

    #[test]
    fn full_ties_keep_roster_order() {
        let table = standings(&trio());
        assert_eq!(names(&table), vec!["A", "B", "C"]);
        let ranks: Vec<_> = table.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn roster_is_not_reordered() {
        let mut state = trio();
        state.players_mut()[2].round_wins = 5;
        let _ = standings(&state);
        assert_eq!(state.players()[0].name(), "A");
    }
}
