//! Match commentary.
//!
//! The [`Announcer`] watches each tick as an [`EventConsumer`] and turns the
//! state and events into [`Callout`]s: bursts, knockouts, combo streaks,
//! engagement drops, lead changes and round outcomes. It only reads what
//! the engine exposes; nothing here feeds back into combat.
//!
//! Callouts are kept in a bounded history, newest first, each stamped with
//! the match time it was made at.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::driver::EventConsumer;
use crate::event::CombatEvent;
use crate::player::{Player, PlayerId};
use crate::state::MatchState;

/// Combo at which a streak is announced.
pub const COMBO_STREAK: u32 = 3;

/// Relative drop in focus or alpha-theta that counts as disengaging.
pub const ENGAGEMENT_DROP: f32 = 0.3;

/// Number of callouts kept in the history.
pub const HISTORY_LEN: usize = 20;

/// Something worth saying about the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Callout {
    /// A burst landed.
    AlphaSurge {
        /// Attacker.
        source: PlayerId,
        /// Player hit.
        target: PlayerId,
        /// Damage dealt.
        damage: f32,
    },
    /// A player's hp reached zero.
    Knockout {
        /// The player knocked out.
        player: PlayerId,
    },
    /// A player's combo reached the streak threshold.
    ComboStreak {
        /// The player on a streak.
        player: PlayerId,
        /// Combo at the time of the callout.
        combo: u32,
    },
    /// Focus or alpha-theta fell sharply since the previous tick.
    EngagementDrop {
        /// The player losing focus.
        player: PlayerId,
        /// Relative focus drop, 0 if the previous focus was 0.
        focus_drop: f32,
        /// Relative alpha-theta drop, 0 if the previous value was 0.
        alpha_theta_drop: f32,
    },
    /// A different living player now leads.
    LeadChange {
        /// The new leader.
        new_leader: PlayerId,
        /// The leader before this tick.
        previous: PlayerId,
    },
    /// The round ended with a winner.
    RoundWon {
        /// The winner.
        winner: PlayerId,
    },
    /// The round ended with nobody standing.
    Draw,
}

/// A callout with its rendered text and the match time it was made at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    /// Match elapsed seconds.
    pub at: f32,
    /// Structured callout.
    pub callout: Callout,
    /// Human-readable text.
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
struct Observed {
    hp: f32,
    focus: f32,
    alpha_theta: f32,
    streak_announced: bool,
}

impl Observed {
    fn of(player: &Player) -> Self {
        let signal = player.signal();
        Self {
            hp: player.hp,
            focus: signal.focus,
            alpha_theta: signal.alpha_theta,
            streak_announced: false,
        }
    }
}

/// Turns ticks into callouts.
#[derive(Debug, Clone)]
pub struct Announcer {
    names: HashMap<PlayerId, String>,
    previous: HashMap<PlayerId, Observed>,
    leader: Option<PlayerId>,
    history: VecDeque<Announcement>,
}

impl Announcer {
    /// Creates an announcer primed with the match's current state, so the
    /// first tick compares against it rather than against nothing.
    #[must_use]
    pub fn new(state: &MatchState) -> Self {
        Self {
            names: state
                .players()
                .iter()
                .map(|p| (p.id(), p.name().to_string()))
                .collect(),
            previous: state
                .players()
                .iter()
                .map(|p| (p.id(), Observed::of(p)))
                .collect(),
            leader: None,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Callouts made so far, newest first, at most [`HISTORY_LEN`].
    pub fn history(&self) -> impl Iterator<Item = &Announcement> {
        self.history.iter()
    }

    /// The most recent callout.
    #[must_use]
    pub fn latest(&self) -> Option<&Announcement> {
        self.history.front()
    }

    /// Observes one tick and returns the callouts it produced, in order.
    pub fn observe(&mut self, state: &MatchState, events: &[CombatEvent]) -> Vec<Callout> {
        let mut callouts = Vec::new();

        for event in events {
            if let Some((source, target, damage, _)) = event.as_burst() {
                callouts.push(Callout::AlphaSurge {
                    source,
                    target,
                    damage,
                });
            }
        }

        for player in state.players() {
            self.observe_player(player, &mut callouts);
        }

        self.observe_leader(state, &mut callouts);

        for event in events {
            match event {
                CombatEvent::RoundEnd { winner } => {
                    callouts.push(Callout::RoundWon { winner: *winner });
                }
                CombatEvent::Draw => callouts.push(Callout::Draw),
                CombatEvent::Burst { .. } => {}
            }
        }

        for callout in &callouts {
            let message = self.render(callout);
            info!(at = state.elapsed(), "{message}");
            self.history.push_front(Announcement {
                at: state.elapsed(),
                callout: callout.clone(),
                message,
            });
            self.history.truncate(HISTORY_LEN);
        }

        callouts
    }

    /// Renders a callout as text, using player names.
    #[must_use]
    pub fn render(&self, callout: &Callout) -> String {
        match *callout {
            Callout::AlphaSurge {
                source,
                target,
                damage,
            } => format!(
                "Alpha Surge from {}! Inflicting {damage} damage on {}.",
                self.name(source),
                self.name(target)
            ),
            Callout::Knockout { player } => {
                format!("{} is out of the fight!", self.name(player))
            }
            Callout::ComboStreak { player, combo } => {
                format!("{} is on a Focus Combo Streak! ({combo}x)", self.name(player))
            }
            Callout::EngagementDrop { player, .. } => {
                format!("{} seems to be losing focus!", self.name(player))
            }
            Callout::LeadChange { new_leader, .. } => {
                format!("{} takes the lead!", self.name(new_leader))
            }
            Callout::RoundWon { winner } => format!("{} wins the round!", self.name(winner)),
            Callout::Draw => "Double knockout! The round is a draw.".to_string(),
        }
    }

    fn name(&self, id: PlayerId) -> &str {
        self.names.get(&id).map_or("Unknown", String::as_str)
    }

    fn observe_player(&mut self, player: &Player, callouts: &mut Vec<Callout>) {
        let id = player.id();
        let before = *self
            .previous
            .entry(id)
            .or_insert_with(|| Observed::of(player));
        let mut now = Observed::of(player);
        now.streak_announced = before.streak_announced;

        if player.hp <= 0.0 && before.hp > 0.0 {
            callouts.push(Callout::Knockout { player: id });
        }

        if player.combo >= COMBO_STREAK && !before.streak_announced {
            callouts.push(Callout::ComboStreak {
                player: id,
                combo: player.combo,
            });
            now.streak_announced = true;
        } else if player.combo < COMBO_STREAK {
            now.streak_announced = false;
        }

        let focus_drop = relative_drop(before.focus, now.focus);
        let alpha_theta_drop = relative_drop(before.alpha_theta, now.alpha_theta);
        if focus_drop >= ENGAGEMENT_DROP || alpha_theta_drop >= ENGAGEMENT_DROP {
            callouts.push(Callout::EngagementDrop {
                player: id,
                focus_drop,
                alpha_theta_drop,
            });
        }

        self.previous.insert(id, now);
    }

    fn observe_leader(&mut self, state: &MatchState, callouts: &mut Vec<Callout>) {
        // score only, so signal jitter alone never flips the lead; min_by
        // keeps the earliest of equal players
        let current = state
            .alive()
            .min_by(|a, b| crate::leaderboard::compare_score(a, b))
            .map(Player::id);

        if let (Some(new_leader), Some(previous)) = (current, self.leader) {
            if new_leader != previous {
                callouts.push(Callout::LeadChange {
                    new_leader,
                    previous,
                });
            }
        }
        self.leader = current;
    }
}

/// Fractional fall from `before` to `now`; 0 when `before` is 0.
fn relative_drop(before: f32, now: f32) -> f32 {
    if before > 0.0 {
        (before - now) / before
    } else {
        0.0
    }
}

impl EventConsumer for Announcer {
    fn on_tick(&mut self, state: &MatchState, events: &[CombatEvent]) {
        self.observe(state, events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CombatEngine;
    use crate::player::{PlayerIdentity, Signal};

    fn duel() -> MatchState {
        CombatEngine::default()
            .initialize(&[
                PlayerIdentity::new(1, "Mark", "#00c9ff"),
                PlayerIdentity::new(2, "Jessica", "#ff43a6"),
            ])
            .unwrap()
    }

    fn id(n: u64) -> PlayerId {
        PlayerId::new(n)
    }

    mod event_tests {
        use super::*;

        #[test]
        fn burst_becomes_alpha_surge() {
            let state = duel();
            let mut announcer = Announcer::new(&state);
            let events = [CombatEvent::Burst {
                source: id(1),
                target: id(2),
                damage: 12.0,
                combo_at_fire: 0,
            }];

            let callouts = announcer.observe(&state, &events);

            assert_eq!(
                callouts[0],
                Callout::AlphaSurge {
                    source: id(1),
                    target: id(2),
                    damage: 12.0
                }
            );
            assert_eq!(
                announcer.latest().unwrap().message,
                "Alpha Surge from Mark! Inflicting 12 damage on Jessica."
            );
        }

        #[test]
        fn terminal_events_come_last() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state.players_mut()[1].hp = 0.0;
            state.players_mut()[0].round_wins = 1;

            let callouts = announcer.observe(&state, &[CombatEvent::RoundEnd { winner: id(1) }]);

            assert_eq!(callouts.first(), Some(&Callout::Knockout { player: id(2) }));
            assert_eq!(callouts.last(), Some(&Callout::RoundWon { winner: id(1) }));
            assert_eq!(announcer.latest().unwrap().message, "Mark wins the round!");
        }

        #[test]
        fn draw_announced() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state.players_mut()[0].hp = 0.0;
            state.players_mut()[1].hp = 0.0;

            let callouts = announcer.observe(&state, &[CombatEvent::Draw]);

            assert_eq!(callouts.last(), Some(&Callout::Draw));
        }
    }

    mod player_tests {
        use super::*;

        #[test]
        fn knockout_announced_once() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state.players_mut()[1].hp = 0.0;

            let first = announcer.observe(&state, &[]);
            let second = announcer.observe(&state, &[]);

            assert!(first.contains(&Callout::Knockout { player: id(2) }));
            assert!(!second.contains(&Callout::Knockout { player: id(2) }));
        }

        #[test]
        fn combo_streak_latches_until_combo_falls() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            let is_streak = |c: &Callout| matches!(c, Callout::ComboStreak { .. });

            state.players_mut()[0].combo = 3;
            let callouts = announcer.observe(&state, &[]);
            assert_eq!(callouts.iter().filter(|&c| is_streak(c)).count(), 1);

            state.players_mut()[0].combo = 4;
            assert!(!announcer.observe(&state, &[]).iter().any(is_streak));

            state.players_mut()[0].combo = 0;
            announcer.observe(&state, &[]);
            state.players_mut()[0].combo = 3;
            assert!(announcer.observe(&state, &[]).iter().any(is_streak));
            assert_eq!(
                announcer.latest().unwrap().message,
                "Mark is on a Focus Combo Streak! (3x)"
            );
        }

        #[test]
        fn focus_drop_triggers_engagement_callout() {
            let mut state = duel();
            state
                .apply_signal(id(1), Signal::new(0.5, 0.8, 0.2).unwrap())
                .unwrap();
            let mut announcer = Announcer::new(&state);

            state
                .apply_signal(id(1), Signal::new(0.5, 0.4, 0.2).unwrap())
                .unwrap();
            let callouts = announcer.observe(&state, &[]);

            let drop = callouts
                .iter()
                .find_map(|c| match *c {
                    Callout::EngagementDrop {
                        player,
                        focus_drop,
                        alpha_theta_drop,
                    } => Some((player, focus_drop, alpha_theta_drop)),
                    _ => None,
                })
                .unwrap();
            assert_eq!(drop.0, id(1));
            assert!((drop.1 - 0.5).abs() < 1e-6);
            assert_eq!(drop.2, 0.0);
        }

        #[test]
        fn alpha_theta_drop_alone_triggers() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state
                .apply_signal(id(2), Signal::new(0.2, 0.5, 0.5).unwrap())
                .unwrap();

            let callouts = announcer.observe(&state, &[]);

            assert!(callouts
                .iter()
                .any(|c| matches!(c, Callout::EngagementDrop { player, .. } if *player == id(2))));
        }

        #[test]
        fn small_drop_ignored() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state
                .apply_signal(id(1), Signal::new(0.45, 0.45, 0.5).unwrap())
                .unwrap();

            let callouts = announcer.observe(&state, &[]);

            assert!(!callouts
                .iter()
                .any(|c| matches!(c, Callout::EngagementDrop { .. })));
        }

        #[test]
        fn zero_baseline_never_counts_as_drop() {
            let mut state = duel();
            state
                .apply_signal(id(1), Signal::new(0.0, 0.0, 0.0).unwrap())
                .unwrap();
            let mut announcer = Announcer::new(&state);

            let callouts = announcer.observe(&state, &[]);

            assert!(!callouts
                .iter()
                .any(|c| matches!(c, Callout::EngagementDrop { .. })));
        }
    }

    mod leader_tests {
        use super::*;

        fn lead_changes(callouts: &[Callout]) -> Vec<(PlayerId, PlayerId)> {
            callouts
                .iter()
                .filter_map(|c| match *c {
                    Callout::LeadChange {
                        new_leader,
                        previous,
                    } => Some((new_leader, previous)),
                    _ => None,
                })
                .collect()
        }

        #[test]
        fn first_observation_sets_leader_silently() {
            let state = duel();
            let mut announcer = Announcer::new(&state);
            assert!(lead_changes(&announcer.observe(&state, &[])).is_empty());
        }

        #[test]
        fn overtaking_on_hp_announced() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            announcer.observe(&state, &[]);

            state.players_mut()[0].hp = 70.0;
            let callouts = announcer.observe(&state, &[]);

            assert_eq!(lead_changes(&callouts), vec![(id(2), id(1))]);
            assert_eq!(announcer.latest().unwrap().message, "Jessica takes the lead!");
        }

        #[test]
        fn round_wins_outrank_hp() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            state.players_mut()[0].hp = 90.0;
            announcer.observe(&state, &[]);

            state.players_mut()[0].round_wins = 1;
            let callouts = announcer.observe(&state, &[]);

            assert_eq!(lead_changes(&callouts), vec![(id(1), id(2))]);
        }

        #[test]
        fn signal_alone_does_not_change_leader() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            announcer.observe(&state, &[]);

            state
                .apply_signal(id(2), Signal::new(0.9, 0.9, 0.1).unwrap())
                .unwrap();
            let callouts = announcer.observe(&state, &[]);

            assert!(lead_changes(&callouts).is_empty());
        }

        #[test]
        fn nobody_alive_clears_leader() {
            let mut state = duel();
            let mut announcer = Announcer::new(&state);
            announcer.observe(&state, &[]);

            state.players_mut()[0].hp = 0.0;
            state.players_mut()[1].hp = 0.0;
            announcer.observe(&state, &[]);

            state.players_mut()[0].hp = 100.0;
            state.players_mut()[1].hp = 100.0;
            state.players_mut()[1].round_wins = 1;
            let callouts = announcer.observe(&state, &[]);

            assert!(lead_changes(&callouts).is_empty());
        }
    }

    mod history_tests {
        use super::*;

        #[test]
        fn history_is_newest_first_and_bounded() {
            let state = duel();
            let mut announcer = Announcer::new(&state);
            for damage in 0..25_u8 {
                let events = [CombatEvent::Burst {
                    source: id(1),
                    target: id(2),
                    damage: f32::from(damage),
                    combo_at_fire: 0,
                }];
                announcer.observe(&state, &events);
            }

            let history: Vec<_> = announcer.history().collect();
            assert_eq!(history.len(), HISTORY_LEN);
            assert!(matches!(
                history[0].callout,
                Callout::AlphaSurge { damage, .. } if damage == 24.0
            ));
        }

        #[test]
        fn announcements_stamped_with_match_time() {
            let engine = CombatEngine::default();
            let mut state = duel();
            engine.step(&mut state, 0.5).unwrap();
            let mut announcer = Announcer::new(&state);

            announcer.observe(&state, &[CombatEvent::Draw]);

            assert_eq!(announcer.latest().unwrap().at, 0.5);
        }
    }
}
