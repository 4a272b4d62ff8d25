//! The combat engine.
//!
//! [`CombatEngine::step`] is the whole game: one call advances every player
//! by `dt` seconds and returns the events that happened. It runs in two
//! phases:
//!
//! 1. **PLAYER**: for each living player in roster order, decay cooldown,
//!    integrate passive hp, then arm or fire the alpha burst
//! 2. **OUTCOME**: count survivors once; one left ends the round, none left
//!    is a draw
//!
//! # Determinism
//!
//! The engine holds no randomness and no clock. Given the same state, signals
//! and `dt` sequence it produces identical events and state. Players are
//! visited in roster order, so an earlier player's burst lands before a
//! later player's update in the same tick.
//!
//! # Round Lifecycle
//!
//! The engine never resets a round by itself. After a `RoundEnd` or `Draw`
//! the caller dispatches the events first and only then calls
//! [`CombatEngine::reset_round`], so consumers still see the defeated player
//! at hp 0.
//!
//! # Example
//!
//! ```
//! use focus_battle_core::{CombatConfig, CombatEngine, CombatEvent, PlayerId, PlayerIdentity, Signal};
//!
//! let engine = CombatEngine::new(CombatConfig::default());
//! let mut state = engine
//!     .initialize(&[PlayerIdentity::new(1, "A", "#fff"), PlayerIdentity::new(2, "B", "#000")])
//!     .unwrap();
//! state.apply_signal(PlayerId::new(1), Signal::new(0.95, 0.7, 0.1).unwrap()).unwrap();
//! state.apply_signal(PlayerId::new(2), Signal::new(0.0, 0.0, 0.0).unwrap()).unwrap();
//!
//! let mut fired = Vec::new();
//! for _ in 0..10 {
//!     fired.extend(engine.step(&mut state, 0.1).unwrap());
//! }
//! assert!(matches!(fired[..], [CombatEvent::Burst { damage, .. }] if damage == 12.0));
//! ```

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, trace};

use crate::config::CombatConfig;
use crate::error::{CombatError, Result};
use crate::event::CombatEvent;
use crate::player::{Player, PlayerIdentity, Signal};
use crate::state::MatchState;
use crate::targeting::{HealthiestOpponent, TargetSelector};

/// Deterministic per-tick combat simulation.
///
/// Holds only immutable tuning and the target policy; all mutable data lives
/// in the [`MatchState`] passed to each call.
pub struct CombatEngine {
    config: CombatConfig,
    selector: Box<dyn TargetSelector>,
}

impl fmt::Debug for CombatEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombatEngine")
            .field("config", &self.config)
            .field("selector", &"<dyn TargetSelector>")
            .finish()
    }
}

impl Default for CombatEngine {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl CombatEngine {
    /// Creates an engine with the [`HealthiestOpponent`] target policy.
    ///
    /// The config is trusted as given; use [`CombatEngine::try_new`] for
    /// configs from outside the program.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            selector: Box::new(HealthiestOpponent),
        }
    }

    /// Validates the config, then creates the engine.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::Config`] if validation fails.
    pub fn try_new(config: CombatConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Replaces the target selection policy.
    #[must_use]
    pub fn with_selector(mut self, selector: Box<dyn TargetSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Returns the tuning this engine runs with.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Builds the state for a new match.
    ///
    /// Every player starts at full health with zeroed counters, no round
    /// wins and a neutral signal; `elapsed` starts at 0.
    ///
    /// # Errors
    ///
    /// - [`CombatError::EmptyRoster`] if `roster` is empty
    /// - [`CombatError::DuplicatePlayer`] if two entries share an id
    pub fn initialize(&self, roster: &[PlayerIdentity]) -> Result<MatchState> {
        if roster.is_empty() {
            return Err(CombatError::EmptyRoster);
        }

        let mut seen = HashSet::with_capacity(roster.len());
        for identity in roster {
            if !seen.insert(identity.id) {
                return Err(CombatError::DuplicatePlayer(identity.id));
            }
        }

        let max_hp = self.config.regen.max_hp;
        let players = roster
            .iter()
            .cloned()
            .map(|identity| Player::new(identity, max_hp))
            .collect();

        info!(players = roster.len(), "match initialized");
        Ok(MatchState::from_players(players))
    }

    /// Starts a new round: full health and cleared combo, arming and
    /// cooldown for everyone. Round wins, elapsed time and signals are kept.
    pub fn reset_round(&self, state: &mut MatchState) {
        let max_hp = self.config.regen.max_hp;
        for player in state.players_mut() {
            player.reset_for_round(max_hp);
        }
        info!(elapsed = state.elapsed(), "round reset");
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advances the match by `dt` seconds.
    ///
    /// Returns this tick's events: bursts in roster order of their source,
    /// then at most one `RoundEnd` or `Draw`. A `dt` of 0 changes nothing
    /// but still runs the outcome check.
    ///
    /// # Errors
    ///
    /// Fails before touching the state with:
    ///
    /// - [`CombatError::InvalidDt`] for a negative or non-finite `dt`
    /// - [`CombatError::EmptyRoster`] if the state holds no players
    pub fn step(&self, state: &mut MatchState, dt: f32) -> Result<Vec<CombatEvent>> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(CombatError::InvalidDt(dt));
        }
        if state.is_empty() {
            return Err(CombatError::EmptyRoster);
        }

        state.advance_elapsed(dt);
        trace!(dt, elapsed = state.elapsed(), "combat step");

        // PHASE 1: PLAYER - per-player integration in roster order
        let mut events = Vec::new();
        for index in 0..state.len() {
            self.update_player(state, index, dt, &mut events);
        }

        // PHASE 2: OUTCOME - one survivor wins, none is a draw
        if let Some(outcome) = Self::resolve_round(state) {
            events.push(outcome);
        }

        Ok(events)
    }

    /// True if `signal` satisfies all three burst thresholds at once.
    #[must_use]
    pub fn meets_thresholds(&self, signal: Signal) -> bool {
        let burst = &self.config.burst;
        signal.alpha_theta >= burst.alpha_theta_min
            && signal.focus >= burst.focus_min
            && signal.mind_wander <= burst.wander_max
    }

    /// Damage of a burst fired at the given combo.
    #[must_use]
    pub fn burst_damage(&self, combo: u32) -> f32 {
        let burst = &self.config.burst;
        #[allow(clippy::cast_precision_loss)]
        let tier = combo as f32;
        (burst.base_damage * (1.0 + tier * burst.combo_multiplier)).round()
    }

    fn update_player(
        &self,
        state: &mut MatchState,
        index: usize,
        dt: f32,
        events: &mut Vec<CombatEvent>,
    ) {
        let regen = &self.config.regen;
        let hold_secs = self.config.burst.hold_secs;

        let player = &mut state.players_mut()[index];
        if !player.is_alive() {
            return;
        }

        player.cooldown = (player.cooldown - dt).max(0.0);

        let signal = player.signal();
        let drift = signal.focus * regen.heal_per_focus - signal.mind_wander * regen.damage_per_wander;
        player.hp = (player.hp + drift * dt).clamp(0.0, regen.max_hp);

        let meets = self.meets_thresholds(signal);
        // cooldown never goes below 0, so <= 0 means exactly off cooldown
        let off_cooldown = player.cooldown <= 0.0;

        if meets && off_cooldown {
            player.burst_ready += dt;
            if player.burst_ready >= hold_secs {
                self.fire_burst(state, index, events);
                state.players_mut()[index].burst_ready = 0.0;
            }
        } else {
            player.burst_ready = 0.0;
            // A lapse while cooling down does not cost the combo.
            if !meets && off_cooldown && player.combo > 0 {
                debug!(player = %player.id(), combo = player.combo, "combo broken");
                player.combo = 0;
            }
        }
    }

    fn fire_burst(&self, state: &mut MatchState, attacker: usize, events: &mut Vec<CombatEvent>) {
        let (source, combo) = {
            let player = &state.players()[attacker];
            (player.id(), player.combo)
        };

        let Some(target_index) = self.selector.select(attacker, state.players()) else {
            debug!(player = %source, "burst fired with no target");
            return;
        };

        let damage = self.burst_damage(combo);
        let max_hp = self.config.regen.max_hp;

        let target_player = &mut state.players_mut()[target_index];
        target_player.hp = (target_player.hp - damage).clamp(0.0, max_hp);
        let target = target_player.id();
        let target_hp = target_player.hp;

        let attacker_player = &mut state.players_mut()[attacker];
        attacker_player.combo = attacker_player.combo.saturating_add(self.config.burst.combo_add);
        attacker_player.cooldown = self.config.burst.cooldown_secs;

        debug!(
            %source,
            %target,
            damage,
            combo_at_fire = combo,
            target_hp,
            "alpha burst"
        );

        events.push(CombatEvent::Burst {
            source,
            target,
            damage,
            combo_at_fire: combo,
        });
    }

    fn resolve_round(state: &mut MatchState) -> Option<CombatEvent> {
        let (first, second) = {
            let mut alive = state
                .players()
                .iter()
                .enumerate()
                .filter(|(_, p)| p.is_alive())
                .map(|(index, _)| index);
            (alive.next(), alive.next())
        };

        match (first, second) {
            (Some(index), None) => {
                let winner = &mut state.players_mut()[index];
                winner.round_wins += 1;
                info!(
                    winner = %winner.id(),
                    round_wins = winner.round_wins,
                    "round over"
                );
                Some(CombatEvent::RoundEnd {
                    winner: winner.id(),
                })
            }
            (None, _) if !state.is_empty() => {
                info!("round drawn");
                Some(CombatEvent::Draw)
            }
            _ => None,
        }
    }
}
