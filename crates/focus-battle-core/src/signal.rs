//! Signal sources.
//!
//! A [`SignalSource`] produces the per-player channel samples the engine
//! reads. The driver polls it once per tick, writes the returned updates into
//! the [`MatchState`](crate::MatchState), and only then steps the engine.
//!
//! Two sources ship with the crate:
//!
//! - [`FixedSignals`]: constant samples per player, for scripted scenarios
//! - [`DemoFeed`]: a seeded random walk standing in for a headset

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::config::DemoFeedConfig;
use crate::error::Result;
use crate::player::{PlayerId, Signal};

/// A new sample for one player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalUpdate {
    /// Player the sample belongs to.
    pub player: PlayerId,
    /// The sample.
    pub signal: Signal,
}

/// Produces signal samples between ticks.
pub trait SignalSource: Send {
    /// Advances the source by `dt` seconds and returns the samples that
    /// changed. An empty list leaves every player's signal as it was.
    fn poll(&mut self, dt: f32) -> Vec<SignalUpdate>;
}

// =============================================================================
// FixedSignals
// =============================================================================

/// Reports the same sample for each player on every poll.
///
/// ```
/// use focus_battle_core::signal::{FixedSignals, SignalSource};
/// use focus_battle_core::{PlayerId, Signal};
///
/// let mut source = FixedSignals::new();
/// source.set(PlayerId::new(1), Signal::NEUTRAL);
/// assert_eq!(source.poll(0.1).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixedSignals {
    samples: Vec<SignalUpdate>,
}

impl FixedSignals {
    /// Creates a source with no samples.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets (or replaces) the sample reported for `player`.
    pub fn set(&mut self, player: PlayerId, signal: Signal) {
        match self.samples.iter_mut().find(|u| u.player == player) {
            Some(update) => update.signal = signal,
            None => self.samples.push(SignalUpdate { player, signal }),
        }
    }

    /// Builder form of [`FixedSignals::set`].
    #[must_use]
    pub fn with(mut self, player: PlayerId, signal: Signal) -> Self {
        self.set(player, signal);
        self
    }
}

impl SignalSource for FixedSignals {
    fn poll(&mut self, _dt: f32) -> Vec<SignalUpdate> {
        self.samples.clone()
    }
}

// =============================================================================
// DemoFeed
// =============================================================================

/// Step scale per channel: alpha-theta, focus, mind-wander.
const CHANNEL_SCALE: [f32; 3] = [1.0, 1.2, 1.4];

/// Most walk steps taken in one poll; time beyond this is dropped.
pub const MAX_CATCH_UP_STEPS: u32 = 1024;

/// Seeded random walk over every player's channels.
///
/// Every `tick_secs` of accumulated time, each channel moves by a uniform
/// step in `[-change_mag * k, change_mag * k]` and is clamped to `[0, 1]`,
/// where `k` is 1.0 for alpha-theta, 1.2 for focus and 1.4 for mind-wander.
/// The first poll reports the starting values so the state matches the feed
/// from tick one.
#[derive(Debug, Clone)]
pub struct DemoFeed {
    config: DemoFeedConfig,
    rng: ChaCha8Rng,
    samples: Vec<SignalUpdate>,
    accumulated: f32,
    primed: bool,
}

impl DemoFeed {
    /// Creates a feed for `players`, every channel at `config.initial`.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::Config`](crate::CombatError::Config) if the
    /// config does not validate.
    pub fn new(players: &[PlayerId], config: DemoFeedConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let start = Signal::clamped(config.initial, config.initial, config.initial);
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            samples: players
                .iter()
                .map(|&player| SignalUpdate {
                    player,
                    signal: start,
                })
                .collect(),
            accumulated: 0.0,
            primed: false,
        })
    }

    /// Current sample for every player, in construction order.
    #[must_use]
    pub fn current(&self) -> &[SignalUpdate] {
        &self.samples
    }

    fn walk(&mut self) {
        let mag = self.config.change_mag;
        for update in &mut self.samples {
            let s = update.signal;
            let mut channels = [s.alpha_theta, s.focus, s.mind_wander];
            for (value, scale) in channels.iter_mut().zip(CHANNEL_SCALE) {
                let reach = mag * scale;
                *value += self.rng.gen_range(-reach..=reach);
            }
            update.signal = Signal::clamped(channels[0], channels[1], channels[2]);
        }
    }
}

impl SignalSource for DemoFeed {
    fn poll(&mut self, dt: f32) -> Vec<SignalUpdate> {
        if dt.is_finite() && dt > 0.0 {
            self.accumulated += dt;
        }

        let tick = self.config.tick_secs;
        let due = (self.accumulated / tick).floor();
        #[allow(clippy::cast_precision_loss)]
        let cap = MAX_CATCH_UP_STEPS as f32;
        if due > cap {
            self.accumulated = self.accumulated.rem_euclid(tick);
        } else {
            self.accumulated = (self.accumulated - due * tick).max(0.0);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let walked = due.min(cap) as u32;
        for _ in 0..walked {
            self.walk();
        }

        if walked == 0 && self.primed {
            return Vec::new();
        }
        self.primed = true;
        trace!(steps = walked, "demo feed sampled");
        self.samples.clone()
    }
}
