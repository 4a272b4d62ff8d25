//! Frame-capped match loop.
//!
//! [`MatchDriver`] owns the engine, the match state and a signal source, and
//! turns wall-clock frames into engine ticks:
//!
//! 1. **ACCUMULATE**: add the frame time; return early while it is below
//!    `1 / fps_limit`
//! 2. **SIGNAL**: poll the source with the accumulated `dt` and write every
//!    update into the state
//! 3. **STEP**: run [`CombatEngine::step`]
//! 4. **DISPATCH**: hand `(state, events)` to each consumer in registration
//!    order
//! 5. **RESET**: if the tick ended the round, call
//!    [`CombatEngine::reset_round`]
//!
//! Dispatch always happens before reset, so consumers see the losing player
//! at hp 0 exactly once.
//!
//! # Example
//!
//! ```
//! use focus_battle_core::driver::MatchDriver;
//! use focus_battle_core::signal::FixedSignals;
//! use focus_battle_core::{CombatEngine, DriverConfig, PlayerIdentity};
//!
//! let engine = CombatEngine::default();
//! let state = engine
//!     .initialize(&[PlayerIdentity::new(1, "A", "#fff"), PlayerIdentity::new(2, "B", "#000")])
//!     .unwrap();
//! let mut driver =
//!     MatchDriver::new(engine, state, Box::new(FixedSignals::new()), DriverConfig::default())
//!         .unwrap();
//!
//! // Half a frame at 60 fps: nothing happens yet.
//! assert!(driver.advance(1.0 / 120.0).unwrap().is_none());
//! assert!(driver.advance(1.0 / 120.0).unwrap().is_some());
//! assert_eq!(driver.ticks(), 1);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::config::DriverConfig;
use crate::engine::CombatEngine;
use crate::error::{CombatError, Result};
use crate::event::CombatEvent;
use crate::signal::SignalSource;
use crate::state::MatchState;

/// Observes every tick after the engine has stepped.
pub trait EventConsumer: Send {
    /// Called once per tick with the post-step, pre-reset state and that
    /// tick's events (possibly empty).
    fn on_tick(&mut self, state: &MatchState, events: &[CombatEvent]);
}

/// Shared consumers let the caller keep a handle for reading results back.
impl<C: EventConsumer + ?Sized> EventConsumer for Arc<Mutex<C>> {
    fn on_tick(&mut self, state: &MatchState, events: &[CombatEvent]) {
        let mut guard = match self.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.on_tick(state, events);
    }
}

/// What one engine tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Seconds the engine stepped by.
    pub dt: f32,
    /// Events in engine order.
    pub events: Vec<CombatEvent>,
    /// True if the round was reset after dispatch.
    pub round_reset: bool,
}

impl TickReport {
    /// The terminal event of this tick, if any.
    #[must_use]
    pub fn outcome(&self) -> Option<&CombatEvent> {
        self.events.iter().find(|e| e.is_terminal())
    }
}

// =============================================================================
// MatchDriver
// =============================================================================

/// Runs a match: signals in, engine step, events out, round resets.
pub struct MatchDriver {
    engine: CombatEngine,
    state: MatchState,
    source: Box<dyn SignalSource>,
    consumers: Vec<Box<dyn EventConsumer>>,
    config: DriverConfig,
    pending: f32,
    ticks: u64,
}

impl fmt::Debug for MatchDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchDriver")
            .field("engine", &self.engine)
            .field("state", &self.state)
            .field("consumers", &format!("[{} consumers]", self.consumers.len()))
            .field("config", &self.config)
            .field("pending", &self.pending)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

impl MatchDriver {
    /// Creates a driver around an initialized match.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::Config`] if `config` does not validate.
    pub fn new(
        engine: CombatEngine,
        state: MatchState,
        source: Box<dyn SignalSource>,
        config: DriverConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            state,
            source,
            consumers: Vec::new(),
            config,
            pending: 0.0,
            ticks: 0,
        })
    }

    /// Registers a consumer. Consumers run in registration order.
    pub fn add_consumer(&mut self, consumer: Box<dyn EventConsumer>) {
        self.consumers.push(consumer);
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &CombatEngine {
        &self.engine
    }

    /// Returns the match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Number of engine ticks run so far.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Feeds one frame of wall time.
    ///
    /// Returns `None` while less than one frame at `fps_limit` has
    /// accumulated. Otherwise the whole accumulated time becomes the tick's
    /// `dt`.
    ///
    /// # Errors
    ///
    /// - [`CombatError::InvalidDt`] for a negative or non-finite `frame_dt`
    /// - [`CombatError::UnknownPlayer`] if the source reports a player not
    ///   in the roster
    pub fn advance(&mut self, frame_dt: f32) -> Result<Option<TickReport>> {
        if !frame_dt.is_finite() || frame_dt < 0.0 {
            return Err(CombatError::InvalidDt(frame_dt));
        }

        self.pending += frame_dt;
        if self.pending < self.config.min_frame_secs() {
            return Ok(None);
        }
        let dt = std::mem::take(&mut self.pending);

        self.tick(dt).map(Some)
    }

    /// Runs `secs` of wall time in fixed frames of `frame_dt`.
    ///
    /// Returns the report of every tick that ran.
    ///
    /// # Errors
    ///
    /// Returns [`CombatError::InvalidDt`] if `frame_dt` is not positive, and
    /// otherwise whatever [`MatchDriver::advance`] returns.
    pub fn run_for(&mut self, secs: f32, frame_dt: f32) -> Result<Vec<TickReport>> {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return Err(CombatError::InvalidDt(frame_dt));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let frames = (secs.max(0.0) / frame_dt).round() as u64;

        let mut reports = Vec::new();
        for _ in 0..frames {
            if let Some(report) = self.advance(frame_dt)? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    fn tick(&mut self, dt: f32) -> Result<TickReport> {
        for update in self.source.poll(dt) {
            self.state.apply_signal(update.player, update.signal)?;
        }

        let events = self.engine.step(&mut self.state, dt)?;
        self.ticks += 1;

        for consumer in &mut self.consumers {
            consumer.on_tick(&self.state, &events);
        }

        let round_reset = events.iter().any(CombatEvent::is_terminal);
        if round_reset {
            self.engine.reset_round(&mut self.state);
        }

        if !events.is_empty() {
            debug!(tick = self.ticks, count = events.len(), "tick events");
        }

        Ok(TickReport {
            dt,
            events,
            round_reset,
        })
    }
}
