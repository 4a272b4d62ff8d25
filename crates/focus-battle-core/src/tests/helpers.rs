//! Match setup shared by the cross-module tests.

use crate::config::{CombatConfig, DemoFeedConfig, DriverConfig};
use crate::driver::MatchDriver;
use crate::engine::CombatEngine;
use crate::player::{PlayerId, PlayerIdentity, Signal};
use crate::signal::{DemoFeed, FixedSignals};
use crate::state::MatchState;

// =============================================================================
// Rosters
// =============================================================================

/// The two-player roster the demo runs with.
pub fn duel_roster() -> Vec<PlayerIdentity> {
    vec![
        PlayerIdentity::new(1, "Mark", "#00c9ff"),
        PlayerIdentity::new(2, "Jessica", "#ff43a6"),
    ]
}

/// Id of the first roster slot.
pub fn mark() -> PlayerId {
    PlayerId::new(1)
}

/// Id of the second roster slot.
pub fn jessica() -> PlayerId {
    PlayerId::new(2)
}

/// Initializes a duel with default tuning.
pub fn setup_duel() -> (CombatEngine, MatchState) {
    let engine = CombatEngine::new(CombatConfig::default());
    let state = engine.initialize(&duel_roster()).unwrap();
    (engine, state)
}

// =============================================================================
// Signals
// =============================================================================

/// Clears all three burst thresholds.
pub fn arming() -> Signal {
    Signal::new(0.95, 0.7, 0.1).unwrap()
}

/// Zero on every channel: no passive hp change and no arming.
pub fn idle() -> Signal {
    Signal::new(0.0, 0.0, 0.0).unwrap()
}

/// Writes `signal` for every player.
pub fn set_all(state: &mut MatchState, signal: Signal) {
    let ids: Vec<_> = state.players().iter().map(|p| p.id()).collect();
    for id in ids {
        state.apply_signal(id, signal).unwrap();
    }
}

// =============================================================================
// Drivers
// =============================================================================

/// A duel driven by the seeded demo feed.
pub fn demo_driver(seed: u64) -> MatchDriver {
    let (engine, state) = setup_duel();
    let feed = DemoFeed::new(&[mark(), jessica()], DemoFeedConfig::default(), seed).unwrap();
    MatchDriver::new(engine, state, Box::new(feed), DriverConfig::default()).unwrap()
}

/// A duel where each player holds a fixed signal.
pub fn fixed_driver(first: Signal, second: Signal) -> MatchDriver {
    let (engine, state) = setup_duel();
    let source = FixedSignals::new()
        .with(mark(), first)
        .with(jessica(), second);
    MatchDriver::new(engine, state, Box::new(source), DriverConfig::default()).unwrap()
}
