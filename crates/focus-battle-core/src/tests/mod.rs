//! Cross-module tests.
//!
//! - **Determinism tests**: same seed and inputs give the same match
//! - **Integration tests**: the engine, driver, feed and consumers together
//! - **Property tests**: combat invariants under random signals and dt
//! - **Helper functions**: match setup shared by the above
//!
//! # Test Structure
//!
//! - `determinism.rs`: seeded demo matches compared tick by tick
//! - `integration.rs`: worked scenarios and full-loop runs
//! - `properties.rs`: `proptest` invariants over `step`
//! - `helpers.rs`: rosters, signals and driver factories

mod helpers;

pub use helpers::*;
