//! Tuning and runtime configuration.
//!
//! Gameplay tuning ([`CombatConfig`]) is kept apart from runtime settings
//! ([`DriverConfig`], [`DemoFeedConfig`]). All structs carry their tuned
//! defaults and can be overridden piecemeal from JSON:
//!
//! ```
//! use focus_battle_core::CombatConfig;
//!
//! let config = CombatConfig::from_json_str(r#"{ "burst": { "base_damage": 20.0 } }"#).unwrap();
//! assert_eq!(config.burst.base_damage, 20.0);
//! assert_eq!(config.burst.cooldown_secs, 4.0);
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Combat Tuning
// =============================================================================

/// Thresholds and payoff of the alpha burst attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstTuning {
    /// Minimum alpha-theta power to arm a burst.
    pub alpha_theta_min: f32,
    /// Minimum focus to arm a burst.
    pub focus_min: f32,
    /// Maximum mind-wander allowed while arming.
    pub wander_max: f32,
    /// Seconds the thresholds must be held before the burst fires.
    pub hold_secs: f32,
    /// Lockout after a successful fire, in seconds.
    pub cooldown_secs: f32,
    /// Damage of a burst at combo 0.
    pub base_damage: f32,
    /// Combo increment per successful fire.
    pub combo_add: u32,
    /// Extra damage fraction per combo tier.
    pub combo_multiplier: f32,
}

impl Default for BurstTuning {
    fn default() -> Self {
        Self {
            alpha_theta_min: 0.90,
            focus_min: 0.60,
            wander_max: 0.30,
            hold_secs: 1.0,
            cooldown_secs: 4.0,
            base_damage: 12.0,
            combo_add: 1,
            combo_multiplier: 0.25,
        }
    }
}

/// Passive health integration rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegenTuning {
    /// HP per second gained at focus 1.0.
    pub heal_per_focus: f32,
    /// HP per second lost at mind-wander 1.0.
    pub damage_per_wander: f32,
    /// Health ceiling and round-start health.
    pub max_hp: f32,
}

impl Default for RegenTuning {
    fn default() -> Self {
        Self {
            heal_per_focus: 0.30,
            damage_per_wander: 0.45,
            max_hp: 100.0,
        }
    }
}

/// Immutable combat constants handed to the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Burst arming and damage.
    pub burst: BurstTuning,
    /// Passive heal/drain.
    pub regen: RegenTuning,
}

impl CombatConfig {
    /// Parses a config from JSON, filling omitted fields with defaults, and
    /// validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`CombatConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks every field against the range the engine is defined for.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::Invalid`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.burst;
        unit_interval("burst.alpha_theta_min", b.alpha_theta_min)?;
        unit_interval("burst.focus_min", b.focus_min)?;
        unit_interval("burst.wander_max", b.wander_max)?;
        positive("burst.hold_secs", b.hold_secs)?;
        positive("burst.cooldown_secs", b.cooldown_secs)?;
        positive("burst.base_damage", b.base_damage)?;
        non_negative("burst.combo_multiplier", b.combo_multiplier)?;

        let r = &self.regen;
        non_negative("regen.heal_per_focus", r.heal_per_focus)?;
        non_negative("regen.damage_per_wander", r.damage_per_wander)?;
        positive("regen.max_hp", r.max_hp)?;
        Ok(())
    }
}

// =============================================================================
// Runtime Settings
// =============================================================================

/// Frame pacing for [`MatchDriver`](crate::driver::MatchDriver).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Maximum ticks per second; shorter frames are accumulated.
    pub fps_limit: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self { fps_limit: 60.0 }
    }
}

impl DriverConfig {
    /// Smallest dt the driver will step with.
    #[must_use]
    pub fn min_frame_secs(&self) -> f32 {
        1.0 / self.fps_limit
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `fps_limit` is not positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("driver.fps_limit", self.fps_limit)
    }
}

/// Random-walk parameters of the [`DemoFeed`](crate::signal::DemoFeed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoFeedConfig {
    /// Seconds between random-walk steps.
    pub tick_secs: f32,
    /// Base step magnitude; focus and mind-wander scale it by 1.2 and 1.4.
    pub change_mag: f32,
    /// Starting value of every channel.
    pub initial: f32,
}

impl Default for DemoFeedConfig {
    fn default() -> Self {
        Self {
            tick_secs: 0.2,
            change_mag: 0.08,
            initial: 0.5,
        }
    }
}

impl DemoFeedConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] on a non-positive tick, a negative
    /// magnitude or an initial value outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("demo.tick_secs", self.tick_secs)?;
        non_negative("demo.change_mag", self.change_mag)?;
        unit_interval("demo.initial", self.initial)
    }
}

// =============================================================================
// Validation Helpers
// =============================================================================

fn unit_interval(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be within [0, 1]",
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and > 0",
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and >= 0",
        })
    }
}
