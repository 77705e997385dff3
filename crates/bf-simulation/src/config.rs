use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Longest delay a config may ask the clock for: one day of virtual time.
pub const MAX_DELAY_MS: u64 = 86_400_000;

/// Configuration for a simulation run.
///
/// Every field has a default, so a scenario file only needs to name what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic simulation.
    pub seed: u64,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Tick interval of walking entities.
    pub motion_interval_ms: u64,
    /// Tick interval of projectiles in flight.
    pub physics_interval_ms: u64,
    /// Width of the battlefield, used for food placement.
    pub field_width: f64,
    /// Height of the battlefield, used for food placement.
    pub field_height: f64,
    /// Center distance below which a walker eats the food.
    pub feeding_radius: f64,
    /// Center distance below which a projectile hits its target.
    pub impact_radius: f64,
    /// Milliseconds of sleep per requested unit.
    pub sleep_ms_per_unit: u64,
    /// Energy granted per requested unit of sleep.
    pub sleep_energy_per_unit: i32,
    /// Inclusive range the food respawn delay is drawn from.
    pub food_respawn_ms: [u64; 2],
    /// Distance food keeps from the field edges.
    pub food_margin: f64,
    /// Delay between a projectile stopping and its removal from the world.
    pub removal_grace_ms: u64,
    /// Schedule a food spawn when the simulation starts.
    pub initial_food: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_events: 0,
            motion_interval_ms: 17,
            physics_interval_ms: 17,
            field_width: 760.0,
            field_height: 500.0,
            feeding_radius: 150.0,
            impact_radius: 70.0,
            sleep_ms_per_unit: 3_000,
            sleep_energy_per_unit: 10,
            food_respawn_ms: [4_000, 10_000],
            food_margin: 50.0,
            removal_grace_ms: 500,
            initial_food: true,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed for deterministic simulation.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the walker and projectile tick intervals.
    pub fn with_intervals(mut self, motion_ms: u64, physics_ms: u64) -> Self {
        self.motion_interval_ms = motion_ms;
        self.physics_interval_ms = physics_ms;
        self
    }

    /// Set the battlefield extent.
    pub fn with_field(mut self, width: f64, height: f64) -> Self {
        self.field_width = width;
        self.field_height = height;
        self
    }

    /// Enable or disable the food spawn at startup.
    pub fn with_initial_food(mut self, enabled: bool) -> Self {
        self.initial_food = enabled;
        self
    }

    /// Set the food respawn delay range.
    pub fn with_food_respawn(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.food_respawn_ms = [min_ms, max_ms];
        self
    }

    /// Reject values that cannot drive a simulation.
    pub fn validate(&self) -> SimResult<()> {
        if self.motion_interval_ms == 0 || self.physics_interval_ms == 0 {
            return Err(invalid("tick intervals must be at least 1 ms"));
        }
        for (name, value) in [
            ("motion_interval_ms", self.motion_interval_ms),
            ("physics_interval_ms", self.physics_interval_ms),
            ("sleep_ms_per_unit", self.sleep_ms_per_unit),
            ("food_respawn_ms", self.food_respawn_ms[1]),
            ("removal_grace_ms", self.removal_grace_ms),
        ] {
            if value > MAX_DELAY_MS {
                return Err(invalid(format!(
                    "{name} must be at most {MAX_DELAY_MS} ms, got {value}"
                )));
            }
        }
        for (name, value) in [
            ("feeding_radius", self.feeding_radius),
            ("impact_radius", self.impact_radius),
            ("food_margin", self.food_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(format!("{name} must be finite and >= 0, got {value}")));
            }
        }
        if !(self.field_width.is_finite() && self.field_height.is_finite()) {
            return Err(invalid("field extent must be finite"));
        }
        if self.field_width < 2.0 * self.food_margin || self.field_height < 2.0 * self.food_margin {
            return Err(invalid(format!(
                "field {}x{} is too small for a food margin of {}",
                self.field_width, self.field_height, self.food_margin
            )));
        }
        if self.sleep_energy_per_unit < 0 {
            return Err(invalid("sleep_energy_per_unit must be >= 0"));
        }
        let [lo, hi] = self.food_respawn_ms;
        if lo > hi {
            return Err(invalid(format!("food_respawn_ms range [{lo}, {hi}] is inverted")));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_events, 0);
        assert_eq!(config.motion_interval_ms, 17);
        assert_eq!(config.food_respawn_ms, [4_000, 10_000]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_max_events(500)
            .with_intervals(10, 20)
            .with_initial_food(false);
        assert_eq!(config.seed, 123);
        assert_eq!(config.max_events, 500);
        assert_eq!(config.physics_interval_ms, 20);
        assert!(!config.initial_food);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(SimConfig::default().with_intervals(0, 17).validate().is_err());
        assert!(SimConfig::default().with_food_respawn(10, 5).validate().is_err());
        assert!(SimConfig::default().with_field(80.0, 500.0).validate().is_err());
        let config = SimConfig {
            impact_radius: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_unbounded_delays() {
        let config = SimConfig {
            sleep_ms_per_unit: u64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));

        let config = SimConfig {
            removal_grace_ms: MAX_DELAY_MS + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(
            SimConfig::default()
                .with_food_respawn(0, u64::MAX)
                .validate()
                .is_err()
        );
        let config = SimConfig {
            sleep_ms_per_unit: MAX_DELAY_MS,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{ "seed": 7, "feeding_radius": 90 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!((config.feeding_radius - 90.0).abs() < f64::EPSILON);
        assert_eq!(config.sleep_ms_per_unit, 3_000);
    }
}
