use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Fixed combat numbers of a combatant.
///
/// Stats never change after the entity is created; variants differ only by
/// which preset (or explicit values) they were built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatantStats {
    /// Offensive strength.
    pub power: f64,
    /// Damage reduction. Must be strictly positive.
    pub armor: f64,
    /// Maximum center-to-center distance at which an attack lands.
    pub attack_range: f64,
}

impl CombatantStats {
    /// Create stats; see [`CombatantStats::validate`].
    pub const fn new(power: f64, armor: f64, attack_range: f64) -> Self {
        Self {
            power,
            armor,
            attack_range,
        }
    }

    /// Reject values that would make the damage formula meaningless.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.power.is_finite() || self.power < 0.0 {
            return Err(CoreError::InvalidStats(format!(
                "power must be a non-negative number, got {}",
                self.power
            )));
        }
        if !self.armor.is_finite() || self.armor <= 0.0 {
            return Err(CoreError::InvalidStats(format!(
                "armor must be positive, got {}",
                self.armor
            )));
        }
        if !self.attack_range.is_finite() || self.attack_range < 0.0 {
            return Err(CoreError::InvalidStats(format!(
                "attack range must be a non-negative number, got {}",
                self.attack_range
            )));
        }
        Ok(())
    }
}

impl Default for CombatantStats {
    fn default() -> Self {
        StatPreset::Warrior.stats()
    }
}

/// Named stat presets for the warrior variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatPreset {
    /// The generic warrior every variant starts from.
    Warrior,
    /// Agile fighter with a long reach.
    Ninja,
    /// Ninja variant trading armor for power and reach.
    Shinobi,
    /// Heavily armored, short reach.
    Knight,
}

impl StatPreset {
    /// All presets, in display order.
    pub const ALL: [StatPreset; 4] = [Self::Warrior, Self::Ninja, Self::Shinobi, Self::Knight];

    /// The stats this preset stands for.
    pub fn stats(self) -> CombatantStats {
        match self {
            Self::Warrior => CombatantStats::new(60.0, 70.0, 250.0),
            Self::Ninja => CombatantStats::new(70.0, 80.0, 300.0),
            Self::Shinobi => CombatantStats::new(80.0, 60.0, 320.0),
            Self::Knight => CombatantStats::new(50.0, 100.0, 250.0),
        }
    }
}

impl fmt::Display for StatPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warrior => write!(f, "warrior"),
            Self::Ninja => write!(f, "ninja"),
            Self::Shinobi => write!(f, "shinobi"),
            Self::Knight => write!(f, "knight"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        for preset in StatPreset::ALL {
            preset.stats().validate().unwrap();
        }
    }

    #[test]
    fn knight_has_strongest_armor() {
        let knight = StatPreset::Knight.stats();
        for preset in StatPreset::ALL {
            assert!(preset.stats().armor <= knight.armor);
        }
    }

    #[test]
    fn zero_armor_rejected() {
        let err = CombatantStats::new(10.0, 0.0, 100.0).validate().unwrap_err();
        assert!(err.to_string().contains("armor"));
    }

    #[test]
    fn nan_power_rejected() {
        assert!(CombatantStats::new(f64::NAN, 10.0, 100.0).validate().is_err());
    }

    #[test]
    fn preset_serializes_snake_case() {
        let json = serde_json::to_string(&StatPreset::Shinobi).unwrap();
        assert_eq!(json, "\"shinobi\"");
    }
}
