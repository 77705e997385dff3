use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::geometry::{Placed, Point, Rect};
use crate::stats::{CombatantStats, StatPreset};

/// Unique identifier for every entity on the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Generate a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// What sort of creature an entity is. Behavior differences come from stats
/// and attached components, the kind is descriptive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Has energy and can move; cannot fight.
    Mammal,
    /// A named mammal.
    Human,
    /// A human with combat stats.
    Warrior,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mammal => write!(f, "mammal"),
            Self::Human => write!(f, "human"),
            Self::Warrior => write!(f, "warrior"),
        }
    }
}

/// Vitality in `[0, 100]`. Zero means dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Energy(i32);

impl Energy {
    /// Highest possible energy.
    pub const MAX: i32 = 100;
    /// A fully rested entity.
    pub const FULL: Energy = Energy(Self::MAX);
    /// A dead entity.
    pub const ZERO: Energy = Energy(0);

    /// Round half away from zero, then clamp into `[0, 100]`. NaN maps to 0.
    pub fn from_f64(value: f64) -> Self {
        Self(value.round().clamp(0.0, Self::MAX as f64) as i32)
    }

    /// The integer value.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state derived from energy and the sleeping flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeState {
    /// Energy above zero and awake.
    Alive,
    /// Alive, temporarily unable to move or fight.
    Sleeping,
    /// Energy is zero.
    Dead,
}

impl fmt::Display for LifeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => write!(f, "alive"),
            Self::Sleeping => write!(f, "sleeping"),
            Self::Dead => write!(f, "dead"),
        }
    }
}

/// What a call to [`Entity::set_energy`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyChange {
    /// The entity is dead; only reincarnation changes its energy.
    Ignored,
    /// The clamped value equals the current one.
    Unchanged(i32),
    /// Energy changed and the entity is still alive.
    Changed {
        /// Energy before the call.
        from: i32,
        /// Energy after the call.
        to: i32,
    },
    /// Energy dropped to zero; the entity just died.
    Died {
        /// Energy before the call.
        from: i32,
    },
}

/// A creature on the battlefield.
///
/// Position and energy are private: the coordinate setter and the energy
/// setter are the only writers, so clamping and the die-once rule hold no
/// matter who drives the entity.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    /// Unique identifier for this entity.
    pub id: EntityId,
    /// Descriptive kind.
    pub kind: EntityKind,
    /// Display name of the entity.
    pub name: String,
    rect: Rect,
    energy: Energy,
    sleeping: bool,
    stats: Option<CombatantStats>,
    preset: Option<StatPreset>,
}

impl Entity {
    /// Create an entity with a random ID, full energy and no combat stats.
    pub fn new(kind: EntityKind, name: impl Into<String>, rect: Rect) -> Self {
        Self::with_id(EntityId::new(), kind, name, rect)
    }

    /// Create an entity with a pre-assigned ID.
    pub fn with_id(id: EntityId, kind: EntityKind, name: impl Into<String>, rect: Rect) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            rect,
            energy: Energy::FULL,
            sleeping: false,
            stats: None,
            preset: None,
        }
    }

    /// A warrior built from a stat preset.
    pub fn warrior(name: impl Into<String>, rect: Rect, preset: StatPreset) -> Self {
        let mut entity = Self::new(EntityKind::Warrior, name, rect);
        entity.stats = Some(preset.stats());
        entity.preset = Some(preset);
        entity
    }

    /// A warrior with explicit stats.
    pub fn with_stats(name: impl Into<String>, rect: Rect, stats: CombatantStats) -> Self {
        let mut entity = Self::new(EntityKind::Warrior, name, rect);
        entity.stats = Some(stats);
        entity
    }

    /// Check extent and stats. Called by the world when the entity is added.
    pub fn validate(&self) -> CoreResult<()> {
        self.rect.validate()?;
        if let Some(stats) = &self.stats {
            stats.validate()?;
        }
        Ok(())
    }

    /// Top-left corner.
    pub fn position(&self) -> Point {
        self.rect.position()
    }

    /// Move the entity. The extent never changes.
    pub fn set_position(&mut self, position: Point) {
        self.rect = self.rect.moved_to(position);
    }

    /// Current energy value.
    pub fn energy(&self) -> i32 {
        self.energy.value()
    }

    /// The single energy writer: rounds, clamps to `[0, 100]`, and reports
    /// whether this call killed the entity. Dead entities ignore it.
    pub fn set_energy(&mut self, value: f64) -> EnergyChange {
        if self.energy == Energy::ZERO {
            return EnergyChange::Ignored;
        }
        let from = self.energy.value();
        let next = Energy::from_f64(value);
        if next == self.energy {
            return EnergyChange::Unchanged(from);
        }
        self.energy = next;
        if next == Energy::ZERO {
            self.sleeping = false;
            EnergyChange::Died { from }
        } else {
            EnergyChange::Changed {
                from,
                to: next.value(),
            }
        }
    }

    /// Current lifecycle state.
    pub fn life_state(&self) -> LifeState {
        if self.energy == Energy::ZERO {
            LifeState::Dead
        } else if self.sleeping {
            LifeState::Sleeping
        } else {
            LifeState::Alive
        }
    }

    /// Energy above zero (sleeping counts as alive).
    pub fn is_alive(&self) -> bool {
        self.energy != Energy::ZERO
    }

    /// Currently asleep.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Alive and awake: may move, attack, and fire.
    pub fn can_act(&self) -> bool {
        self.life_state() == LifeState::Alive
    }

    /// Fall asleep. Returns `false` when dead or already asleep.
    pub fn begin_sleep(&mut self) -> bool {
        if !self.can_act() {
            return false;
        }
        self.sleeping = true;
        true
    }

    /// Wake up. Returns `false` when not asleep.
    pub fn end_sleep(&mut self) -> bool {
        if !self.sleeping {
            return false;
        }
        self.sleeping = false;
        true
    }

    /// Come back from the dead with full energy. Returns `false` unless dead.
    pub fn reincarnate(&mut self) -> bool {
        if self.is_alive() {
            return false;
        }
        self.energy = Energy::FULL;
        self.sleeping = false;
        true
    }

    /// Combat stats, if this entity can fight.
    pub fn stats(&self) -> Option<&CombatantStats> {
        self.stats.as_ref()
    }

    /// Whether this entity can attack and be attacked.
    pub fn is_combatant(&self) -> bool {
        self.stats.is_some()
    }

    /// The preset the stats came from, if any.
    pub fn preset(&self) -> Option<StatPreset> {
        self.preset
    }
}

impl Placed for Entity {
    fn rect(&self) -> Rect {
        self.rect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ninja() -> Entity {
        Entity::warrior("Chika", Rect::new(0.0, 0.0, 200.0, 300.0), StatPreset::Ninja)
    }

    #[test]
    fn entity_id_display_shows_short_form() {
        let id = EntityId(Uuid::parse_str("a3f2b1c8-1234-5678-9abc-def012345678").unwrap());
        assert_eq!(id.to_string(), "a3f2b1c8");
    }

    #[test]
    fn new_entity_starts_full_and_alive() {
        let e = ninja();
        assert_eq!(e.energy(), 100);
        assert_eq!(e.life_state(), LifeState::Alive);
        assert!(e.is_combatant());
        assert_eq!(e.preset(), Some(StatPreset::Ninja));
    }

    #[test]
    fn set_energy_clamps_and_rounds() {
        let mut e = ninja();
        assert_eq!(e.set_energy(150.0), EnergyChange::Unchanged(100));
        assert_eq!(e.set_energy(42.5), EnergyChange::Changed { from: 100, to: 43 });
        assert_eq!(e.set_energy(42.6), EnergyChange::Unchanged(43));
    }

    #[test]
    fn death_fires_once() {
        let mut e = ninja();
        e.set_energy(30.0);
        assert_eq!(e.set_energy(30.0 - 45.0), EnergyChange::Died { from: 30 });
        assert_eq!(e.set_energy(-10.0), EnergyChange::Ignored);
        assert_eq!(e.set_energy(50.0), EnergyChange::Ignored);
        assert_eq!(e.energy(), 0);
        assert_eq!(e.life_state(), LifeState::Dead);
    }

    #[test]
    fn sleep_and_wake() {
        let mut e = ninja();
        assert!(e.begin_sleep());
        assert!(!e.begin_sleep());
        assert_eq!(e.life_state(), LifeState::Sleeping);
        assert!(!e.can_act());
        assert!(e.end_sleep());
        assert!(!e.end_sleep());
        assert!(e.can_act());
    }

    #[test]
    fn dying_clears_sleep() {
        let mut e = ninja();
        e.begin_sleep();
        e.set_energy(0.0);
        assert!(!e.is_sleeping());
        assert!(!e.begin_sleep());
    }

    #[test]
    fn reincarnate_only_from_dead() {
        let mut e = ninja();
        assert!(!e.reincarnate());
        e.set_energy(0.0);
        assert!(e.reincarnate());
        assert_eq!(e.energy(), 100);
        assert!(e.can_act());
    }

    #[test]
    fn set_position_keeps_extent() {
        let mut e = ninja();
        e.set_position(Point::new(10.0, 20.0));
        assert_eq!(e.rect(), Rect::new(10.0, 20.0, 200.0, 300.0));
    }

    #[test]
    fn mammal_is_not_combatant() {
        let e = Entity::new(EntityKind::Mammal, "Cat", Rect::default());
        assert!(!e.is_combatant());
        assert!(e.stats().is_none());
    }

    #[test]
    fn validate_rejects_bad_stats() {
        let e = Entity::with_stats("Broken", Rect::default(), CombatantStats::new(1.0, -1.0, 1.0));
        assert!(e.validate().is_err());
    }

    proptest! {
        #[test]
        fn energy_stays_in_range(values in proptest::collection::vec(-500.0f64..500.0, 1..40)) {
            let mut e = ninja();
            for v in values {
                e.set_energy(v);
                prop_assert!((0..=100).contains(&e.energy()));
            }
        }

        #[test]
        fn at_most_one_death_without_reincarnation(values in proptest::collection::vec(-200.0f64..200.0, 1..40)) {
            let mut e = ninja();
            let deaths = values
                .into_iter()
                .filter(|v| matches!(e.set_energy(*v), EnergyChange::Died { .. }))
                .count();
            prop_assert!(deaths <= 1);
        }
    }
}
