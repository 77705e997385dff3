use std::fmt;

use bf_core::{EntityId, FoodKind, Point, ProjectileId};
use serde::Serialize;

/// The body a `Step` event moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRef {
    /// A walking entity.
    Entity(EntityId),
    /// A projectile in flight.
    Projectile(ProjectileId),
}

/// What kind of simulation event occurred.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEventKind {
    // Motion
    /// A walker or projectile moved.
    Step {
        /// What moved.
        body: BodyRef,
        /// Its new top-left position.
        position: Point,
    },
    /// A sprite advanced one frame.
    Frame {
        /// The animated entity.
        entity: EntityId,
        /// Frame index after the step.
        frame: u32,
        /// Horizontal pixel offset of that frame in the sprite sheet.
        offset: f64,
    },
    /// A looping sprite wrapped back to its first frame.
    Iterate {
        /// The animated entity.
        entity: EntityId,
    },
    /// A projectile's physics settled without hitting anything.
    Complete {
        /// The settled projectile.
        projectile: ProjectileId,
    },

    // Lifecycle
    /// Energy changed value.
    EnergyChange {
        /// Whose energy.
        entity: EntityId,
        /// The new value.
        energy: i32,
    },
    /// Energy reached zero.
    Die {
        /// Who died.
        entity: EntityId,
    },
    /// A dead entity came back with full energy.
    Reincarnate {
        /// Who came back.
        entity: EntityId,
    },
    /// An entity fell asleep.
    Sleep {
        /// Who sleeps.
        entity: EntityId,
        /// Requested duration in sleep units.
        units: u32,
    },
    /// A sleeping entity woke up.
    ReadySleeping {
        /// Who woke.
        entity: EntityId,
    },

    // Combat
    /// A melee attack landed.
    Attacked {
        /// Who was hit.
        entity: EntityId,
        /// Who hit.
        attacker: EntityId,
        /// Damage before rounding.
        damage: f64,
        /// Defender energy after the hit.
        energy: i32,
    },
    /// A projectile hit its target.
    Impact {
        /// The projectile.
        projectile: ProjectileId,
        /// Who was hit.
        target: EntityId,
        /// Target energy after the hit.
        energy: i32,
    },
    /// A combatant threw a projectile.
    ProjectileFired {
        /// The new projectile.
        projectile: ProjectileId,
        /// Who threw it.
        owner: EntityId,
        /// Who it may hit.
        target: Option<EntityId>,
    },
    /// A projectile left the battlefield.
    ProjectileRemoved {
        /// The removed projectile.
        projectile: ProjectileId,
    },

    // Feeding
    /// New food appeared.
    FoodSpawned {
        /// What appeared.
        kind: FoodKind,
        /// Where.
        position: Point,
    },
    /// An entity ate the food.
    FoodConsumed {
        /// Who ate.
        entity: EntityId,
        /// What was eaten.
        kind: FoodKind,
        /// Energy the food was worth.
        value: i32,
    },
}

impl SimEventKind {
    /// Check whether a given entity is involved in this event.
    pub fn involves(&self, id: EntityId) -> bool {
        match self {
            Self::Step { body, .. } => *body == BodyRef::Entity(id),
            Self::Frame { entity, .. }
            | Self::Iterate { entity }
            | Self::EnergyChange { entity, .. }
            | Self::Die { entity }
            | Self::Reincarnate { entity }
            | Self::Sleep { entity, .. }
            | Self::ReadySleeping { entity }
            | Self::FoodConsumed { entity, .. } => *entity == id,
            Self::Attacked {
                entity, attacker, ..
            } => *entity == id || *attacker == id,
            Self::Impact { target, .. } => *target == id,
            Self::ProjectileFired { owner, target, .. } => *owner == id || *target == Some(id),
            Self::Complete { .. } | Self::ProjectileRemoved { .. } | Self::FoodSpawned { .. } => {
                false
            }
        }
    }

    /// Short label used by renderers and the CLI, matching the event names
    /// UI collaborators subscribe to.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Step { .. } => "step",
            Self::Frame { .. } => "frame",
            Self::Iterate { .. } => "iterate",
            Self::Complete { .. } => "complete",
            Self::EnergyChange { .. } => "energyChange",
            Self::Die { .. } => "die",
            Self::Reincarnate { .. } => "reincarnate",
            Self::Sleep { .. } => "sleep",
            Self::ReadySleeping { .. } => "readySleeping",
            Self::Attacked { .. } => "attacked",
            Self::Impact { .. } => "impact",
            Self::ProjectileFired { .. } => "fire",
            Self::ProjectileRemoved { .. } => "removed",
            Self::FoodSpawned { .. } => "foodSpawned",
            Self::FoodConsumed { .. } => "foodConsumed",
        }
    }

    /// High-frequency events (steps and frames) that drown out everything
    /// else in a summary.
    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Step { .. } | Self::Frame { .. })
    }
}

/// A record of something that happened during simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimEvent {
    /// Virtual timestamp in milliseconds.
    pub at_ms: u64,
    /// The specific kind of event that occurred.
    #[serde(flatten)]
    pub kind: SimEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl SimEvent {
    /// Create a new simulation event.
    pub fn new(at_ms: u64, kind: SimEventKind, description: impl Into<String>) -> Self {
        Self {
            at_ms,
            kind,
            description: description.into(),
        }
    }
}

impl fmt::Display for SimEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:>6} ms] {:<13} {}",
            self.at_ms,
            self.kind.label(),
            self.description
        )
    }
}

/// Accumulates events during a simulation run.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimEvent>,
    max_events: usize,
    total: usize,
}

impl EventLog {
    /// Create a new event log with the given maximum capacity (0 = unlimited).
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
            total: 0,
        }
    }

    /// Append an event, dropping the oldest events if the log exceeds its capacity.
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
        self.total += 1;
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Return a slice of all retained events.
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Events pushed after the first `seen` events ever recorded. Lets a
    /// follower stream the log without re-reading it; trimmed events are
    /// skipped.
    pub fn since(&self, seen: usize) -> &[SimEvent] {
        let dropped = self.total - self.events.len();
        let start = seen.saturating_sub(dropped).min(self.events.len());
        &self.events[start..]
    }

    /// Number of events ever pushed, including trimmed ones.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Return all events that occurred at the given timestamp.
    pub fn events_at(&self, at_ms: u64) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.at_ms == at_ms).collect()
    }

    /// Return all events involving the given entity.
    pub fn events_for_entity(&self, id: EntityId) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.kind.involves(id)).collect()
    }

    /// Count retained events with the given label.
    pub fn count(&self, label: &str) -> usize {
        self.events
            .iter()
            .filter(|e| e.kind.label() == label)
            .count()
    }

    /// Return the number of retained events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Return `true` if no events are retained.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Remove all retained events.
    pub fn clear(&mut self) {
        self.events.clear();
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(at_ms: u64, entity: EntityId, energy: i32) -> SimEvent {
        SimEvent::new(
            at_ms,
            SimEventKind::EnergyChange { entity, energy },
            format!("energy {energy}"),
        )
    }

    #[test]
    fn event_log_push_and_query() {
        let mut log = EventLog::new(0);
        let id = EntityId::new();
        log.push(energy(17, id, 90));
        assert_eq!(log.len(), 1);
        assert_eq!(log.events_at(17).len(), 1);
        assert_eq!(log.events_for_entity(id).len(), 1);
        assert_eq!(log.count("energyChange"), 1);
    }

    #[test]
    fn event_log_max_events_trims() {
        let mut log = EventLog::new(2);
        let id = EntityId::new();
        for i in 0..5 {
            log.push(energy(i, id, 50));
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.total(), 5);
        assert_eq!(log.events()[0].at_ms, 3);
        assert_eq!(log.events()[1].at_ms, 4);
    }

    #[test]
    fn since_skips_seen_and_trimmed_events() {
        let mut log = EventLog::new(3);
        let id = EntityId::new();
        for i in 0..2 {
            log.push(energy(i, id, 50));
        }
        assert_eq!(log.since(1).len(), 1);
        for i in 2..6 {
            log.push(energy(i, id, 50));
        }
        // Events 0..3 are gone; a follower that saw 2 gets what is left.
        let rest: Vec<u64> = log.since(2).iter().map(|e| e.at_ms).collect();
        assert_eq!(rest, vec![3, 4, 5]);
        assert!(log.since(6).is_empty());
    }

    #[test]
    fn event_kind_involves_entity() {
        let a = EntityId::new();
        let b = EntityId::new();
        let c = EntityId::new();

        let kind = SimEventKind::Attacked {
            entity: a,
            attacker: b,
            damage: 12.5,
            energy: 40,
        };
        assert!(kind.involves(a));
        assert!(kind.involves(b));
        assert!(!kind.involves(c));

        let kind = SimEventKind::Step {
            body: BodyRef::Projectile(ProjectileId(1)),
            position: Point::default(),
        };
        assert!(!kind.involves(a));

        let kind = SimEventKind::ProjectileFired {
            projectile: ProjectileId(1),
            owner: a,
            target: Some(b),
        };
        assert!(kind.involves(b));
        assert!(!kind.involves(c));
    }

    #[test]
    fn event_log_clear() {
        let mut log = EventLog::new(0);
        log.push(energy(1, EntityId::new(), 10));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.total(), 0);
    }

    #[test]
    fn display_is_aligned() {
        let event = SimEvent::new(
            1_530,
            SimEventKind::Die {
                entity: EntityId::new(),
            },
            "Sir Cane of Kamilot died",
        );
        insta::assert_snapshot!(event.to_string(), @"[  1530 ms] die           Sir Cane of Kamilot died");
    }
}
