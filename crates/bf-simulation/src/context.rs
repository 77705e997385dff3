use std::collections::HashMap;

use bf_core::{EntityId, ProjectileId, World};
use rand::rngs::StdRng;
use tracing::trace;

use crate::clock::{Clock, TimerHandle};
use crate::config::SimConfig;
use crate::event::{EventLog, SimEvent, SimEventKind};
use crate::motion::MotionController;
use crate::physics::ProjectilePhysics;
use crate::projectile::LauncherConfig;
use crate::sprite::SpriteAnimation;
use crate::system::Task;

/// A pending wake-up, so an early wake or a death can cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingWake {
    /// The one-shot clock entry.
    pub handle: TimerHandle,
    /// Units the entity went to sleep for.
    pub units: u32,
}

/// Capability components attached to entities and projectiles, keyed by ID.
/// An entity moves only if it has a walker, animates only with a sprite,
/// and throws only with a launcher.
#[derive(Debug, Default)]
pub struct Bodies {
    /// Movable capability.
    pub walkers: HashMap<EntityId, MotionController>,
    /// Animated capability.
    pub sprites: HashMap<EntityId, SpriteAnimation>,
    /// Projectile launchers.
    pub launchers: HashMap<EntityId, LauncherConfig>,
    /// Thrown capability, one per projectile in flight.
    pub flights: HashMap<ProjectileId, ProjectilePhysics>,
    /// Scheduled wake-ups of sleeping entities.
    pub wake_tasks: HashMap<EntityId, PendingWake>,
    /// Scheduled food spawn.
    pub food_task: Option<TimerHandle>,
}

/// Mutable context passed to every resolver while a task or command runs.
pub struct SimContext<'a> {
    /// Entities, food, projectiles.
    pub world: &'a mut World,
    /// Capability components.
    pub bodies: &'a mut Bodies,
    /// Virtual-time scheduler.
    pub clock: &'a mut Clock<Task>,
    /// Event sink.
    pub events: &'a mut EventLog,
    /// Seeded randomness.
    pub rng: &'a mut StdRng,
    /// Run settings.
    pub config: &'a SimConfig,
}

impl SimContext<'_> {
    /// Emit a simulation event at the current virtual time.
    pub fn emit(&mut self, kind: SimEventKind, description: impl Into<String>) {
        let description = description.into();
        trace!(event = kind.label(), at_ms = self.clock.now(), "{description}");
        self.events
            .push(SimEvent::new(self.clock.now(), kind, description));
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }
}
