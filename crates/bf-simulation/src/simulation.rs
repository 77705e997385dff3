use bf_core::{
    Axis, EnergyChange, Entity, EntityId, EntityKind, Food, LifeState, Placed, Point, Projectile,
    ProjectileId, Rect, StatPreset, World,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{Clock, Fired};
use crate::combat::{self, AttackOutcome};
use crate::config::SimConfig;
use crate::context::{Bodies, SimContext};
use crate::error::{SimError, SimResult};
use crate::event::EventLog;
use crate::feeding;
use crate::lifecycle;
use crate::motion::{self, Direction, MotionConfig, MotionController};
use crate::physics::ProjectilePhysics;
use crate::projectile::{self, LauncherConfig};
use crate::sprite::{self, SpriteAnimation, SpriteConfig};
use crate::system::{Task, Ticked, sync_subscription};

/// The top-level simulation orchestrator.
///
/// Owns the world, the capability components, the virtual clock, the RNG,
/// and the event log. Commands run immediately at the current virtual time;
/// [`Simulation::advance`] fires due clock entries one at a time, in order,
/// so no tick ever interleaves with another.
pub struct Simulation {
    world: World,
    bodies: Bodies,
    clock: Clock<Task>,
    rng: StdRng,
    events: EventLog,
    config: SimConfig,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("now_ms", &self.clock.now())
            .field("entities", &self.world.entity_count())
            .field("projectiles", &self.world.projectile_count())
            .field("pending", &self.clock.pending())
            .field("events", &self.events.len())
            .finish()
    }
}

/// Serializable view of one entity.
#[derive(Debug, Clone, Serialize)]
pub struct EntitySnapshot {
    /// Identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Descriptive kind.
    pub kind: EntityKind,
    /// Stat preset, for combatants built from one.
    pub preset: Option<StatPreset>,
    /// Position and extent.
    pub rect: Rect,
    /// Current energy.
    pub energy: i32,
    /// Alive, sleeping, or dead.
    pub state: LifeState,
}

/// Serializable view of the battlefield for renderers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Virtual time of the snapshot.
    pub at_ms: u64,
    /// Entities in insertion order.
    pub entities: Vec<EntitySnapshot>,
    /// The food, if any.
    pub food: Option<Food>,
    /// Projectiles, oldest first.
    pub projectiles: Vec<Projectile>,
}

impl Simulation {
    /// An empty battlefield.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        Self::with_world(World::new(), config)
    }

    /// Drive an existing world. Entities start without capabilities.
    pub fn with_world(world: World, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let mut sim = Self {
            world,
            bodies: Bodies::default(),
            clock: Clock::new(),
            rng: StdRng::seed_from_u64(config.seed),
            events: EventLog::new(config.max_events),
            config,
        };
        if sim.config.initial_food {
            feeding::schedule_respawn(&mut sim.context());
        }
        debug!(seed = sim.config.seed, "simulation created");
        Ok(sim)
    }

    fn context(&mut self) -> SimContext<'_> {
        SimContext {
            world: &mut self.world,
            bodies: &mut self.bodies,
            clock: &mut self.clock,
            events: &mut self.events,
            rng: &mut self.rng,
            config: &self.config,
        }
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    /// Add an entity to the world.
    pub fn add_entity(&mut self, entity: Entity) -> SimResult<EntityId> {
        let name = entity.name.clone();
        let id = self.world.add_entity(entity)?;
        info!(entity = %id, name, "entity added");
        Ok(id)
    }

    /// Give an entity the Movable capability. Its position is clamped into
    /// the walker's limits.
    pub fn attach_walker(&mut self, id: EntityId, config: MotionConfig) -> SimResult<()> {
        let entity = self.world.entity_mut(id)?;
        let walker = MotionController::new(config, entity.position())?
            .with_interval(self.config.motion_interval_ms);
        entity.set_position(walker.position());
        if let Some(mut old) = self.bodies.walkers.insert(id, walker) {
            old.stop_all();
            sync_subscription(&mut self.clock, &mut old, Task::Walk(id));
        }
        Ok(())
    }

    /// Give an entity the Animated capability. The sprite starts running if
    /// the entity can act.
    pub fn attach_sprite(&mut self, id: EntityId, config: SpriteConfig) -> SimResult<()> {
        let active = self.world.entity(id)?.can_act();
        let mut sprite = SpriteAnimation::new(config)?;
        if let Some(mut old) = self.bodies.sprites.remove(&id) {
            old.stop();
            sync_subscription(&mut self.clock, &mut old, Task::Animate(id));
        }
        if active {
            sprite.start();
            sync_subscription(&mut self.clock, &mut sprite, Task::Animate(id));
        }
        self.bodies.sprites.insert(id, sprite);
        Ok(())
    }

    /// Give a combatant a projectile launcher.
    pub fn attach_launcher(&mut self, id: EntityId, config: LauncherConfig) -> SimResult<()> {
        let entity = self.world.entity(id)?;
        if !entity.is_combatant() {
            return Err(SimError::InvalidConfig(format!(
                "{} has no combat stats and cannot carry a launcher",
                entity.name
            )));
        }
        config.validate()?;
        self.bodies.launchers.insert(id, config);
        Ok(())
    }

    /// Take an entity off the battlefield, cancelling everything scheduled
    /// for it.
    pub fn remove_entity(&mut self, id: EntityId) -> SimResult<Entity> {
        let entity = self.world.remove_entity(id)?;
        if let Some(mut walker) = self.bodies.walkers.remove(&id) {
            walker.stop_all();
            sync_subscription(&mut self.clock, &mut walker, Task::Walk(id));
        }
        if let Some(mut sprite) = self.bodies.sprites.remove(&id) {
            sprite.stop();
            sync_subscription(&mut self.clock, &mut sprite, Task::Animate(id));
        }
        if let Some(pending) = self.bodies.wake_tasks.remove(&id) {
            self.clock.cancel(pending.handle);
        }
        self.bodies.launchers.remove(&id);
        info!(entity = %id, name = %entity.name, "entity removed");
        Ok(entity)
    }

    /// Put food on the field, replacing any that is there. Fails without
    /// touching the field if the food has a bad extent or negative energy.
    pub fn place_food(&mut self, food: Food) -> SimResult<Option<Food>> {
        food.validate()?;
        Ok(self.world.place_food(food))
    }

    // -----------------------------------------------------------------------
    // Entity operations
    // -----------------------------------------------------------------------

    /// Set an axis velocity to `sign * speed` (the walker's speed if `None`).
    pub fn start_axis(
        &mut self,
        id: EntityId,
        axis: Axis,
        sign: f64,
        speed: Option<f64>,
    ) -> SimResult<bool> {
        motion::start_axis(&mut self.context(), id, axis, sign, speed)
    }

    /// [`Simulation::start_axis`] for a direction command.
    pub fn walk(&mut self, id: EntityId, direction: Direction, speed: Option<f64>) -> SimResult<bool> {
        self.start_axis(id, direction.axis(), direction.sign(), speed)
    }

    /// Stop one axis.
    pub fn stop_axis(&mut self, id: EntityId, axis: Axis) -> SimResult<bool> {
        motion::stop(&mut self.context(), id, Some(axis))
    }

    /// Stop both axes.
    pub fn stop_all(&mut self, id: EntityId) -> SimResult<bool> {
        motion::stop(&mut self.context(), id, None)
    }

    /// The single energy writer for callers outside the engine.
    pub fn set_energy(&mut self, id: EntityId, value: f64) -> SimResult<EnergyChange> {
        lifecycle::set_energy(&mut self.context(), id, value)
    }

    /// Fall asleep for `units` sleep units.
    pub fn sleep(&mut self, id: EntityId, units: u32) -> SimResult<bool> {
        lifecycle::sleep(&mut self.context(), id, units)
    }

    /// End a sleep early.
    pub fn wake(&mut self, id: EntityId) -> SimResult<bool> {
        lifecycle::wake(&mut self.context(), id)
    }

    /// Bring a dead entity back.
    pub fn reincarnate(&mut self, id: EntityId) -> SimResult<bool> {
        lifecycle::reincarnate(&mut self.context(), id)
    }

    /// Eat a food item. The item is not taken from the world.
    pub fn eat(&mut self, id: EntityId, food: &Food) -> SimResult<EnergyChange> {
        lifecycle::eat(&mut self.context(), id, food)
    }

    /// Melee attack.
    pub fn attack(&mut self, attacker: EntityId, defender: EntityId) -> SimResult<AttackOutcome> {
        combat::attack(&mut self.context(), attacker, defender)
    }

    /// Throw a projectile with a velocity drawn from the launcher.
    pub fn fire(
        &mut self,
        owner: EntityId,
        target: Option<EntityId>,
    ) -> SimResult<Option<ProjectileId>> {
        projectile::fire(&mut self.context(), owner, target, None)
    }

    /// Throw a projectile with an explicit initial velocity.
    pub fn fire_with_velocity(
        &mut self,
        owner: EntityId,
        target: Option<EntityId>,
        velocity: Point,
    ) -> SimResult<Option<ProjectileId>> {
        projectile::fire(&mut self.context(), owner, target, Some(velocity))
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Run everything due in the next `ms` milliseconds. Returns the number
    /// of clock entries fired.
    pub fn advance(&mut self, ms: u64) -> SimResult<usize> {
        let until = self.clock.now().saturating_add(ms);
        self.run_until(until)
    }

    /// Run everything due up to and including `t_ms`, then move the clock
    /// there.
    pub fn run_until(&mut self, t_ms: u64) -> SimResult<usize> {
        let mut fired = 0;
        while let Some(entry) = self.clock.pop_due(t_ms) {
            self.dispatch(entry)?;
            fired += 1;
        }
        self.clock.advance_to(t_ms);
        Ok(fired)
    }

    /// Fire the next clock entry, whenever it is due. Returns its timestamp,
    /// or `None` when nothing is scheduled.
    pub fn step(&mut self) -> SimResult<Option<u64>> {
        let Some(due) = self.clock.next_due() else {
            return Ok(None);
        };
        match self.clock.pop_due(due) {
            Some(entry) => {
                self.dispatch(entry)?;
                Ok(Some(due))
            }
            None => Ok(None),
        }
    }

    fn dispatch(&mut self, entry: Fired<Task>) -> SimResult<()> {
        let ctx = &mut self.context();
        match entry.payload {
            Task::Walk(id) => motion::on_tick(ctx, id),
            Task::Animate(id) => sprite::on_tick(ctx, id),
            Task::Fly(pid) => projectile::on_tick(ctx, pid),
            Task::Wake(id) => lifecycle::on_wake_task(ctx, id),
            Task::SpawnFood => feeding::on_spawn_task(ctx),
            Task::RemoveProjectile(pid) => projectile::on_remove_task(ctx, pid),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The world model.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Recorded events.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Run settings.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// An entity's walker.
    pub fn walker(&self, id: EntityId) -> Option<&MotionController> {
        self.bodies.walkers.get(&id)
    }

    /// An entity's sprite.
    pub fn sprite(&self, id: EntityId) -> Option<&SpriteAnimation> {
        self.bodies.sprites.get(&id)
    }

    /// A projectile's physics.
    pub fn flight(&self, id: ProjectileId) -> Option<&ProjectilePhysics> {
        self.bodies.flights.get(&id)
    }

    /// Whether a sleeping entity has a wake-up scheduled.
    pub fn pending_wake(&self, id: EntityId) -> bool {
        self.bodies.wake_tasks.contains_key(&id)
    }

    /// Whether a food spawn is scheduled.
    pub fn pending_food_spawn(&self) -> bool {
        self.bodies.food_task.is_some()
    }

    /// Whether anything moves: walkers, sprites, or projectiles.
    pub fn is_active(&self) -> bool {
        self.bodies.walkers.values().any(|w| w.is_running())
            || self.bodies.flights.values().any(|f| f.is_running())
            || self.bodies.sprites.values().any(|s| s.is_running())
    }

    /// Serializable view of the current state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            at_ms: self.clock.now(),
            entities: self
                .world
                .entities()
                .map(|e| EntitySnapshot {
                    id: e.id,
                    name: e.name.clone(),
                    kind: e.kind,
                    preset: e.preset(),
                    rect: e.rect(),
                    energy: e.energy(),
                    state: e.life_state(),
                })
                .collect(),
            food: self.world.food().cloned(),
            projectiles: self.world.projectiles().cloned().collect(),
        }
    }

    /// Extract the world, consuming the simulation.
    pub fn into_world(self) -> World {
        self.world
    }
}
