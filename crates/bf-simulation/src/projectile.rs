use bf_core::{AxisLimits, EntityId, Placed, Point, ProjectileId, ProjectileStatus, Rect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{BodyRef, SimEventKind};
use crate::lifecycle;
use crate::physics::{AxisSpeed, GravityConfig, ProjectilePhysics};
use crate::system::{Task, sync_subscription};

/// Settings of a combatant's throwing weapon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Energy removed from the target on impact.
    pub damage: i32,
    /// Bounce boundaries of thrown projectiles.
    pub limits: AxisLimits,
    /// Throw velocity.
    pub speed: AxisSpeed,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            damage: 10,
            limits: AxisLimits::new((0.0, 730.0), (0.0, 470.0)),
            speed: AxisSpeed::ranged([25.0, 30.0], [40.0, 50.0]),
        }
    }
}

impl LauncherConfig {
    /// Physics settings for a projectile from this launcher.
    pub fn gravity(&self) -> GravityConfig {
        GravityConfig {
            limits: self.limits,
            speed: self.speed,
            ..GravityConfig::default()
        }
    }

    /// Reject settings a projectile could not fly with.
    pub fn validate(&self) -> SimResult<()> {
        if self.damage < 0 {
            return Err(SimError::InvalidConfig(format!(
                "launcher damage must be >= 0, got {}",
                self.damage
            )));
        }
        self.gravity().validate()
    }
}

/// Throw a projectile from the owner's center. `velocity` overrides the
/// launcher's speed draw. Returns `None` when the owner cannot fire.
pub(crate) fn fire(
    ctx: &mut SimContext<'_>,
    owner_id: EntityId,
    target_id: Option<EntityId>,
    velocity: Option<Point>,
) -> SimResult<Option<ProjectileId>> {
    let owner = ctx.world.entity(owner_id)?;
    let target = match target_id {
        Some(id) => Some(ctx.world.entity(id)?),
        None => None,
    };
    if !owner.can_act() || !owner.is_combatant() {
        return Ok(None);
    }
    let Some(launcher) = ctx.bodies.launchers.get(&owner_id).copied() else {
        return Ok(None);
    };

    // Only combatants can be hit.
    let target = target.filter(|t| t.is_combatant() && t.id != owner_id);
    let target_id = target.map(|t| t.id);
    let target_name = target.map_or_else(|| "nothing".to_string(), |t| t.name.clone());
    let owner_name = owner.name.clone();
    let origin = owner.rect().center();

    let mut flight =
        ProjectilePhysics::new(launcher.gravity())?.with_interval(ctx.config.physics_interval_ms);
    let velocity = velocity.unwrap_or_else(|| flight.draw_velocity(ctx.rng));
    flight.start(origin, velocity, ctx.now());

    let pid = ctx
        .world
        .add_projectile(owner_id, target_id, launcher.damage, Rect::at(origin));
    sync_subscription(ctx.clock, &mut flight, Task::Fly(pid));
    ctx.bodies.flights.insert(pid, flight);

    debug!(projectile = %pid, owner = %owner_id, vx = velocity.x, vy = velocity.y, "fired");
    ctx.emit(
        SimEventKind::ProjectileFired {
            projectile: pid,
            owner: owner_id,
            target: target_id,
        },
        format!("{owner_name} throws {pid} at {target_name}"),
    );
    Ok(Some(pid))
}

/// Physics tick: integrate, emit `step`, then check for an impact before
/// checking for termination, so a hit always wins over `complete`.
pub(crate) fn on_tick(ctx: &mut SimContext<'_>, pid: ProjectileId) -> SimResult<()> {
    let now = ctx.now();
    let Some(flight) = ctx.bodies.flights.get_mut(&pid) else {
        warn!(projectile = %pid, "fly tick for a projectile without physics");
        return Ok(());
    };
    let position = flight.integrate(now);

    let projectile = ctx
        .world
        .projectile_mut(pid)
        .ok_or(SimError::ProjectileNotFound(pid))?;
    projectile.set_position(position);
    ctx.emit(
        SimEventKind::Step {
            body: BodyRef::Projectile(pid),
            position,
        },
        format!("{pid} at {position}"),
    );

    if try_impact(ctx, pid)? {
        return Ok(());
    }

    let Some(flight) = ctx.bodies.flights.get_mut(&pid) else {
        return Ok(());
    };
    if flight.is_settled() {
        flight.stop();
        let elapsed = flight.elapsed_ms();
        let bounces = flight.bounces();
        sync_subscription(ctx.clock, flight, Task::Fly(pid));
        if let Some(projectile) = ctx.world.projectile_mut(pid) {
            projectile.status = ProjectileStatus::Settled;
        }
        debug!(projectile = %pid, elapsed_ms = elapsed, bounces, "settled");
        ctx.emit(
            SimEventKind::Complete { projectile: pid },
            format!("{pid} came to rest after {elapsed} ms and {bounces} bounce(s)"),
        );
        schedule_removal(ctx, pid);
    }
    Ok(())
}

fn try_impact(ctx: &mut SimContext<'_>, pid: ProjectileId) -> SimResult<bool> {
    let Some(projectile) = ctx.world.projectile(pid) else {
        return Ok(false);
    };
    let Some(target_id) = projectile.target else {
        return Ok(false);
    };
    let Some(target) = ctx.world.get_entity(target_id) else {
        return Ok(false);
    };
    if !target.is_alive() || projectile.distance_to(target) >= ctx.config.impact_radius {
        return Ok(false);
    }

    let damage = projectile.damage;
    let name = target.name.clone();
    let before = target.energy();

    if let Some(flight) = ctx.bodies.flights.get_mut(&pid) {
        flight.stop();
        sync_subscription(ctx.clock, flight, Task::Fly(pid));
    }
    if let Some(projectile) = ctx.world.projectile_mut(pid) {
        projectile.status = ProjectileStatus::Impacted;
    }

    lifecycle::set_energy(ctx, target_id, f64::from(before) - f64::from(damage))?;
    let energy = ctx.world.entity(target_id)?.energy();
    info!(projectile = %pid, target = %target_id, energy, "impact");
    ctx.emit(
        SimEventKind::Impact {
            projectile: pid,
            target: target_id,
            energy,
        },
        format!("{pid} hits {name} for {damage}"),
    );
    schedule_removal(ctx, pid);
    Ok(true)
}

fn schedule_removal(ctx: &mut SimContext<'_>, pid: ProjectileId) {
    let grace = ctx.config.removal_grace_ms;
    ctx.clock.defer(Task::RemoveProjectile(pid), grace);
}

/// The grace period after a stop elapsed: drop the projectile.
pub(crate) fn on_remove_task(ctx: &mut SimContext<'_>, pid: ProjectileId) -> SimResult<()> {
    ctx.bodies.flights.remove(&pid);
    if ctx.world.remove_projectile(pid).is_err() {
        warn!(projectile = %pid, "removal task for an unknown projectile");
        return Ok(());
    }
    ctx.emit(
        SimEventKind::ProjectileRemoved { projectile: pid },
        format!("{pid} removed"),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use bf_core::{Entity, EntityKind, StatPreset};

    use super::*;
    use crate::config::SimConfig;
    use crate::simulation::Simulation;

    fn duel() -> (Simulation, EntityId, EntityId) {
        let mut sim = Simulation::new(SimConfig::default().with_initial_food(false)).unwrap();
        let thrower = sim
            .add_entity(Entity::warrior(
                "Thrower",
                Rect::new(100.0, 300.0, 40.0, 40.0),
                StatPreset::Knight,
            ))
            .unwrap();
        let target = sim
            .add_entity(Entity::warrior(
                "Target",
                Rect::new(400.0, 300.0, 40.0, 40.0),
                StatPreset::Ninja,
            ))
            .unwrap();
        sim.attach_launcher(thrower, LauncherConfig::default()).unwrap();
        (sim, thrower, target)
    }

    #[test]
    fn direct_hit_damages_and_suppresses_complete() {
        let (mut sim, thrower, target) = duel();
        // Arrives level with the target after about 390 ms.
        let pid = sim
            .fire_with_velocity(thrower, Some(target), Point::new(60.0, -20.0))
            .unwrap()
            .unwrap();
        sim.advance(1_000).unwrap();

        assert_eq!(sim.world().entity(target).unwrap().energy(), 90);
        assert_eq!(sim.events().count("impact"), 1);
        assert_eq!(sim.events().count("complete"), 0);
        // Removed after the grace period.
        assert!(sim.world().projectile(pid).is_none());
        assert_eq!(sim.events().count("removed"), 1);
    }

    #[test]
    fn untargeted_projectile_completes() {
        let (mut sim, thrower, _) = duel();
        let pid = sim.fire(thrower, None).unwrap().unwrap();
        assert!(sim.world().projectile(pid).unwrap().is_flying());

        sim.advance(21_000).unwrap();
        assert_eq!(sim.events().count("impact"), 0);
        assert_eq!(sim.events().count("complete"), 1);
        assert!(sim.world().projectile(pid).is_none());
        assert!(sim.flight(pid).is_none());
    }

    #[test]
    fn non_combatant_target_becomes_untargeted() {
        let (mut sim, thrower, _) = duel();
        let cow = sim
            .add_entity(Entity::new(EntityKind::Mammal, "Cow", Rect::new(140.0, 300.0, 10.0, 10.0)))
            .unwrap();
        let pid = sim.fire(thrower, Some(cow)).unwrap().unwrap();
        assert_eq!(sim.world().projectile(pid).unwrap().target, None);
    }

    #[test]
    fn cannot_fire_while_dead_sleeping_or_unarmed() {
        let (mut sim, thrower, target) = duel();
        assert_eq!(sim.fire(target, Some(thrower)).unwrap(), None);

        sim.sleep(thrower, 1).unwrap();
        assert_eq!(sim.fire(thrower, Some(target)).unwrap(), None);

        sim.advance(3_000).unwrap();
        sim.set_energy(thrower, 0.0).unwrap();
        let before = sim.events().len();
        assert_eq!(sim.fire(thrower, Some(target)).unwrap(), None);
        assert_eq!(sim.events().len(), before);
        assert_eq!(sim.world().projectile_count(), 0);
    }

    #[test]
    fn dead_target_is_not_hit() {
        let (mut sim, thrower, target) = duel();
        sim.fire_with_velocity(thrower, Some(target), Point::new(60.0, -20.0))
            .unwrap();
        sim.set_energy(target, 0.0).unwrap();
        sim.advance(1_000).unwrap();
        assert_eq!(sim.events().count("impact"), 0);
        assert_eq!(sim.events().count("die"), 1);
    }

    #[test]
    fn launcher_validation() {
        let bad = LauncherConfig {
            damage: -1,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        assert!(LauncherConfig::default().validate().is_ok());
    }
}
