//! Energy, death, sleep, and reincarnation of entities.

use bf_core::{EnergyChange, EntityId, Food};
use tracing::{debug, info, warn};

use crate::context::{PendingWake, SimContext};
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::sprite;
use crate::system::{Task, sync_subscription};

/// Route every energy write through the entity's setter and turn the result
/// into events. Death stops motion and animation and cancels a pending wake.
pub(crate) fn set_energy(ctx: &mut SimContext<'_>, id: EntityId, value: f64) -> SimResult<EnergyChange> {
    let entity = ctx.world.entity_mut(id)?;
    let change = entity.set_energy(value);
    let name = entity.name.clone();

    match change {
        EnergyChange::Changed { from, to } => {
            debug!(entity = %id, from, to, "energy changed");
            ctx.emit(
                SimEventKind::EnergyChange {
                    entity: id,
                    energy: to,
                },
                format!("{name} energy {from} -> {to}"),
            );
        }
        EnergyChange::Died { from } => {
            ctx.emit(
                SimEventKind::EnergyChange {
                    entity: id,
                    energy: 0,
                },
                format!("{name} energy {from} -> 0"),
            );
            on_death(ctx, id, &name);
        }
        EnergyChange::Unchanged(_) | EnergyChange::Ignored => {}
    }
    Ok(change)
}

fn on_death(ctx: &mut SimContext<'_>, id: EntityId, name: &str) {
    halt_motion(ctx, id);
    sprite::halt(ctx, id);
    if let Some(pending) = ctx.bodies.wake_tasks.remove(&id) {
        ctx.clock.cancel(pending.handle);
    }
    info!(entity = %id, name, "died");
    ctx.emit(SimEventKind::Die { entity: id }, format!("{name} died"));
}

fn halt_motion(ctx: &mut SimContext<'_>, id: EntityId) {
    if let Some(walker) = ctx.bodies.walkers.get_mut(&id) {
        walker.stop_all();
        sync_subscription(ctx.clock, walker, Task::Walk(id));
    }
}

/// Fall asleep for `units` (0 counts as 1). Motion stops now, the energy
/// bonus is granted now, and a one-shot wake task is scheduled.
pub(crate) fn sleep(ctx: &mut SimContext<'_>, id: EntityId, units: u32) -> SimResult<bool> {
    let units = units.max(1);
    let entity = ctx.world.entity_mut(id)?;
    if !entity.begin_sleep() {
        return Ok(false);
    }
    let name = entity.name.clone();
    let energy = entity.energy();

    halt_motion(ctx, id);
    sprite::halt(ctx, id);

    let delay = u64::from(units).saturating_mul(ctx.config.sleep_ms_per_unit);
    let handle = ctx.clock.defer(Task::Wake(id), delay);
    ctx.bodies
        .wake_tasks
        .insert(id, PendingWake { handle, units });

    info!(entity = %id, units, delay_ms = delay, "fell asleep");
    ctx.emit(
        SimEventKind::Sleep { entity: id, units },
        format!("{name} sleeps for {units} unit(s)"),
    );

    let bonus = f64::from(units) * f64::from(ctx.config.sleep_energy_per_unit);
    set_energy(ctx, id, f64::from(energy) + bonus)?;
    Ok(true)
}

/// End a sleep early, cancelling the pending wake task.
pub(crate) fn wake(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<bool> {
    ctx.world.entity(id)?;
    let pending = ctx.bodies.wake_tasks.remove(&id);
    if let Some(pending) = pending {
        ctx.clock.cancel(pending.handle);
    }
    finish_sleep(ctx, id, pending.map_or(1, |p| p.units))
}

/// The scheduled wake-up fired.
pub(crate) fn on_wake_task(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let Some(pending) = ctx.bodies.wake_tasks.remove(&id) else {
        warn!(entity = %id, "wake task fired with no pending wake");
        return Ok(());
    };
    if ctx.world.get_entity(id).is_none() {
        warn!(entity = %id, "wake task fired for a removed entity");
        return Ok(());
    }
    finish_sleep(ctx, id, pending.units)?;
    Ok(())
}

fn finish_sleep(ctx: &mut SimContext<'_>, id: EntityId, units: u32) -> SimResult<bool> {
    let entity = ctx.world.entity_mut(id)?;
    if !entity.end_sleep() {
        return Ok(false);
    }
    let name = entity.name.clone();
    sprite::resume(ctx, id);
    info!(entity = %id, "woke up");
    ctx.emit(
        SimEventKind::ReadySleeping { entity: id },
        format!("{name} woke up after {units} unit(s)"),
    );
    Ok(true)
}

/// Bring a dead entity back at full energy.
pub(crate) fn reincarnate(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<bool> {
    let entity = ctx.world.entity_mut(id)?;
    if !entity.reincarnate() {
        return Ok(false);
    }
    let name = entity.name.clone();
    let energy = entity.energy();
    sprite::resume(ctx, id);
    info!(entity = %id, "reincarnated");
    ctx.emit(
        SimEventKind::Reincarnate { entity: id },
        format!("{name} reincarnated"),
    );
    ctx.emit(
        SimEventKind::EnergyChange { entity: id, energy },
        format!("{name} energy 0 -> {energy}"),
    );
    Ok(true)
}

/// Add the food's value to the entity's energy.
pub(crate) fn eat(ctx: &mut SimContext<'_>, id: EntityId, food: &Food) -> SimResult<EnergyChange> {
    let energy = ctx.world.entity(id)?.energy();
    set_energy(ctx, id, f64::from(energy) + f64::from(food.energy))
}
