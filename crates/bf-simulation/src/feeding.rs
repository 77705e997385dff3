use bf_core::{EntityId, Food, Placed, Point};
use rand::Rng;
use tracing::{debug, info};

use crate::context::SimContext;
use crate::error::SimResult;
use crate::event::SimEventKind;
use crate::lifecycle;
use crate::system::Task;

/// Eat the food if the entity is close enough. Runs after every walker
/// step; returns whether the food was consumed.
pub(crate) fn check(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<bool> {
    let entity = ctx.world.entity(id)?;
    if !entity.is_alive() {
        return Ok(false);
    }
    let Some(food) = ctx.world.food() else {
        return Ok(false);
    };
    let distance = entity.distance_to(food);
    if distance >= ctx.config.feeding_radius {
        return Ok(false);
    }

    let name = entity.name.clone();
    let Some(food) = ctx.world.take_food() else {
        return Ok(false);
    };
    lifecycle::eat(ctx, id, &food)?;
    info!(entity = %id, kind = %food.kind, value = food.energy, "ate");
    ctx.emit(
        SimEventKind::FoodConsumed {
            entity: id,
            kind: food.kind,
            value: food.energy,
        },
        format!("{name} ate the {} (+{})", food.kind, food.energy),
    );
    schedule_respawn(ctx);
    Ok(true)
}

/// Schedule a food spawn after a random delay, unless one is pending.
pub(crate) fn schedule_respawn(ctx: &mut SimContext<'_>) {
    if ctx.bodies.food_task.is_some() {
        return;
    }
    let [lo, hi] = ctx.config.food_respawn_ms;
    let delay = ctx.rng.random_range(lo..=hi);
    debug!(delay_ms = delay, "food respawn scheduled");
    ctx.bodies.food_task = Some(ctx.clock.defer(Task::SpawnFood, delay));
}

/// The spawn task fired: place an apple or a banana at a random spot.
pub(crate) fn on_spawn_task(ctx: &mut SimContext<'_>) -> SimResult<()> {
    ctx.bodies.food_task = None;
    if ctx.world.food().is_some() {
        return Ok(());
    }

    let margin = ctx.config.food_margin;
    let (max_x, max_y) = (
        ctx.config.field_width - margin,
        ctx.config.field_height - margin,
    );
    let x = random_coordinate(ctx, margin, max_x);
    let y = random_coordinate(ctx, margin, max_y);
    let at = Point::new(x, y);
    let food = if ctx.rng.random_bool(0.5) {
        Food::apple(at)
    } else {
        Food::banana(at)
    };

    let kind = food.kind;
    ctx.world.place_food(food);
    info!(%kind, x, y, "food spawned");
    ctx.emit(
        SimEventKind::FoodSpawned { kind, position: at },
        format!("a {kind} appeared at {at}"),
    );
    Ok(())
}

fn random_coordinate(ctx: &mut SimContext<'_>, lo: f64, hi: f64) -> f64 {
    let lo = lo.ceil() as i64;
    let hi = hi.floor() as i64;
    if lo >= hi {
        return lo as f64;
    }
    ctx.rng.random_range(lo..=hi) as f64
}

#[cfg(test)]
mod tests {
    use bf_core::{Entity, EntityKind, Rect};

    use super::*;
    use crate::config::SimConfig;
    use crate::motion::{Direction, MotionConfig};
    use crate::simulation::Simulation;

    fn walker_sim(config: SimConfig) -> (Simulation, EntityId) {
        let mut sim = Simulation::new(config).unwrap();
        let id = sim
            .add_entity(Entity::new(EntityKind::Human, "Hungry", Rect::new(0.0, 0.0, 20.0, 20.0)))
            .unwrap();
        let walk = MotionConfig {
            limits: bf_core::AxisLimits::new((0.0, 700.0), (0.0, 400.0)),
            speed: 200.0,
        };
        sim.attach_walker(id, walk).unwrap();
        (sim, id)
    }

    #[test]
    fn walking_into_food_eats_it() {
        let (mut sim, id) = walker_sim(SimConfig::default().with_initial_food(false));
        sim.set_energy(id, 95.0).unwrap();
        sim.place_food(Food::banana(Point::new(200.0, 0.0))).unwrap();

        sim.walk(id, Direction::Right, None).unwrap();
        sim.advance(1_000).unwrap();

        assert!(sim.world().food().is_none());
        assert_eq!(sim.world().entity(id).unwrap().energy(), 100);
        assert_eq!(sim.events().count("foodConsumed"), 1);
        assert!(sim.pending_food_spawn());
    }

    #[test]
    fn food_out_of_reach_stays() {
        let (mut sim, id) = walker_sim(SimConfig::default().with_initial_food(false));
        sim.place_food(Food::apple(Point::new(600.0, 300.0))).unwrap();
        sim.walk(id, Direction::Down, None).unwrap();
        sim.advance(200).unwrap();
        assert!(sim.world().food().is_some());
        assert_eq!(sim.events().count("foodConsumed"), 0);
    }

    #[test]
    fn respawn_lands_inside_margins_within_delay_range() {
        let config = SimConfig::default().with_seed(9).with_food_respawn(4_000, 10_000);
        let (mut sim, _) = walker_sim(config);
        assert!(sim.pending_food_spawn());
        sim.advance(3_999).unwrap();
        assert!(sim.world().food().is_none());
        sim.advance(6_001).unwrap();

        let food = sim.world().food().expect("food should have spawned");
        let at = food.rect().position();
        assert!((50.0..=710.0).contains(&at.x));
        assert!((50.0..=450.0).contains(&at.y));
        assert_eq!(at.x.fract(), 0.0);
        assert_eq!(sim.events().count("foodSpawned"), 1);
        assert!(!sim.pending_food_spawn());
    }

    #[test]
    fn eat_clamps_to_full() {
        let (mut sim, id) = walker_sim(SimConfig::default().with_initial_food(false));
        sim.set_energy(id, 92.0).unwrap();
        sim.eat(id, &Food::apple(Point::default())).unwrap();
        assert_eq!(sim.world().entity(id).unwrap().energy(), 100);
    }
}
