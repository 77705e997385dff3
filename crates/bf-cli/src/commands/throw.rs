use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use bf_core::{Axis, Entity, Point, Rect, StatPreset};
use bf_simulation::{BodyRef, LauncherConfig, SimConfig, SimEventKind, Simulation};

/// Trajectory rows printed between launch and rest.
const SAMPLES: usize = 12;

pub fn run(vx: Option<f64>, vy: Option<f64>, x: f64, y: f64, seed: u64) -> Result<(), String> {
    let launcher = LauncherConfig::default();
    if !Axis::BOTH
        .iter()
        .all(|&axis| launcher.limits.get(axis).contains(Point::new(x, y).get(axis)))
    {
        return Err(format!("launch point ({x}, {y}) is outside the field"));
    }

    let config = SimConfig::default()
        .with_seed(seed)
        .with_initial_food(false);
    let mut sim = Simulation::new(config).map_err(|e| e.to_string())?;
    let thrower = sim
        .add_entity(Entity::warrior(
            "Thrower",
            Rect::new(x, y, 0.0, 0.0),
            StatPreset::Warrior,
        ))
        .map_err(|e| e.to_string())?;
    sim.attach_launcher(thrower, launcher)
        .map_err(|e| e.to_string())?;

    // A partial override keeps the other axis at rest.
    let fired = match (vx, vy) {
        (None, None) => sim.fire(thrower, None),
        _ => sim.fire_with_velocity(
            thrower,
            None,
            Point::new(vx.unwrap_or(0.0), vy.unwrap_or(0.0)),
        ),
    }
    .map_err(|e| format!("cannot throw: {e}"))?;
    let pid = fired.ok_or("the thrower cannot throw")?;

    let velocity = sim
        .flight(pid)
        .map(|f| f.velocity())
        .unwrap_or_default();

    while sim.world().projectile(pid).is_some_and(|p| p.is_flying()) {
        if sim
            .step()
            .map_err(|e| format!("simulation error: {e}"))?
            .is_none()
        {
            break;
        }
    }
    let flight = sim
        .flight(pid)
        .ok_or("projectile vanished before it settled")?;

    let path: Vec<(u64, Point)> = sim
        .events()
        .events()
        .iter()
        .filter_map(|e| match e.kind {
            SimEventKind::Step {
                body: BodyRef::Projectile(p),
                position,
            } if p == pid => Some((e.at_ms, position)),
            _ => None,
        })
        .collect();

    println!(
        "  {} from ({x}, {y}) at {}",
        "Throw".bold(),
        format!("({:.1}, {:.1})", velocity.x, velocity.y).cyan()
    );
    println!(
        "  Came to rest at {} after {} ms and {} bounce(s)",
        flight.position(),
        flight.elapsed_ms(),
        flight.bounces()
    );
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time (ms)", "x", "y"]);
    let stride = (path.len() / SAMPLES).max(1);
    for (i, (at, position)) in path.iter().enumerate() {
        if i % stride == 0 || i + 1 == path.len() {
            table.add_row(vec![
                at.to_string(),
                format!("{:.0}", position.x),
                format!("{:.0}", position.y),
            ]);
        }
    }
    println!("{table}");

    Ok(())
}
