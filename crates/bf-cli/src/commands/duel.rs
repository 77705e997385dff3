use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use bf_core::{LifeState, Placed};
use bf_simulation::{Battle, Scenario, SimEventKind, Simulation};

use super::{format_energy_bar, format_event};

pub struct DuelOptions {
    pub scenario: Option<PathBuf>,
    pub duration_ms: Option<u64>,
    pub seed: Option<u64>,
    pub verbose: bool,
    pub json: bool,
    pub realtime: bool,
}

/// Wall-clock frame length for `--realtime`.
const FRAME_MS: u64 = 50;

pub fn run(opts: DuelOptions) -> Result<(), String> {
    let mut scenario = match &opts.scenario {
        Some(path) => Scenario::load(path)
            .map_err(|e| format!("cannot load {}: {e}", path.display()))?,
        None => Scenario::demo(),
    };
    if let Some(seed) = opts.seed {
        scenario.config.seed = seed;
    }
    if let Some(duration) = opts.duration_ms {
        scenario.duration_ms = duration;
    }

    let mut battle = scenario.build().map_err(|e| format!("invalid scenario: {e}"))?;
    let duration = battle.duration_ms();

    if opts.realtime {
        run_realtime(&mut battle, duration, opts.verbose)?;
    } else {
        battle
            .run_until(duration)
            .map_err(|e| format!("simulation error: {e}"))?;
    }
    let sim = battle.into_simulation();

    if opts.json {
        let json = serde_json::to_string_pretty(&sim.snapshot())
            .map_err(|e| format!("cannot serialize snapshot: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "  {} {}",
        "Duel".bold(),
        format!(
            "({duration} ms, seed={}, {} events)",
            sim.config().seed,
            sim.events().total()
        )
        .dimmed()
    );
    println!();

    if !opts.realtime {
        print_events(&sim, opts.verbose);
    }
    print_status(&sim);
    Ok(())
}

fn run_realtime(battle: &mut Battle, duration: u64, verbose: bool) -> Result<(), String> {
    let runtime =
        tokio::runtime::Runtime::new().map_err(|e| format!("cannot start runtime: {e}"))?;
    runtime.block_on(async {
        let mut interval = tokio::time::interval(Duration::from_millis(FRAME_MS));
        let mut seen = 0;
        let mut now = 0;
        while now < duration {
            interval.tick().await;
            now = (now + FRAME_MS).min(duration);
            battle
                .run_until(now)
                .map_err(|e| format!("simulation error: {e}"))?;

            let events = battle.simulation().events();
            for event in events.since(seen) {
                if verbose || !event.kind.is_periodic() {
                    println!("  {}", format_event(event));
                }
            }
            seen = events.total();
        }
        println!();
        Ok::<(), String>(())
    })
}

fn print_events(sim: &Simulation, verbose: bool) {
    let events = sim.events().events();
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in events {
            println!("  {}", format_event(event));
        }
        if events.is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
        return;
    }

    let notable: Vec<_> = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                SimEventKind::Attacked { .. }
                    | SimEventKind::Impact { .. }
                    | SimEventKind::Die { .. }
                    | SimEventKind::Reincarnate { .. }
                    | SimEventKind::Sleep { .. }
                    | SimEventKind::ReadySleeping { .. }
                    | SimEventKind::FoodConsumed { .. }
            )
        })
        .collect();
    if !notable.is_empty() {
        println!("  {}", "Notable Events".bold().underline());
        println!();
        for event in notable {
            println!("  {}", format_event(event));
        }
        println!();
    }
}

fn print_status(sim: &Simulation) {
    println!("  {}", "Combatants".bold().underline());
    println!();

    let snapshot = sim.snapshot();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Preset", "Energy", "State", "Position"]);
    for entity in &snapshot.entities {
        let state = match entity.state {
            LifeState::Alive => "alive".green().to_string(),
            LifeState::Sleeping => "sleeping".blue().to_string(),
            LifeState::Dead => "dead".red().bold().to_string(),
        };
        table.add_row(vec![
            entity.name.clone(),
            entity
                .preset
                .map_or_else(|| entity.kind.to_string(), |p| p.to_string()),
            format_energy_bar(entity.energy),
            state,
            entity.rect.position().to_string(),
        ]);
    }
    println!("{table}");
    println!();

    if let Some(food) = &snapshot.food {
        println!(
            "  {} {} at {}",
            "Food".bold(),
            food.kind,
            food.rect().position()
        );
    }
    if !snapshot.projectiles.is_empty() {
        println!(
            "  {} {} in play",
            "Projectiles".bold(),
            snapshot.projectiles.len()
        );
    }
}
