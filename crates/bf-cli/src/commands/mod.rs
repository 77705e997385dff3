pub mod duel;
pub mod init;
pub mod presets;
pub mod throw;

use colored::Colorize;

use bf_simulation::{SimEvent, SimEventKind};

/// One event line, colored by what happened.
fn format_event(event: &SimEvent) -> String {
    let stamp = format!("[{:>6} ms]", event.at_ms).dimmed();
    let desc = match event.kind {
        SimEventKind::Die { .. } => event.description.red().bold(),
        SimEventKind::Reincarnate { .. } => event.description.green().bold(),
        SimEventKind::Attacked { .. } | SimEventKind::Impact { .. } => event.description.yellow(),
        SimEventKind::Sleep { .. } | SimEventKind::ReadySleeping { .. } => {
            event.description.blue()
        }
        SimEventKind::FoodSpawned { .. } | SimEventKind::FoodConsumed { .. } => {
            event.description.green()
        }
        SimEventKind::ProjectileFired { .. } | SimEventKind::Complete { .. } => {
            event.description.cyan()
        }
        _ => event.description.normal(),
    };
    format!("{stamp} {:<13} {desc}", event.kind.label())
}

fn format_energy_bar(energy: i32) -> String {
    let filled = (energy.clamp(0, 100) / 10) as usize;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(10 - filled));

    if energy <= 15 {
        format!("[{}] {:>3}", bar.red(), energy)
    } else if energy <= 40 {
        format!("[{}] {:>3}", bar.yellow(), energy)
    } else {
        format!("[{}] {:>3}", bar.green(), energy)
    }
}
