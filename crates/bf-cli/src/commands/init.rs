use std::fs;
use std::path::Path;

use bf_simulation::Scenario;

pub fn run(file: &Path) -> Result<(), String> {
    if file.exists() {
        return Err(format!("'{}' already exists", file.display()));
    }

    let json = Scenario::demo()
        .to_json()
        .map_err(|e| format!("cannot serialize scenario: {e}"))?;
    fs::write(file, json + "\n").map_err(|e| format!("cannot write {}: {e}", file.display()))?;

    println!("Created scenario {}", file.display());
    println!();
    println!("Get started:");
    println!("  # Edit the combatants and script, then run it");
    println!("  battlefield duel --scenario {}", file.display());

    Ok(())
}
