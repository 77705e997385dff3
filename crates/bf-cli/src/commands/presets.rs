use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use bf_core::StatPreset;
use bf_simulation::damage;

/// Reference distance for the damage column.
const SAMPLE_DISTANCE: f64 = 100.0;

pub fn run() -> Result<(), String> {
    println!("  {}", "Stat Presets".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Preset".to_string(),
        "Power".to_string(),
        "Armor".to_string(),
        "Range".to_string(),
        format!("Hit vs knight @{SAMPLE_DISTANCE:.0}px"),
    ]);

    let knight = StatPreset::Knight.stats();
    for preset in StatPreset::ALL {
        let stats = preset.stats();
        let hit = damage(stats.power, 100.0, knight.armor, SAMPLE_DISTANCE);
        table.add_row(vec![
            preset.to_string(),
            format!("{:.0}", stats.power),
            format!("{:.0}", stats.armor),
            format!("{:.0}", stats.attack_range),
            format!("{hit:.1}"),
        ]);
    }
    println!("{table}");

    Ok(())
}
