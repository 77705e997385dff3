//! Integration tests for the CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn battlefield() -> Command {
    Command::cargo_bin("battlefield").unwrap()
}

/// A shinobi beats a knight at close range while a bystander looks on.
fn small_scenario(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("small.json");
    fs::write(
        &path,
        r#"{
    "config": { "initial_food": false },
    "duration_ms": 2000,
    "combatants": [
        { "name": "Kage", "preset": "shinobi", "rect": { "x": 0, "y": 0, "width": 20, "height": 20 } },
        { "name": "Gawain", "preset": "knight", "rect": { "x": 40, "y": 0, "width": 20, "height": 20 } },
        { "name": "Bessie", "rect": { "x": 300, "y": 300 } }
    ],
    "script": [
        { "at_ms": 100, "actor": "Kage", "action": "attack", "target": "Gawain" },
        { "at_ms": 200, "actor": "Kage", "action": "attack", "target": "Gawain" }
    ]
}"#,
    )
    .unwrap();
    path
}

// ---------------------------------------------------------------------------
// presets
// ---------------------------------------------------------------------------

#[test]
fn presets_lists_every_preset() {
    battlefield()
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("warrior"))
        .stdout(predicate::str::contains("ninja"))
        .stdout(predicate::str::contains("shinobi"))
        .stdout(predicate::str::contains("knight"))
        .stdout(predicate::str::contains("320"));
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duel.json");

    battlefield()
        .arg("init")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created scenario"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["combatants"].as_array().unwrap().len(), 2);
    assert_eq!(json["combatants"][0]["name"], "Chika Fighter");
    assert_eq!(json["combatants"][1]["preset"], "knight");
}

#[test]
fn init_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duel.json");
    fs::write(&path, "keep me").unwrap();

    battlefield()
        .arg("init")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
}

// ---------------------------------------------------------------------------
// duel
// ---------------------------------------------------------------------------

#[test]
fn duel_runs_the_demo() {
    battlefield()
        .arg("duel")
        .assert()
        .success()
        .stdout(predicate::str::contains("Combatants"))
        .stdout(predicate::str::contains("Chika Fighter"))
        .stdout(predicate::str::contains("Sir Cane of Kamilot"))
        .stdout(predicate::str::contains("Notable Events"));
}

#[test]
fn duel_runs_an_initialized_scenario() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("duel.json");
    battlefield().arg("init").arg(&path).assert().success();

    battlefield()
        .args(["duel", "--duration-ms", "3000", "--scenario"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3000 ms"));
}

#[test]
fn duel_json_is_a_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = small_scenario(&dir);

    let output = battlefield()
        .args(["duel", "--json", "--scenario"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snapshot["at_ms"], 2000);
    let entities = snapshot["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 3);
    let knight = entities.iter().find(|e| e["name"] == "Gawain").unwrap();
    assert!(knight["energy"].as_i64().unwrap() < 100);
    let bystander = entities.iter().find(|e| e["name"] == "Bessie").unwrap();
    assert_eq!(bystander["energy"], 100);
}

#[test]
fn duel_is_deterministic_for_a_seed() {
    let run = || {
        battlefield()
            .args(["duel", "--json", "--seed", "7"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn duel_verbose_prints_full_log() {
    let dir = TempDir::new().unwrap();
    let path = small_scenario(&dir);

    battlefield()
        .args(["duel", "--verbose", "--scenario"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Event Log"))
        .stdout(predicate::str::contains("Kage hits Gawain"));
}

#[test]
fn duel_realtime_streams_events() {
    let dir = TempDir::new().unwrap();
    let path = small_scenario(&dir);

    battlefield()
        .args(["duel", "--realtime", "--duration-ms", "300", "--scenario"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("attacked"));
}

#[test]
fn duel_missing_scenario_fails() {
    battlefield()
        .args(["duel", "--scenario", "/nonexistent/duel.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: cannot load"));
}

#[test]
fn duel_unknown_actor_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(
        &path,
        r#"{ "script": [ { "at_ms": 0, "actor": "Nobody", "action": "wake" } ] }"#,
    )
    .unwrap();

    battlefield()
        .args(["duel", "--scenario"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid scenario"))
        .stderr(predicate::str::contains("Nobody"));
}

// ---------------------------------------------------------------------------
// throw
// ---------------------------------------------------------------------------

#[test]
fn throw_traces_to_rest() {
    battlefield()
        .args(["throw", "--vx", "30", "--vy", "-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Came to rest"))
        .stdout(predicate::str::contains("(30.0, -20.0)"));
}

#[test]
fn throw_with_drawn_velocity() {
    battlefield()
        .args(["throw", "--seed", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bounce(s)"));
}

#[test]
fn throw_outside_field_fails() {
    battlefield()
        .args(["throw", "--x", "5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside the field"));
}
