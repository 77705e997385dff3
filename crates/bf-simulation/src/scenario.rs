use std::collections::VecDeque;
use std::fmt;
use std::path::Path;

use bf_core::{Axis, AxisLimits, CombatantStats, Entity, EntityId, EntityKind, Food, Rect, StatPreset};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::motion::{Direction, MotionConfig};
use crate::physics::AxisSpeed;
use crate::projectile::LauncherConfig;
use crate::simulation::Simulation;
use crate::sprite::SpriteConfig;

fn default_duration() -> u64 {
    12_000
}

fn one() -> u32 {
    1
}

/// A battle description: field settings, combatants, and a command timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Run settings.
    #[serde(default)]
    pub config: SimConfig,
    /// How long to run.
    #[serde(default = "default_duration")]
    pub duration_ms: u64,
    /// Who is on the field.
    #[serde(default)]
    pub combatants: Vec<CombatantSpec>,
    /// Food present at the start.
    #[serde(default)]
    pub food: Option<Food>,
    /// Commands, applied in timestamp order.
    #[serde(default)]
    pub script: Vec<ScriptedCommand>,
}

/// One entity and its capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSpec {
    /// Unique display name, used by the script.
    pub name: String,
    /// Stat preset. Ignored when `stats` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<StatPreset>,
    /// Explicit stats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CombatantStats>,
    /// Starting position and extent.
    pub rect: Rect,
    /// Movable capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walk: Option<MotionConfig>,
    /// Animated capability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<SpriteConfig>,
    /// Projectile launcher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub launcher: Option<LauncherConfig>,
}

impl CombatantSpec {
    fn entity(&self) -> Entity {
        match (self.stats, self.preset) {
            (Some(stats), _) => Entity::with_stats(&self.name, self.rect, stats),
            (None, Some(preset)) => Entity::warrior(&self.name, self.rect, preset),
            (None, None) => Entity::new(EntityKind::Human, &self.name, self.rect),
        }
    }
}

/// A command issued at a point in virtual time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedCommand {
    /// When to issue it.
    pub at_ms: u64,
    /// Who acts.
    pub actor: String,
    /// What they do.
    #[serde(flatten)]
    pub action: Action,
}

impl ScriptedCommand {
    /// A command at `at_ms` for `actor`.
    pub fn new(at_ms: u64, actor: impl Into<String>, action: Action) -> Self {
        Self {
            at_ms,
            actor: actor.into(),
            action,
        }
    }
}

/// A scripted action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Start walking.
    Walk {
        /// Which way.
        direction: Direction,
        /// Speed override in px/s.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        speed: Option<f64>,
    },
    /// Stop one axis, or both.
    Stop {
        /// The axis; both when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        axis: Option<Axis>,
    },
    /// Melee attack.
    Attack {
        /// Defender name.
        target: String,
    },
    /// Throw a projectile.
    Fire {
        /// Target name; untargeted when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<String>,
    },
    /// Fall asleep.
    Sleep {
        /// Sleep units.
        #[serde(default = "one")]
        units: u32,
    },
    /// End a sleep early.
    Wake,
    /// Come back from the dead.
    Reincarnate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk { direction, .. } => write!(f, "walk {direction}"),
            Self::Stop { axis: Some(axis) } => write!(f, "stop {axis}"),
            Self::Stop { axis: None } => write!(f, "stop"),
            Self::Attack { target } => write!(f, "attack {target}"),
            Self::Fire { target: Some(t) } => write!(f, "fire at {t}"),
            Self::Fire { target: None } => write!(f, "fire"),
            Self::Sleep { units } => write!(f, "sleep {units}"),
            Self::Wake => write!(f, "wake"),
            Self::Reincarnate => write!(f, "reincarnate"),
        }
    }
}

impl Scenario {
    /// Parse a scenario document.
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a scenario file.
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Pretty JSON for writing to disk.
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The ninja-versus-knight duel.
    pub fn demo() -> Self {
        use Action::*;

        let ninja = "Chika Fighter";
        let knight = "Sir Cane of Kamilot";
        let attack = |target: &str| Attack {
            target: target.to_string(),
        };
        let fire = |target: &str| Fire {
            target: Some(target.to_string()),
        };

        Self {
            config: SimConfig::default(),
            duration_ms: default_duration(),
            combatants: vec![
                CombatantSpec {
                    name: ninja.into(),
                    preset: Some(StatPreset::Ninja),
                    stats: None,
                    rect: Rect::new(0.0, 150.0, 200.0, 300.0),
                    walk: Some(MotionConfig {
                        limits: AxisLimits::new((-60.0, 600.0), (-30.0, 210.0)),
                        ..Default::default()
                    }),
                    sprite: Some(SpriteConfig {
                        width: 2_800.0,
                        height: 300.0,
                        frames: 14,
                        ..Default::default()
                    }),
                    launcher: Some(LauncherConfig {
                        speed: AxisSpeed::ranged([45.0, 50.0], [-20.0, -30.0]),
                        ..Default::default()
                    }),
                },
                CombatantSpec {
                    name: knight.into(),
                    preset: Some(StatPreset::Knight),
                    stats: None,
                    rect: Rect::new(560.0, 200.0, 125.0, 250.0),
                    walk: Some(MotionConfig {
                        limits: AxisLimits::new((-20.0, 670.0), (-10.0, 270.0)),
                        ..Default::default()
                    }),
                    sprite: Some(SpriteConfig {
                        width: 1_750.0,
                        height: 250.0,
                        frames: 14,
                        ..Default::default()
                    }),
                    launcher: Some(LauncherConfig {
                        speed: AxisSpeed::ranged([-40.0, -45.0], [-25.0, -30.0]),
                        ..Default::default()
                    }),
                },
            ],
            food: None,
            script: vec![
                ScriptedCommand::new(0, ninja, Walk { direction: Direction::Right, speed: None }),
                ScriptedCommand::new(1_500, ninja, Stop { axis: None }),
                ScriptedCommand::new(1_500, ninja, attack(knight)),
                ScriptedCommand::new(1_600, knight, fire(ninja)),
                ScriptedCommand::new(2_000, knight, Walk { direction: Direction::Left, speed: None }),
                ScriptedCommand::new(3_000, knight, Stop { axis: Some(Axis::X) }),
                ScriptedCommand::new(3_000, knight, attack(ninja)),
                ScriptedCommand::new(3_200, ninja, attack(knight)),
                ScriptedCommand::new(3_500, ninja, fire(knight)),
                ScriptedCommand::new(4_000, ninja, Sleep { units: 1 }),
                ScriptedCommand::new(5_000, knight, attack(ninja)),
                ScriptedCommand::new(5_500, knight, attack(ninja)),
                ScriptedCommand::new(6_000, knight, attack(ninja)),
                ScriptedCommand::new(6_500, knight, attack(ninja)),
                ScriptedCommand::new(7_000, knight, attack(ninja)),
                ScriptedCommand::new(8_000, ninja, Reincarnate),
                ScriptedCommand::new(9_000, ninja, Walk { direction: Direction::Up, speed: None }),
                ScriptedCommand::new(9_500, ninja, Stop { axis: Some(Axis::Y) }),
                ScriptedCommand::new(10_000, knight, Sleep { units: 2 }),
            ],
        }
    }

    /// Build the simulation and queue the script. Every name the script uses
    /// must belong to a combatant.
    pub fn build(&self) -> SimResult<Battle> {
        let mut sim = Simulation::new(self.config.clone())?;
        for spec in &self.combatants {
            let id = sim.add_entity(spec.entity())?;
            if let Some(walk) = spec.walk {
                sim.attach_walker(id, walk)?;
            }
            if let Some(sprite) = spec.sprite {
                sim.attach_sprite(id, sprite)?;
            }
            if let Some(launcher) = spec.launcher {
                sim.attach_launcher(id, launcher)?;
            }
        }
        if let Some(food) = &self.food {
            sim.place_food(food.clone())?;
        }

        let mut script = self.script.clone();
        // Stable: commands at the same instant keep file order.
        script.sort_by_key(|c| c.at_ms);
        for command in &script {
            lookup(&sim, &command.actor)?;
            match &command.action {
                Action::Attack { target } | Action::Fire { target: Some(target) } => {
                    lookup(&sim, target)?;
                }
                _ => {}
            }
        }

        Ok(Battle {
            sim,
            script: script.into(),
            duration_ms: self.duration_ms,
        })
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::demo()
    }
}

fn lookup(sim: &Simulation, name: &str) -> SimResult<EntityId> {
    sim.world()
        .find_id_by_name(name)
        .ok_or_else(|| SimError::Scenario(format!("unknown combatant {name:?}")))
}

/// A simulation with a pending command timeline.
#[derive(Debug)]
pub struct Battle {
    sim: Simulation,
    script: VecDeque<ScriptedCommand>,
    duration_ms: u64,
}

impl Battle {
    /// The simulation being driven.
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Take the simulation, dropping any unapplied commands.
    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    /// Scenario run time.
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Commands not yet applied.
    pub fn remaining_commands(&self) -> usize {
        self.script.len()
    }

    /// Advance to `t_ms`, applying each scripted command once the clock
    /// reaches its timestamp. Returns the number of commands applied.
    pub fn run_until(&mut self, t_ms: u64) -> SimResult<usize> {
        let mut applied = 0;
        while self.script.front().is_some_and(|c| c.at_ms <= t_ms) {
            let Some(command) = self.script.pop_front() else {
                break;
            };
            self.sim.run_until(command.at_ms)?;
            self.apply(&command)?;
            applied += 1;
        }
        self.sim.run_until(t_ms)?;
        Ok(applied)
    }

    /// Run the whole scenario.
    pub fn run(&mut self) -> SimResult<usize> {
        self.run_until(self.duration_ms)
    }

    fn apply(&mut self, command: &ScriptedCommand) -> SimResult<()> {
        let actor = lookup(&self.sim, &command.actor)?;
        debug!(at_ms = command.at_ms, actor = %command.actor, action = %command.action, "command");
        match &command.action {
            Action::Walk { direction, speed } => {
                self.sim.walk(actor, *direction, *speed)?;
            }
            Action::Stop { axis: Some(axis) } => {
                self.sim.stop_axis(actor, *axis)?;
            }
            Action::Stop { axis: None } => {
                self.sim.stop_all(actor)?;
            }
            Action::Attack { target } => {
                let target = lookup(&self.sim, target)?;
                self.sim.attack(actor, target)?;
            }
            Action::Fire { target } => {
                let target = target
                    .as_deref()
                    .map(|name| lookup(&self.sim, name))
                    .transpose()?;
                self.sim.fire(actor, target)?;
            }
            Action::Sleep { units } => {
                self.sim.sleep(actor, *units)?;
            }
            Action::Wake => {
                self.sim.wake(actor)?;
            }
            Action::Reincarnate => {
                self.sim.reincarnate(actor)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bf_core::LifeState;

    use super::*;

    #[test]
    fn demo_runs_to_completion() {
        let mut battle = Scenario::demo().build().unwrap();
        let applied = battle.run().unwrap();
        assert_eq!(applied, Scenario::demo().script.len());
        assert_eq!(battle.remaining_commands(), 0);

        let sim = battle.simulation();
        assert_eq!(sim.now(), 12_000);
        assert_eq!(sim.world().entity_count(), 2);
        for entity in sim.world().entities() {
            assert!((0..=100).contains(&entity.energy()));
        }
        assert!(sim.events().count("attacked") >= 3);
        assert!(sim.events().count("fire") >= 1);
    }

    #[test]
    fn demo_is_deterministic() {
        let run = || {
            let mut battle = Scenario::demo().build().unwrap();
            battle.run().unwrap();
            let sim = battle.into_simulation();
            sim.world()
                .entities()
                .map(|e| (e.name.clone(), e.energy(), e.position()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ninja_is_beaten_then_reincarnated() {
        let mut battle = Scenario::demo().build().unwrap();
        battle.run_until(7_999).unwrap();
        let ninja = battle
            .simulation()
            .world()
            .find_by_name("chika fighter")
            .unwrap();
        assert_eq!(ninja.life_state(), LifeState::Dead);

        battle.run_until(8_000).unwrap();
        let ninja = battle
            .simulation()
            .world()
            .find_by_name("Chika Fighter")
            .unwrap();
        assert_eq!(ninja.energy(), 100);
    }

    #[test]
    fn commands_apply_at_their_timestamps() {
        let mut battle = Scenario::demo().build().unwrap();
        assert_eq!(battle.run_until(1_499).unwrap(), 1);
        assert_eq!(battle.run_until(1_500).unwrap(), 2);
        assert_eq!(battle.simulation().now(), 1_500);
    }

    #[test]
    fn unknown_names_fail_at_build() {
        let mut scenario = Scenario::demo();
        scenario
            .script
            .push(ScriptedCommand::new(100, "Nobody", Action::Wake));
        assert!(matches!(scenario.build(), Err(SimError::Scenario(_))));

        let mut scenario = Scenario::demo();
        scenario.script.push(ScriptedCommand::new(
            100,
            "Chika Fighter",
            Action::Attack {
                target: "Ghost".into(),
            },
        ));
        assert!(matches!(scenario.build(), Err(SimError::Scenario(_))));
    }

    #[test]
    fn invalid_food_fails_at_build() {
        let json = r#"{
            "food": { "kind": "other", "energy": -500, "rect": { "x": 0, "y": 0, "width": -40, "height": 10 } }
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert!(matches!(
            scenario.build(),
            Err(SimError::Core(bf_core::CoreError::InvalidExtent { .. }))
        ));

        let json = r#"{
            "food": { "kind": "other", "energy": -500, "rect": { "x": 0, "y": 0, "width": 40, "height": 10 } }
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert!(matches!(
            scenario.build(),
            Err(SimError::Core(bf_core::CoreError::InvalidFood(_)))
        ));
    }

    #[test]
    fn huge_sleep_delay_fails_at_build() {
        let json = format!(
            r#"{{
                "config": {{ "sleep_ms_per_unit": {} }},
                "combatants": [ {{ "name": "A", "rect": {{ "x": 0, "y": 0 }} }} ],
                "script": [ {{ "at_ms": 10, "actor": "A", "action": "sleep" }} ]
            }}"#,
            u64::MAX
        );
        let scenario = Scenario::from_json(&json).unwrap();
        assert!(matches!(scenario.build(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn parses_minimal_document() {
        let json = r#"{
            "combatants": [
                { "name": "A", "preset": "shinobi", "rect": { "x": 0, "y": 0, "width": 10, "height": 10 } },
                { "name": "B", "rect": { "x": 50, "y": 0 } }
            ],
            "script": [
                { "at_ms": 10, "actor": "A", "action": "attack", "target": "B" },
                { "at_ms": 5, "actor": "A", "action": "sleep" },
                { "at_ms": 20, "actor": "A", "action": "wake" }
            ]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.duration_ms, 12_000);
        assert_eq!(scenario.config, SimConfig::default());
        assert_eq!(scenario.script[1].action, Action::Sleep { units: 1 });

        let mut battle = scenario.build().unwrap();
        battle.run_until(100).unwrap();
        let sim = battle.simulation();
        // B is not a combatant, so the attack does nothing.
        assert_eq!(sim.events().count("attacked"), 0);
        assert_eq!(sim.events().count("readySleeping"), 1);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            Scenario::from_json("{ \"combatants\": 3 }"),
            Err(SimError::Json(_))
        ));
    }

    #[test]
    fn demo_survives_json() {
        let json = Scenario::demo().to_json().unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap(), Scenario::demo());
    }

    #[test]
    fn action_display() {
        let action = Action::Fire {
            target: Some("Sir Cane of Kamilot".into()),
        };
        insta::assert_snapshot!(action.to_string(), @"fire at Sir Cane of Kamilot");
        insta::assert_snapshot!(Action::Stop { axis: Some(Axis::Y) }.to_string(), @"stop y");
    }
}
