//! Virtual-time battlefield engine.
//!
//! Drives a [`bf_core::World`] through a deterministic [`Clock`]: walkers,
//! sprite animations, and projectile flights subscribe to the clock while
//! they run, and one-shot tasks handle wake-ups, food respawns, and
//! projectile removal. Per-body runtime state lives in [`context::Bodies`],
//! keeping bf-core free of scheduling concerns. Every observable change is
//! recorded in the [`EventLog`].

/// Deterministic virtual-time scheduler.
pub mod clock;
/// Melee damage and attack resolution.
pub mod combat;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable context passed to the engine's handlers.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Simulation event types and the event log.
pub mod event;
/// Proximity feeding and food respawn.
pub mod feeding;
/// Energy, death, sleep, and reincarnation.
pub mod lifecycle;
/// Constant-velocity walking with per-axis clamping.
pub mod motion;
/// Gravity, bouncing, and settling of thrown projectiles.
pub mod physics;
/// Firing projectiles and resolving their impacts.
pub mod projectile;
/// JSON battle descriptions and scripted command timelines.
pub mod scenario;
/// Top-level simulation orchestrator.
pub mod simulation;
/// Sprite-sheet frame animation.
pub mod sprite;
/// Clock tasks and the subscription trait for ticking bodies.
pub mod system;

pub use clock::{Clock, Fired, TimerHandle};
pub use combat::{AttackOutcome, damage};
pub use config::SimConfig;
pub use context::SimContext;
pub use error::{SimError, SimResult};
pub use event::{BodyRef, EventLog, SimEvent, SimEventKind};
pub use motion::{Direction, MotionConfig, MotionController};
pub use physics::{AxisSpeed, GravityConfig, ProjectilePhysics, SpeedSpec};
pub use projectile::LauncherConfig;
pub use scenario::{Action, Battle, CombatantSpec, Scenario, ScriptedCommand};
pub use simulation::{EntitySnapshot, Simulation, Snapshot};
pub use sprite::{SpriteAnimation, SpriteConfig};
pub use system::{Task, Ticked};
