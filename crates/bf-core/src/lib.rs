//! Core types for the battlefield: geometry, entities, food, projectiles, and the world model.
//!
//! This crate holds plain data and the setters that keep it consistent
//! (energy clamping, the die-once rule, the single coordinate writer). It has
//! no notion of time or events; the `bf-simulation` crate drives it.

/// Combatants and other creatures, their energy and lifecycle.
pub mod entity;
/// Error types used throughout the crate.
pub mod error;
/// Passive energy sources.
pub mod food;
/// Positions, extents, limits, and distance.
pub mod geometry;
/// Thrown damage carriers.
pub mod projectile;
/// Combat stats and presets.
pub mod stats;
/// The central world model that owns entities, food, and projectiles.
pub mod world;

/// Re-export core entity types.
pub use entity::{EnergyChange, Entity, EntityId, EntityKind, LifeState};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export food types.
pub use food::{Food, FoodKind};
/// Re-export geometry types.
pub use geometry::{Axis, AxisLimits, Limits, Placed, Point, Rect};
/// Re-export projectile types.
pub use projectile::{Projectile, ProjectileId, ProjectileStatus};
/// Re-export stat types.
pub use stats::{CombatantStats, StatPreset};
/// Re-export the world model.
pub use world::World;
