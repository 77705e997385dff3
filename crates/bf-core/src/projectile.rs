use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::geometry::{Placed, Point, Rect};

/// Identifier of a thrown projectile. Allocated sequentially by the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileId(pub u64);

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a projectile is in its short life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileStatus {
    /// Physics still running.
    Flying,
    /// Hit its target; waiting for removal.
    Impacted,
    /// Physics completed without a hit; waiting for removal.
    Settled,
}

/// A damage carrier thrown by a combatant.
///
/// `owner` and `target` are lookups into the world, never ownership: a
/// projectile does not keep either entity alive, and the target may die or
/// disappear while it is in the air.
#[derive(Debug, Clone, Serialize)]
pub struct Projectile {
    /// Identifier.
    pub id: ProjectileId,
    /// Who threw it.
    pub owner: EntityId,
    /// Who it may hit. Untargeted projectiles fly but never impact.
    pub target: Option<EntityId>,
    /// Energy removed from the target on impact.
    pub damage: i32,
    /// Current phase.
    pub status: ProjectileStatus,
    rect: Rect,
}

impl Projectile {
    /// A fresh in-flight projectile.
    pub fn new(
        id: ProjectileId,
        owner: EntityId,
        target: Option<EntityId>,
        damage: i32,
        rect: Rect,
    ) -> Self {
        Self {
            id,
            owner,
            target,
            damage,
            status: ProjectileStatus::Flying,
            rect,
        }
    }

    /// Move the projectile.
    pub fn set_position(&mut self, position: Point) {
        self.rect = self.rect.moved_to(position);
    }

    /// Still in the air.
    pub fn is_flying(&self) -> bool {
        self.status == ProjectileStatus::Flying
    }
}

impl Placed for Projectile {
    fn rect(&self) -> Rect {
        self.rect
    }
}
