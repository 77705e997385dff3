use crate::entity::EntityId;
use crate::geometry::Axis;
use crate::projectile::ProjectileId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or manipulating a battlefield world.
///
/// Runtime simulation conditions (attacking a dead target, walking into a
/// wall) are never errors; these variants describe caller mistakes and
/// misconfigured objects.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The requested entity ID does not exist in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The requested projectile ID does not exist in the world.
    #[error("projectile not found: {0}")]
    ProjectileNotFound(ProjectileId),

    /// An entity with the same name already exists.
    #[error("entity already exists: \"{0}\"")]
    DuplicateName(String),

    /// A rectangle with a negative or non-finite extent.
    #[error("invalid extent: {width} x {height}")]
    InvalidExtent {
        /// The offending width.
        width: f64,
        /// The offending height.
        height: f64,
    },

    /// Food with a negative energy value.
    #[error("invalid food: {0}")]
    InvalidFood(String),

    /// Combat stats that would break the damage formula.
    #[error("invalid combatant stats: {0}")]
    InvalidStats(String),

    /// A `[min, max]` range where `min > max` or a bound is not finite.
    #[error("invalid limits on {axis} axis: [{min}, {max}]")]
    InvalidLimits {
        /// The axis the limits apply to.
        axis: Axis,
        /// The lower bound.
        min: f64,
        /// The upper bound.
        max: f64,
    },
}
