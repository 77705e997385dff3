use bf_core::{CoreError, EntityId, ProjectileId};

/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors surfaced by the engine.
///
/// These are caller mistakes (unknown IDs, bad configuration). Simulation
/// outcomes such as an attack out of range are reported through return
/// values and events, never through this type.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The entity is not on the battlefield.
    #[error("entity not found in simulation: {0}")]
    EntityNotFound(EntityId),

    /// The projectile is not on the battlefield.
    #[error("projectile not found in simulation: {0}")]
    ProjectileNotFound(ProjectileId),

    /// A configuration value that cannot produce a working simulation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scenario document that refers to something that does not exist.
    #[error("scenario error: {0}")]
    Scenario(String),

    /// An error from the world model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A malformed scenario document.
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing a scenario file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
