use std::fmt;

use bf_core::{Axis, AxisLimits, EntityId, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::TimerHandle;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::{BodyRef, SimEventKind};
use crate::feeding;
use crate::system::{Task, Ticked, sync_subscription};

/// Default walker tick interval (60 fps, rounded).
pub const DEFAULT_INTERVAL_MS: u64 = 17;

/// A movement command direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Negative x.
    Left,
    /// Positive x.
    Right,
    /// Negative y.
    Up,
    /// Positive y.
    Down,
}

impl Direction {
    /// The axis this direction moves along.
    pub fn axis(self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::X,
            Self::Up | Self::Down => Axis::Y,
        }
    }

    /// `-1.0` for left/up, `1.0` for right/down.
    pub fn sign(self) -> f64 {
        match self {
            Self::Left | Self::Up => -1.0,
            Self::Right | Self::Down => 1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(s)
    }
}

/// Walker settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Where the walker's top-left corner may go.
    pub limits: AxisLimits,
    /// Speed in px/s used when a command does not name one.
    pub speed: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            limits: AxisLimits::new((0.0, 100.0), (0.0, 100.0)),
            speed: 200.0,
        }
    }
}

impl MotionConfig {
    /// Reject inverted limits and unusable speeds.
    pub fn validate(&self) -> SimResult<()> {
        self.limits.validate()?;
        if !self.speed.is_finite() || self.speed < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "walk speed must be finite and >= 0, got {}",
                self.speed
            )));
        }
        Ok(())
    }
}

/// Result of one walker tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkStep {
    /// Position after the tick.
    pub position: Point,
    clamped: [bool; 2],
}

impl WalkStep {
    /// Whether the axis hit a limit during this tick.
    pub fn clamped(&self, axis: Axis) -> bool {
        self.clamped[axis_index(axis)]
    }
}

/// Two independent 1-D velocity integrators with position limits.
///
/// Diagonal movement is the sum of both axes, not a constant-speed vector.
/// Reaching a limit clamps the position and zeroes that axis's velocity.
#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    interval_ms: u64,
    position: Point,
    velocity: Point,
    last_ms: Option<u64>,
    subscription: Option<TimerHandle>,
}

impl MotionController {
    /// A resting walker. The starting position is clamped into the limits.
    pub fn new(config: MotionConfig, position: Point) -> SimResult<Self> {
        config.validate()?;
        let position = Point::new(
            config.limits.x.clamp(position.x),
            config.limits.y.clamp(position.y),
        );
        Ok(Self {
            config,
            interval_ms: DEFAULT_INTERVAL_MS,
            position,
            velocity: Point::default(),
            last_ms: None,
            subscription: None,
        })
    }

    /// Override the tick interval.
    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    /// Walker settings.
    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Current per-axis velocity in px/s.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Whether the axis has a non-zero velocity.
    pub fn is_moving(&self, axis: Axis) -> bool {
        self.velocity.get(axis) != 0.0
    }

    /// Set the axis velocity to `sign * speed` (configured speed when
    /// `None`). Returns whether the walker is now moving.
    pub fn start_axis(&mut self, axis: Axis, sign: f64, speed: Option<f64>, now_ms: u64) -> bool {
        let speed = speed.unwrap_or(self.config.speed).abs();
        if !speed.is_finite() {
            return self.is_running();
        }
        if !self.is_running() {
            self.last_ms = Some(now_ms);
        }
        *self.velocity.get_mut(axis) = if sign < 0.0 { -speed } else { speed };
        self.is_running()
    }

    /// [`MotionController::start_axis`] for a direction command.
    pub fn walk(&mut self, direction: Direction, speed: Option<f64>, now_ms: u64) -> bool {
        self.start_axis(direction.axis(), direction.sign(), speed, now_ms)
    }

    /// Zero one axis. Returns whether it was moving.
    pub fn stop_axis(&mut self, axis: Axis) -> bool {
        let was_moving = self.is_moving(axis);
        *self.velocity.get_mut(axis) = 0.0;
        if !self.is_running() {
            self.last_ms = None;
        }
        was_moving
    }

    /// Zero both axes. Returns whether anything was moving.
    pub fn stop_all(&mut self) -> bool {
        let x = self.stop_axis(Axis::X);
        let y = self.stop_axis(Axis::Y);
        x || y
    }

    /// Integrate both axes up to `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> WalkStep {
        let dt = now_ms.saturating_sub(self.last_ms.unwrap_or(now_ms)) as f64;
        self.last_ms = Some(now_ms);
        let mut clamped = [false; 2];

        for axis in Axis::BOTH {
            let v = self.velocity.get(axis);
            if v == 0.0 {
                continue;
            }
            let limits = self.config.limits.get(axis);
            let pos = self.position.get_mut(axis);
            *pos += (v * dt / 1000.0).round();
            if (v < 0.0 && *pos < limits.min) || (v > 0.0 && *pos > limits.max) {
                *pos = limits.clamp(*pos);
                *self.velocity.get_mut(axis) = 0.0;
                clamped[axis_index(axis)] = true;
                debug!(%axis, position = *pos, "walker reached limit");
            }
        }

        if !self.is_running() {
            self.last_ms = None;
        }
        WalkStep {
            position: self.position,
            clamped,
        }
    }
}

impl Ticked for MotionController {
    fn name(&self) -> &str {
        "walk"
    }

    fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    fn is_running(&self) -> bool {
        self.velocity.x != 0.0 || self.velocity.y != 0.0
    }

    fn subscription(&self) -> Option<TimerHandle> {
        self.subscription
    }

    fn set_subscription(&mut self, handle: Option<TimerHandle>) {
        self.subscription = handle;
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}

// ---------------------------------------------------------------------------
// Entity-facing operations
// ---------------------------------------------------------------------------

/// Start an axis for an entity. Ignored while Dead or Sleeping, and for
/// entities without a walker.
pub(crate) fn start_axis(
    ctx: &mut SimContext<'_>,
    id: EntityId,
    axis: Axis,
    sign: f64,
    speed: Option<f64>,
) -> SimResult<bool> {
    if !ctx.world.entity(id)?.can_act() {
        return Ok(false);
    }
    let now = ctx.now();
    let Some(walker) = ctx.bodies.walkers.get_mut(&id) else {
        return Ok(false);
    };
    let moving = walker.start_axis(axis, sign, speed, now);
    sync_subscription(ctx.clock, walker, Task::Walk(id));
    Ok(moving)
}

/// Stop one axis, or both when `axis` is `None`.
pub(crate) fn stop(ctx: &mut SimContext<'_>, id: EntityId, axis: Option<Axis>) -> SimResult<bool> {
    ctx.world.entity(id)?;
    let Some(walker) = ctx.bodies.walkers.get_mut(&id) else {
        return Ok(false);
    };
    let stopped = match axis {
        Some(axis) => walker.stop_axis(axis),
        None => walker.stop_all(),
    };
    sync_subscription(ctx.clock, walker, Task::Walk(id));
    Ok(stopped)
}

/// Walker tick: integrate, move the entity, emit `step`, then run the
/// feeding check against the new coordinates.
pub(crate) fn on_tick(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let now = ctx.now();
    let Some(walker) = ctx.bodies.walkers.get_mut(&id) else {
        warn!(entity = %id, "walk tick for an entity without a walker");
        return Ok(());
    };
    let step = walker.tick(now);
    sync_subscription(ctx.clock, walker, Task::Walk(id));

    let entity = ctx.world.entity_mut(id)?;
    entity.set_position(step.position);
    let description = format!("{} moved to {}", entity.name, step.position);
    ctx.emit(
        SimEventKind::Step {
            body: BodyRef::Entity(id),
            position: step.position,
        },
        description,
    );

    feeding::check(ctx, id)?;
    Ok(())
}
