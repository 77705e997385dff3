use bf_core::{Axis, AxisLimits, Point};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::TimerHandle;
use crate::error::{SimError, SimResult};
use crate::system::Ticked;

/// Default projectile tick interval (60 fps, rounded).
pub const DEFAULT_INTERVAL_MS: u64 = 17;

/// Initial speed on one axis: a fixed value, or an integer drawn uniformly
/// from an inclusive range. In JSON: `20` or `[25, 30]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpeedSpec {
    /// Always this speed.
    Fixed(f64),
    /// Drawn per throw. Endpoints may be given in either order.
    Range([f64; 2]),
}

impl SpeedSpec {
    /// Pick a speed.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Self::Fixed(v) => v,
            Self::Range([a, b]) => {
                let lo = a.min(b).ceil() as i64;
                let hi = a.max(b).floor() as i64;
                if lo > hi {
                    // No integer inside, e.g. [0.2, 0.7].
                    return a.min(b);
                }
                rng.random_range(lo..=hi) as f64
            }
        }
    }

    fn is_finite(&self) -> bool {
        match *self {
            Self::Fixed(v) => v.is_finite(),
            Self::Range([a, b]) => a.is_finite() && b.is_finite(),
        }
    }
}

/// Per-axis initial speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpeed {
    /// Horizontal.
    pub x: SpeedSpec,
    /// Vertical (positive is down).
    pub y: SpeedSpec,
}

impl AxisSpeed {
    /// Fixed speeds on both axes.
    pub const fn fixed(x: f64, y: f64) -> Self {
        Self {
            x: SpeedSpec::Fixed(x),
            y: SpeedSpec::Fixed(y),
        }
    }

    /// Ranged speeds on both axes.
    pub const fn ranged(x: [f64; 2], y: [f64; 2]) -> Self {
        Self {
            x: SpeedSpec::Range(x),
            y: SpeedSpec::Range(y),
        }
    }

    /// Draw a velocity.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(self.x.draw(rng), self.y.draw(rng))
    }
}

/// Gravity body settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravityConfig {
    /// Bounce boundaries.
    pub limits: AxisLimits,
    /// Initial velocity when none is supplied.
    pub speed: AxisSpeed,
    /// Acceleration per scaled time unit.
    pub accel: Point,
    /// Fraction of velocity kept, inverted, after hitting a boundary.
    pub bounce: Point,
    /// Velocity change below which the body counts as settled.
    pub min_speed: f64,
    /// Hard cap on flight time.
    pub duration_ms: u64,
    /// Milliseconds per integration time unit.
    pub time_scale: f64,
    /// Flight time before the settle check applies.
    pub warmup_ms: u64,
}

impl Default for GravityConfig {
    fn default() -> Self {
        Self {
            limits: AxisLimits::new((0.0, 760.0), (0.0, 500.0)),
            speed: AxisSpeed::fixed(20.0, 0.0),
            accel: Point::new(0.0, 9.81),
            bounce: Point::new(0.2, 0.6),
            min_speed: 0.5,
            duration_ms: 20_000,
            time_scale: 100.0,
            warmup_ms: 500,
        }
    }
}

impl GravityConfig {
    /// Reject settings that would make the body diverge or never settle.
    pub fn validate(&self) -> SimResult<()> {
        self.limits.validate()?;
        for axis in Axis::BOTH {
            let bounce = self.bounce.get(axis);
            if !(0.0..=1.0).contains(&bounce) {
                return Err(SimError::InvalidConfig(format!(
                    "bounce on {axis} axis must be within [0, 1], got {bounce}"
                )));
            }
            if !self.accel.get(axis).is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "acceleration on {axis} axis must be finite"
                )));
            }
        }
        if !(self.speed.x.is_finite() && self.speed.y.is_finite()) {
            return Err(SimError::InvalidConfig("initial speed must be finite".into()));
        }
        if !self.min_speed.is_finite() || self.min_speed < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "min_speed must be finite and >= 0, got {}",
                self.min_speed
            )));
        }
        if !self.time_scale.is_finite() || self.time_scale <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "time_scale must be > 0, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}

/// Result of one physics tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsStep {
    /// Position after the tick.
    pub position: Point,
    /// The body met its termination condition and stopped.
    pub settled: bool,
}

/// Accelerating body with per-axis boundary bounce and settle detection.
///
/// Terminates when flight time exceeds `duration_ms`, or once past the
/// warm-up when the velocity change of a tick falls below `min_speed`.
#[derive(Debug, Clone)]
pub struct ProjectilePhysics {
    config: GravityConfig,
    interval_ms: u64,
    position: Point,
    velocity: Point,
    delta: Point,
    started_ms: u64,
    last_ms: u64,
    elapsed_ms: u64,
    running: bool,
    bounces: u32,
    subscription: Option<TimerHandle>,
}

impl ProjectilePhysics {
    /// An idle body.
    pub fn new(config: GravityConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            interval_ms: DEFAULT_INTERVAL_MS,
            position: Point::default(),
            velocity: Point::default(),
            delta: Point::default(),
            started_ms: 0,
            last_ms: 0,
            elapsed_ms: 0,
            running: false,
            bounces: 0,
            subscription: None,
        })
    }

    /// Override the tick interval.
    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    /// Body settings.
    pub fn config(&self) -> &GravityConfig {
        &self.config
    }

    /// Draw an initial velocity from the configured speeds.
    pub fn draw_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        self.config.speed.draw(rng)
    }

    /// Launch from `origin` with `velocity`, resetting flight time.
    pub fn start(&mut self, origin: Point, velocity: Point, now_ms: u64) {
        self.position = origin;
        self.velocity = velocity;
        self.delta = Point::default();
        self.started_ms = now_ms;
        self.last_ms = now_ms;
        self.elapsed_ms = 0;
        self.bounces = 0;
        self.running = true;
    }

    /// Advance to `now_ms`: accelerate, move, then clamp and bounce.
    pub fn integrate(&mut self, now_ms: u64) -> Point {
        let dt = now_ms.saturating_sub(self.last_ms) as f64 / self.config.time_scale;
        self.last_ms = now_ms;
        self.elapsed_ms = now_ms.saturating_sub(self.started_ms);
        let before = self.velocity;

        for axis in Axis::BOTH {
            let limits = self.config.limits.get(axis);
            let accel = self.config.accel.get(axis);
            let bounce = self.config.bounce.get(axis);

            let v = self.velocity.get_mut(axis);
            *v += accel * dt;
            let p = self.position.get_mut(axis);
            *p += *v * dt;

            if *p < limits.min || *p > limits.max {
                *p = limits.clamp(*p);
                *v *= -bounce;
                self.bounces += 1;
                debug!(%axis, position = *p, velocity = *v, "projectile bounced");
            }
        }

        self.delta = Point::new(self.velocity.x - before.x, self.velocity.y - before.y);
        self.position
    }

    /// Whether the termination condition holds after the last integration.
    pub fn is_settled(&self) -> bool {
        self.elapsed_ms > self.config.duration_ms
            || (self.elapsed_ms > self.config.warmup_ms && self.delta.length() < self.config.min_speed)
    }

    /// Integrate, then stop if settled.
    pub fn tick(&mut self, now_ms: u64) -> PhysicsStep {
        let position = self.integrate(now_ms);
        let settled = self.is_settled();
        if settled {
            self.stop();
        }
        PhysicsStep { position, settled }
    }

    /// Halt the body. Idempotent; returns whether it was running.
    pub fn stop(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// Current position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Current velocity.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Flight time at the last integration.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Boundary contacts since launch.
    pub fn bounces(&self) -> u32 {
        self.bounces
    }
}

impl Ticked for ProjectilePhysics {
    fn name(&self) -> &str {
        "gravity"
    }

    fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn subscription(&self) -> Option<TimerHandle> {
        self.subscription
    }

    fn set_subscription(&mut self, handle: Option<TimerHandle>) {
        self.subscription = handle;
    }
}
