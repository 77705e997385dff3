use bf_core::EntityId;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::TimerHandle;
use crate::context::SimContext;
use crate::error::{SimError, SimResult};
use crate::event::SimEventKind;
use crate::system::{Task, Ticked, sync_subscription};

/// Sprite sheet animation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteConfig {
    /// Frames per second.
    pub fps: u32,
    /// Frames in the sheet.
    pub frames: u32,
    /// Sheet width in pixels.
    pub width: f64,
    /// Sheet height in pixels.
    pub height: f64,
    /// Wrap to the first frame instead of stopping.
    pub looping: bool,
    /// Horizontal distance between frames. Defaults to `width / frames`.
    pub frame_step: Option<f64>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            fps: 10,
            frames: 4,
            width: 40.0,
            height: 40.0,
            looping: true,
            frame_step: None,
        }
    }
}

impl SpriteConfig {
    /// Pixel distance between frames.
    pub fn frame_step(&self) -> f64 {
        self.frame_step
            .unwrap_or(self.width / f64::from(self.frames.max(1)))
    }
}

/// Outcome of one animation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteStep {
    /// Frame shown after the step.
    pub frame: u32,
    /// Pixel offset of that frame.
    pub offset: f64,
    /// A looping sheet wrapped around.
    pub iterated: bool,
    /// A non-looping sheet ran out and stopped.
    pub finished: bool,
}

/// Frame stepper for a sprite sheet. Rendering is left to whoever reads the
/// `frame` events.
#[derive(Debug, Clone)]
pub struct SpriteAnimation {
    config: SpriteConfig,
    frame: u32,
    running: bool,
    subscription: Option<TimerHandle>,
}

impl SpriteAnimation {
    /// A paused animation at frame 0.
    pub fn new(config: SpriteConfig) -> SimResult<Self> {
        if config.fps == 0 || config.frames == 0 {
            return Err(SimError::InvalidConfig(format!(
                "sprite needs fps > 0 and frames > 0, got fps={} frames={}",
                config.fps, config.frames
            )));
        }
        if !config.frame_step().is_finite() {
            return Err(SimError::InvalidConfig("sprite frame step must be finite".into()));
        }
        Ok(Self {
            config,
            frame: 0,
            running: false,
            subscription: None,
        })
    }

    /// Animation settings.
    pub fn config(&self) -> &SpriteConfig {
        &self.config
    }

    /// Current frame index.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Resume from the current frame. Returns whether it was paused.
    pub fn start(&mut self) -> bool {
        !std::mem::replace(&mut self.running, true)
    }

    /// Hold the current frame.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Halt and rewind to frame 0.
    pub fn stop(&mut self) {
        self.running = false;
        self.frame = 0;
    }

    /// Advance one frame.
    pub fn step(&mut self) -> SpriteStep {
        let mut iterated = false;
        let mut finished = false;
        self.frame += 1;
        if self.frame >= self.config.frames {
            if self.config.looping {
                self.frame = 0;
                iterated = true;
            } else {
                self.stop();
                finished = true;
            }
        }
        SpriteStep {
            frame: self.frame,
            offset: f64::from(self.frame) * self.config.frame_step(),
            iterated,
            finished,
        }
    }
}

impl Ticked for SpriteAnimation {
    fn name(&self) -> &str {
        "sprite"
    }

    fn interval_ms(&self) -> u64 {
        (1_000.0 / f64::from(self.config.fps)).round().max(1.0) as u64
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

// ---------------------------------------------------------------------------
// Entity-facing operations
// ---------------------------------------------------------------------------

/// Start an entity's sprite, if it has one.
pub(crate) fn resume(ctx: &mut SimContext<'_>, id: EntityId) {
    if let Some(sprite) = ctx.bodies.sprites.get_mut(&id) {
        sprite.start();
        sync_subscription(ctx.clock, sprite, Task::Animate(id));
    }
}

/// Stop and rewind an entity's sprite, if it has one.
pub(crate) fn halt(ctx: &mut SimContext<'_>, id: EntityId) {
    if let Some(sprite) = ctx.bodies.sprites.get_mut(&id) {
        sprite.stop();
        sync_subscription(ctx.clock, sprite, Task::Animate(id));
    }
}

/// Sprite tick: step, emit `frame`, and `iterate` on wrap-around.
pub(crate) fn on_tick(ctx: &mut SimContext<'_>, id: EntityId) -> SimResult<()> {
    let Some(sprite) = ctx.bodies.sprites.get_mut(&id) else {
        warn!(entity = %id, "animate tick for an entity without a sprite");
        return Ok(());
    };
    let step = sprite.step();
    sync_subscription(ctx.clock, sprite, Task::Animate(id));

    let name = ctx.world.entity(id)?.name.clone();
    if !step.finished {
        ctx.emit(
            SimEventKind::Frame {
                entity: id,
                frame: step.frame,
                offset: step.offset,
            },
            format!("{name} shows frame {}", step.frame),
        );
    }
    if step.iterated {
        ctx.emit(
            SimEventKind::Iterate { entity: id },
            format!("{name} animation looped"),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ninja_sheet() -> SpriteConfig {
        SpriteConfig {
            frames: 14,
            width: 2_800.0,
            height: 300.0,
            ..Default::default()
        }
    }

    #[test]
    fn steps_through_offsets() {
        let mut sprite = SpriteAnimation::new(ninja_sheet()).unwrap();
        sprite.start();
        let step = sprite.step();
        assert_eq!(step.frame, 1);
        assert!((step.offset - 200.0).abs() < f64::EPSILON);
        assert_eq!(sprite.interval_ms(), 100);
    }

    #[test]
    fn looping_wraps_and_iterates() {
        let mut sprite = SpriteAnimation::new(SpriteConfig::default()).unwrap();
        sprite.start();
        let steps: Vec<SpriteStep> = (0..4).map(|_| sprite.step()).collect();
        assert!(steps[..3].iter().all(|s| !s.iterated));
        assert!(steps[3].iterated);
        assert_eq!(steps[3].frame, 0);
        assert!(sprite.is_running());
    }

    #[test]
    fn non_looping_stops_at_end() {
        let config = SpriteConfig {
            looping: false,
            frames: 2,
            ..Default::default()
        };
        let mut sprite = SpriteAnimation::new(config).unwrap();
        sprite.start();
        assert!(!sprite.step().finished);
        let last = sprite.step();
        assert!(last.finished);
        assert_eq!(sprite.frame(), 0);
        assert!(!sprite.is_running());
    }

    #[test]
    fn pause_keeps_frame_and_stop_rewinds() {
        let mut sprite = SpriteAnimation::new(SpriteConfig::default()).unwrap();
        assert!(sprite.start());
        assert!(!sprite.start());
        sprite.step();
        sprite.step();
        sprite.pause();
        assert_eq!(sprite.frame(), 2);
        sprite.stop();
        assert_eq!(sprite.frame(), 0);
    }

    #[test]
    fn rejects_zero_fps() {
        let config = SpriteConfig {
            fps: 0,
            ..Default::default()
        };
        assert!(SpriteAnimation::new(config).is_err());
    }
}
