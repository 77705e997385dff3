use bf_core::{EntityId, ProjectileId};
use tracing::debug;

use crate::clock::{Clock, TimerHandle};

/// Work the simulation clock can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Task {
    /// Periodic: integrate a walker.
    Walk(EntityId),
    /// Periodic: advance a sprite.
    Animate(EntityId),
    /// Periodic: integrate a projectile.
    Fly(ProjectileId),
    /// One-shot: end a sleep.
    Wake(EntityId),
    /// One-shot: put new food on the field.
    SpawnFood,
    /// One-shot: take a stopped projectile off the field.
    RemoveProjectile(ProjectileId),
}

/// A capability body that advances on its own clock subscription while it
/// is running: walkers, projectiles, sprites.
///
/// Bodies never touch the clock themselves. After any call that can change
/// [`Ticked::is_running`], the owner calls [`sync_subscription`] so that a
/// stopped body is unsubscribed before its next tick and a started body is
/// subscribed exactly once.
pub trait Ticked: std::fmt::Debug {
    /// Human-readable name for this capability.
    fn name(&self) -> &str;

    /// Milliseconds between ticks.
    fn interval_ms(&self) -> u64;

    /// Whether the body wants ticks.
    fn is_running(&self) -> bool;

    /// The current clock subscription, if any.
    fn subscription(&self) -> Option<TimerHandle>;

    /// Record or clear the clock subscription.
    fn set_subscription(&mut self, handle: Option<TimerHandle>);
}

/// Bring a body's clock subscription in line with its running state.
/// Returns `true` if a subscription was added or removed.
pub fn sync_subscription<B: Ticked + ?Sized>(
    clock: &mut Clock<Task>,
    body: &mut B,
    task: Task,
) -> bool {
    match (body.is_running(), body.subscription()) {
        (true, None) => {
            let handle = clock.schedule(task, body.interval_ms());
            debug!(body = body.name(), ?task, "subscribed");
            body.set_subscription(Some(handle));
            true
        }
        (false, Some(handle)) => {
            clock.cancel(handle);
            debug!(body = body.name(), ?task, "unsubscribed");
            body.set_subscription(None);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Dummy {
        running: bool,
        handle: Option<TimerHandle>,
    }

    impl Ticked for Dummy {
        fn name(&self) -> &str {
            "dummy"
        }
        fn interval_ms(&self) -> u64 {
            10
        }
        fn is_running(&self) -> bool {
            self.running
        }
        fn subscription(&self) -> Option<TimerHandle> {
            self.handle
        }
        fn set_subscription(&mut self, handle: Option<TimerHandle>) {
            self.handle = handle;
        }
    }

    #[test]
    fn subscribes_once_and_unsubscribes_on_stop() {
        let mut clock = Clock::new();
        let mut body = Dummy {
            running: true,
            ..Default::default()
        };
        let task = Task::SpawnFood;

        assert!(sync_subscription(&mut clock, &mut body, task));
        assert!(!sync_subscription(&mut clock, &mut body, task));
        assert_eq!(clock.pending(), 1);
        assert_eq!(clock.next_due(), Some(10));

        body.running = false;
        assert!(sync_subscription(&mut clock, &mut body, task));
        assert_eq!(clock.pending(), 0);
        assert!(body.handle.is_none());
    }
}
