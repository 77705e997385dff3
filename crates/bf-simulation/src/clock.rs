use std::collections::{BTreeMap, HashMap};

/// Opaque handle to a scheduled entry. Stays valid across repeats of a
/// periodic entry until it is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    handle: TimerHandle,
    interval: Option<u64>,
    payload: T,
}

/// One entry that came due, as returned by [`Clock::pop_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// The handle the entry was scheduled under.
    pub handle: TimerHandle,
    /// Virtual timestamp the entry fired at.
    pub at_ms: u64,
    /// What was scheduled.
    pub payload: T,
    /// `true` for periodic entries, which have already been re-armed.
    pub repeating: bool,
}

/// Virtual-time scheduler for periodic ticks and one-shot deferred tasks.
///
/// Time only moves when the owner pops due entries or advances the clock,
/// so runs are deterministic and independent of wall time. Entries due at
/// the same instant fire in the order they were (re)armed.
#[derive(Debug, Clone)]
pub struct Clock<T> {
    now_ms: u64,
    next_seq: u64,
    queue: BTreeMap<(u64, u64), Entry<T>>,
    keys: HashMap<TimerHandle, (u64, u64)>,
}

impl<T> Default for Clock<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_seq: 0,
            queue: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }
}

impl<T: Clone> Clock<T> {
    /// A clock at `t = 0` with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Fire `payload` every `interval_ms`, first at `now + interval_ms`.
    /// An interval of zero is treated as one millisecond.
    pub fn schedule(&mut self, payload: T, interval_ms: u64) -> TimerHandle {
        let interval = interval_ms.max(1);
        let handle = self.next_handle();
        self.insert(self.now_ms.saturating_add(interval), handle, Some(interval), payload);
        handle
    }

    /// Fire `payload` once, `delay_ms` from now.
    pub fn defer(&mut self, payload: T, delay_ms: u64) -> TimerHandle {
        let handle = self.next_handle();
        self.insert(self.now_ms.saturating_add(delay_ms), handle, None, payload);
        handle
    }

    /// Remove an entry. Returns `false` if it had already fired (one-shot)
    /// or was never scheduled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.keys.remove(&handle) {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Whether the handle still refers to a pending entry.
    pub fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.keys.contains_key(&handle)
    }

    /// When the earliest pending entry is due.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Number of pending entries.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Take the earliest entry due at or before `until`, moving the clock to
    /// its timestamp. Periodic entries are re-armed before being returned, so
    /// the caller can cancel them while handling the tick.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired<T>> {
        let (&(due, seq), _) = self.queue.iter().next()?;
        if due > until {
            return None;
        }
        let entry = self.queue.remove(&(due, seq))?;
        self.keys.remove(&entry.handle);
        self.now_ms = self.now_ms.max(due);

        if let Some(interval) = entry.interval {
            self.insert(
                due.saturating_add(interval),
                entry.handle,
                Some(interval),
                entry.payload.clone(),
            );
        }

        Some(Fired {
            handle: entry.handle,
            at_ms: due,
            payload: entry.payload,
            repeating: entry.interval.is_some(),
        })
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, t_ms: u64) {
        self.now_ms = self.now_ms.max(t_ms);
    }

    fn next_handle(&mut self) -> TimerHandle {
        self.next_seq += 1;
        TimerHandle(self.next_seq)
    }

    fn insert(&mut self, due: u64, handle: TimerHandle, interval: Option<u64>, payload: T) {
        self.next_seq += 1;
        let key = (due, self.next_seq);
        self.keys.insert(handle, key);
        self.queue.insert(
            key,
            Entry {
                handle,
                interval,
                payload,
            },
        );
    }
}
