use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clocks
// ---------------------------------------------------------------------------

/// Source of "now" for deferred work.
pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

// ---------------------------------------------------------------------------
// Debouncer
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Scheduled<T> {
    due: Instant,
    value: T,
}

/// At most one scheduled value; rescheduling replaces it and restarts the
/// quiet period, so the latest value is the one that fires.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    scheduled: Option<Scheduled<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            scheduled: None,
        }
    }

    /// Schedule `value` to fire `delay` after `now`, returning the value it
    /// displaced, if any.
    pub fn schedule(&mut self, value: T, now: Instant) -> Option<T> {
        let previous = self.scheduled.take().map(|s| s.value);
        self.scheduled = Some(Scheduled {
            due: now + self.delay,
            value,
        });
        previous
    }

    /// Take the value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.scheduled {
            Some(s) if now >= s.due => self.scheduled.take().map(|s| s.value),
            _ => None,
        }
    }

    /// Take the value regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.scheduled.take().map(|s| s.value)
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.flush()
    }

    pub fn pending(&self) -> Option<&T> {
        self.scheduled.as_ref().map(|s| &s.value)
    }

    pub fn is_pending(&self) -> bool {
        self.scheduled.is_some()
    }

    /// Time left until the scheduled value fires; zero when overdue.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.scheduled
            .as_ref()
            .map(|s| s.due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn test_fires_after_quiet_period() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule("a", clock.now());

        clock.advance(Duration::from_millis(99));
        assert_eq!(debouncer.poll(clock.now()), None);

        clock.advance(Duration::from_millis(1));
        assert_eq!(debouncer.poll(clock.now()), Some("a"));
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.poll(clock.now()), None);
    }

    #[test]
    fn test_reschedule_replaces_and_restarts() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.schedule(1, clock.now()), None);

        clock.advance(Duration::from_millis(80));
        assert_eq!(debouncer.schedule(2, clock.now()), Some(1));

        clock.advance(Duration::from_millis(80));
        assert_eq!(debouncer.poll(clock.now()), None);
        assert_eq!(debouncer.time_until_due(clock.now()), Some(Duration::from_millis(20)));

        clock.advance(Duration::from_millis(20));
        assert_eq!(debouncer.poll(clock.now()), Some(2));
    }

    #[test]
    fn test_cancel_and_flush() {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.schedule(7, clock.now());
        assert_eq!(debouncer.cancel(), Some(7));
        clock.advance(DELAY);
        assert_eq!(debouncer.poll(clock.now()), None);

        debouncer.schedule(8, clock.now());
        assert_eq!(debouncer.flush(), Some(8));
        assert_eq!(debouncer.time_until_due(clock.now()), None);
    }
}
