use std::collections::BTreeMap;
use std::time::Duration;

/// Handle returned by [`Scheduler::schedule`]; used to cancel a single timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Deadline queue of one-shot timers.
///
/// Timers due at the same instant fire in scheduling order. Periodic work is
/// expressed by rescheduling from the handler, so `cancel_all` always covers the
/// whole chain.
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: BTreeMap<(Duration, TimerId), E>,
    next_id: u64,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn schedule(&mut self, at: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.queue.insert((at, id), event);
        id
    }

    /// Returns true if the timer was still pending
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.queue.keys().find(|(_, t)| *t == id).copied();
        match key {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Remove and return the earliest timer whose deadline is at or before `now`
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let key = *self.queue.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.queue.remove(&key).map(|event| (key.0, event))
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_deadline_then_insertion_order() {
        let mut s = Scheduler::new();
        s.schedule(ms(20), "late");
        s.schedule(ms(10), "first");
        s.schedule(ms(10), "second");

        assert_eq!(s.pop_due(ms(5)), None, "nothing is due yet");
        assert_eq!(s.pop_due(ms(30)), Some((ms(10), "first")));
        assert_eq!(s.pop_due(ms(30)), Some((ms(10), "second")));
        assert_eq!(s.pop_due(ms(30)), Some((ms(20), "late")));
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn cancel_removes_single_timer() {
        let mut s = Scheduler::new();
        let a = s.schedule(ms(10), 1);
        s.schedule(ms(20), 2);

        assert!(s.cancel(a), "pending timer should cancel");
        assert!(!s.cancel(a), "second cancel is a no-op");
        assert_eq!(s.next_deadline(), Some(ms(20)));

        s.cancel_all();
        assert_eq!(s.pending(), 0);
        assert_eq!(s.next_deadline(), None);
    }
}
