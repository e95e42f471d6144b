//! Deadline queue for a controller's deferred transitions.
//!
//! Each pending transition is an entry keyed by what it will do. Entries can
//! be cancelled individually or all at once on teardown; a cancelled entry
//! never fires.

use tokio::time::{Instant, sleep_until};

#[derive(Debug)]
pub struct TimerQueue<K> {
    entries: Vec<(K, Instant)>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: Copy + Eq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` at `at`, replacing any pending entry with the same key.
    pub fn schedule(&mut self, key: K, at: Instant) {
        self.cancel(key);
        self.entries.push((key, at));
    }

    /// Cancel the entry for `key`. Returns whether one was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != before
    }

    /// Cancel everything. Returns how many entries were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries.iter().map(|(_, at)| *at).min()
    }

    /// Remove and return the earliest entry due at `now`.
    ///
    /// Ties resolve in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<K> {
        let (index, _) = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (_, at))| *at <= now)
            .min_by_key(|(i, (_, at))| (*at, *i))?;
        Some(self.entries.remove(index).0)
    }
}

/// Wait for `deadline`, or forever when nothing is scheduled.
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Key {
        A,
        B,
        C,
    }

    #[test]
    fn pop_due_returns_earliest_first() {
        let base = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::B, base + Duration::from_millis(20));
        timers.schedule(Key::A, base + Duration::from_millis(10));
        timers.schedule(Key::C, base + Duration::from_millis(30));

        let now = base + Duration::from_millis(25);
        assert_eq!(timers.pop_due(now), Some(Key::A));
        assert_eq!(timers.pop_due(now), Some(Key::B));
        assert_eq!(timers.pop_due(now), None);
        assert_eq!(timers.next_deadline(), Some(base + Duration::from_millis(30)));
    }

    #[test]
    fn schedule_replaces_same_key() {
        let base = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::A, base + Duration::from_millis(10));
        timers.schedule(Key::A, base + Duration::from_millis(50));

        assert_eq!(timers.pop_due(base + Duration::from_millis(20)), None);
        assert_eq!(timers.next_deadline(), Some(base + Duration::from_millis(50)));
        assert_eq!(timers.pop_due(base + Duration::from_millis(50)), Some(Key::A));
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn cancelled_entries_never_fire() {
        let base = Instant::now();
        let mut timers = TimerQueue::new();
        timers.schedule(Key::A, base);
        timers.schedule(Key::B, base);

        assert!(timers.cancel(Key::A));
        assert!(!timers.cancel(Key::A));
        assert_eq!(timers.cancel_all(), 1);
        assert_eq!(timers.pop_due(base + Duration::from_secs(1)), None);
        assert_eq!(timers.next_deadline(), None);
    }
}
