//! Delayed transitions for a single-threaded widget.
//!
//! Games never touch wall-clock timers directly; they queue events here and
//! the host drains whatever is due on every animation frame.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<E> {
    id: TimerId,
    due_ms: u64,
    every_ms: Option<u64>,
    event: E,
}

#[derive(Clone, Debug)]
pub struct Scheduler<E> {
    entries: Vec<Entry<E>>,
    next_id: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Scheduler {
            entries: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due_ms: u64, every_ms: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms,
            every_ms,
            event,
        });
        id
    }

    /// Fire `event` once, `delay_ms` after `now_ms`.
    pub fn after(&mut self, now_ms: u64, delay_ms: u64, event: E) -> TimerId {
        self.push(now_ms.saturating_add(delay_ms), None, event)
    }

    /// Fire `event` every `interval_ms` starting one interval from now.
    pub fn every(&mut self, now_ms: u64, interval_ms: u64, event: E) -> TimerId {
        let interval = interval_ms.max(1);
        self.push(now_ms.saturating_add(interval), Some(interval), event)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest due timer at or before `now_ms`. Ties resolve in scheduling
    /// order. Repeating timers are re-armed one interval after their due
    /// time so late frames still see every period.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(u64, E)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id.0))
            .map(|(i, _)| i)?;
        let due = self.entries[idx].due_ms;
        match self.entries[idx].every_ms {
            Some(interval) => {
                let entry = &mut self.entries[idx];
                entry.due_ms = due.saturating_add(interval);
                Some((due, entry.event.clone()))
            }
            None => {
                let entry = self.entries.remove(idx);
                Some((due, entry.event))
            }
        }
    }

    pub fn next_due(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_due_order() {
        let mut s = Scheduler::new();
        s.after(0, 300, "c");
        s.after(0, 100, "a");
        s.after(0, 200, "b");
        assert_eq!(s.pop_due(50), None);
        let mut seen = Vec::new();
        while let Some((_, ev)) = s.pop_due(1000) {
            seen.push(ev);
        }
        assert_eq!(seen, vec!["a", "b", "c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn equal_due_times_keep_insertion_order() {
        let mut s = Scheduler::new();
        s.after(10, 5, 1);
        s.after(10, 5, 2);
        assert_eq!(s.pop_due(15), Some((15, 1)));
        assert_eq!(s.pop_due(15), Some((15, 2)));
    }

    #[test]
    fn repeating_timer_catches_up() {
        let mut s = Scheduler::new();
        let id = s.every(0, 100, ());
        let mut fired = 0;
        while s.pop_due(350).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(s.next_due(), Some(400));
        assert!(s.cancel(id));
        assert!(!s.cancel(id));
        assert_eq!(s.pop_due(10_000), None);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut s = Scheduler::new();
        s.every(0, 0, ());
        assert_eq!(s.next_due(), Some(1));
    }
}
