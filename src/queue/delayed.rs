use crate::model::OrderQueueEntry;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tokio::time::Instant;

struct Scheduled {
    due: Instant,
    seq: u64,
    entry: OrderQueueEntry,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Time-ordered set of entries waiting for their next eligible instant.
///
/// Entries due at the same instant come out in insertion order.
#[derive(Default)]
pub struct DelayedSet {
    heap: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl DelayedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: OrderQueueEntry, due: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(Scheduled { due, seq, entry }));
    }

    /// When the earliest entry becomes due.
    pub fn next_due(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(s)| s.due)
    }

    /// Removes the earliest entry if it is due at `now`.
    pub fn pop_due(&mut self, now: Instant) -> Option<OrderQueueEntry> {
        match self.next_due() {
            Some(due) if due <= now => self.heap.pop().map(|Reverse(s)| s.entry),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Empties the set, earliest first.
    pub fn drain(&mut self) -> Vec<OrderQueueEntry> {
        let mut entries = Vec::with_capacity(self.heap.len());
        while let Some(Reverse(s)) = self.heap.pop() {
            entries.push(s.entry);
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OrderNumber;
    use std::time::Duration;

    fn entry(raw: &str) -> OrderQueueEntry {
        OrderQueueEntry::new(OrderNumber::parse(raw).unwrap())
    }

    #[test]
    fn test_pops_in_due_order_only_when_due() {
        let t0 = Instant::now();
        let mut set = DelayedSet::new();
        set.insert(entry("12345678903"), t0 + Duration::from_secs(20));
        set.insert(entry("79927398713"), t0 + Duration::from_secs(5));

        assert_eq!(set.next_due(), Some(t0 + Duration::from_secs(5)));
        assert!(set.pop_due(t0).is_none());

        let first = set.pop_due(t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(first.order_number.as_str(), "79927398713");
        assert!(set.pop_due(t0 + Duration::from_secs(19)).is_none());

        let second = set.pop_due(t0 + Duration::from_secs(30)).unwrap();
        assert_eq!(second.order_number.as_str(), "12345678903");
        assert!(set.is_empty());
        assert_eq!(set.next_due(), None);
    }

    #[test]
    fn test_same_deadline_keeps_insertion_order() {
        let t0 = Instant::now();
        let mut set = DelayedSet::new();
        set.insert(entry("2377225624"), t0);
        set.insert(entry("9278923470"), t0);
        set.insert(entry("12345678903"), t0);

        let drained: Vec<String> = set
            .drain()
            .into_iter()
            .map(|e| e.order_number.to_string())
            .collect();
        assert_eq!(drained, ["2377225624", "9278923470", "12345678903"]);
        assert_eq!(set.len(), 0);
    }
}
