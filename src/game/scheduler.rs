//! Deferred-task queue on a logical millisecond clock.
//!
//! Tasks are tagged with the round generation that scheduled them. The owner
//! compares that tag against its live generation when a task comes due and
//! drops stale ones; `cancel_generation` prunes them eagerly.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

pub type Generation = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
pub struct Due<T> {
    pub id: TaskId,
    pub at: Duration,
    pub generation: Generation,
    pub task: T,
}

#[derive(Debug)]
struct Entry<T> {
    at: Duration,
    seq: u64,
    generation: Generation,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at.cmp(&other.at).then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Entry<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Scheduler {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, generation: Generation, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.queue.push(Reverse(Entry {
            at: self.now + delay,
            seq,
            generation,
            task,
        }));
        TaskId(seq)
    }

    pub fn cancel_generation(&mut self, generation: Generation) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(entry)| entry.generation != generation);
        before - self.queue.len()
    }

    pub fn next_due_at(&self) -> Option<Duration> {
        self.queue.peek().map(|Reverse(entry)| entry.at)
    }

    /// Pops the earliest task due at or before `deadline`, moving the clock to its due time.
    ///
    /// Tasks with equal due times come out in scheduling order.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Due<T>> {
        if self.next_due_at()? > deadline {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.at);
        Some(Due {
            id: TaskId(entry.seq),
            at: entry.at,
            generation: entry.generation,
            task: entry.task,
        })
    }

    /// Moves the clock forward without running anything. Never moves it back.
    pub fn advance_to(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }
}
