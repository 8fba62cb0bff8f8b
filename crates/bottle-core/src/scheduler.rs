//! Deterministic timer queue for the single UI thread.
//!
//! Timers carry plain [`Task`] values instead of closures. The owner polls
//! with [`Scheduler::pop_due`] and applies each task itself, so a cancelled
//! timer can never run against state that no longer exists.

use crate::particles::ParticleId;
use fnv::FnvHashMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    SpawnSparkle,
    RetireSparkle(ParticleId),
}

/// A timer that has come due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Due {
    pub id: TimerId,
    pub deadline: Duration,
    pub task: Task,
}

#[derive(Clone, Debug)]
struct Timer {
    deadline: Duration,
    // scheduling order, renewed when a repeating timer is re-armed
    seq: u64,
    period: Option<Duration>,
    task: Task,
}

#[derive(Default)]
pub struct Scheduler {
    timers: FnvHashMap<TimerId, Timer>,
    next_id: u64,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, deadline: Duration, task: Task) -> TimerId {
        self.insert(deadline, None, task)
    }

    /// First run at `first`, then every `period` after the previous deadline.
    pub fn schedule_repeating(&mut self, first: Duration, period: Duration, task: Task) -> TimerId {
        // a zero period would never let pop_due make progress
        let period = period.max(Duration::from_nanos(1));
        self.insert(first, Some(period), task)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|t| t.deadline).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    ///
    /// Ties on the deadline resolve in scheduling order. Repeating timers stay
    /// registered under the same id with their deadline moved one period on.
    pub fn pop_due(&mut self, now: Duration) -> Option<Due> {
        let id = self
            .timers
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(id, _)| *id)?;

        let seq = self.bump_seq();
        let timer = self.timers.get_mut(&id)?;
        let due = Due {
            id,
            deadline: timer.deadline,
            task: timer.task,
        };
        let period = timer.period;
        match period {
            Some(period) => {
                timer.deadline += period;
                timer.seq = seq;
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(due)
    }

    fn insert(&mut self, deadline: Duration, period: Option<Duration>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.insert(
            id,
            Timer {
                deadline,
                seq,
                period,
                task,
            },
        );
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
