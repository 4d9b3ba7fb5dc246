//! Timing services: a repeating timer and one-shot delayed callbacks.
//!
//! The scheduler never looks at a wall clock.  The owner advances it by
//! calling [`Scheduler::pop_due`] with the current game time and handles each
//! fired timer before asking for the next one, so a handler that cancels a
//! task is guaranteed that task will not fire afterwards.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use crate::entities::EnemyId;

/// Handle returned when a task is scheduled; used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// What a task does when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Collision/scoring tick.
    Tick,
    /// Enemy spawner firing.
    Spawn,
    /// An enemy reached the bottom of the screen.
    DescentFinished(EnemyId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fired {
    /// Scheduled time of this firing (not the time it was drained).
    pub at: Duration,
    pub task: TaskId,
    pub timer: Timer,
}

struct Task {
    timer: Timer,
    period: Option<Duration>,
}

/// Smallest period a repeating task may have; guards against a zero period
/// firing forever within a single `pop_due` loop.
const MIN_PERIOD: Duration = Duration::from_millis(1);

#[derive(Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    seq: u64,
    tasks: HashMap<TaskId, Task>,
    // (due, insertion order, task)
    queue: BinaryHeap<Reverse<(Duration, u64, TaskId)>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the most recent firing or drain.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `timer` once, `delay` from now.
    pub fn after(&mut self, delay: Duration, timer: Timer) -> TaskId {
        self.insert(delay, None, timer)
    }

    /// Fire `timer` every `period`, first firing one period from now.
    pub fn every(&mut self, period: Duration, timer: Timer) -> TaskId {
        let period = period.max(MIN_PERIOD);
        self.insert(period, Some(period), timer)
    }

    /// Returns `false` if the task already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, task: TaskId) -> bool {
        self.tasks.remove(&task).is_some()
    }

    pub fn is_active(&self, task: TaskId) -> bool {
        self.tasks.contains_key(&task)
    }

    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    /// Due time of the next live task.
    pub fn next_due(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Pop the earliest task due at or before `now`.  Repeating tasks are
    /// re-armed one period after their scheduled time, so ticks do not drift.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        self.discard_cancelled();
        let Some(&Reverse((due, _, id))) = self.queue.peek() else {
            self.now = self.now.max(now);
            return None;
        };
        if due > now {
            self.now = self.now.max(now);
            return None;
        }
        self.queue.pop();
        self.now = self.now.max(due);

        let (timer, period) = match self.tasks.get(&id) {
            Some(task) => (task.timer, task.period),
            None => return None,
        };
        match period {
            Some(period) => self.push(due + period, id),
            None => {
                self.tasks.remove(&id);
            }
        }
        Some(Fired { at: due, task: id, timer })
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>, timer: Timer) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Task { timer, period });
        self.push(self.now + delay, id);
        id
    }

    fn push(&mut self, due: Duration, id: TaskId) {
        self.seq += 1;
        self.queue.push(Reverse((due, self.seq, id)));
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse((_, _, id))) = self.queue.peek() {
            if self.tasks.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}
