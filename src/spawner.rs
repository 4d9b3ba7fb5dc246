//! Enemy spawner: a two-state machine over a repeating scheduler task.
//!
//! While `Spawning`, one enemy appears per spawn interval at a random column
//! above the top edge and starts its descent.  Each firing re-checks the
//! game-over gate; once the game is over the task is cancelled and the
//! spawner stays `Stopped` until [`Spawner::start`] is called on restart.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;

use crate::compute;
use crate::config::EnemyConfig;
use crate::entities::{EnemyId, EnemyShip};
use crate::scheduler::{Scheduler, TaskId, Timer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnerState {
    Spawning,
    Stopped,
}

pub struct Spawner {
    state: SpawnerState,
    interval: Duration,
    descent: Duration,
    task: Option<TaskId>,
    /// Pending descent-completion task per live enemy.
    descents: BTreeMap<EnemyId, TaskId>,
    next_id: u64,
}

/// Random horizontal start that keeps the whole enemy on screen.
pub fn spawn_x(rng: &mut impl Rng, screen_width: f32, enemy_width: f32) -> f32 {
    rng.gen::<f32>() * (screen_width - enemy_width).max(0.0)
}

impl Spawner {
    pub fn new(interval: Duration, descent: Duration) -> Self {
        Self {
            state: SpawnerState::Stopped,
            interval,
            descent,
            task: None,
            descents: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn state(&self) -> SpawnerState {
        self.state
    }

    pub fn in_flight(&self) -> usize {
        self.descents.len()
    }

    /// Stopped → Spawning.  Starting an already running spawner is a no-op.
    pub fn start(&mut self, sched: &mut Scheduler) {
        if self.state == SpawnerState::Spawning {
            return;
        }
        self.task = Some(sched.every(self.interval, Timer::Spawn));
        self.state = SpawnerState::Spawning;
        log::debug!("spawner started, every {:?}", self.interval);
    }

    /// Spawning → Stopped.
    pub fn stop(&mut self, sched: &mut Scheduler) {
        if let Some(task) = self.task.take() {
            sched.cancel(task);
        }
        if self.state == SpawnerState::Spawning {
            log::debug!("spawner stopped");
        }
        self.state = SpawnerState::Stopped;
    }

    /// Handle a spawn firing at `now`.  Returns the new enemy, already
    /// scheduled to finish its descent, or `None` if the gate closed.
    pub fn fire(
        &mut self,
        sched: &mut Scheduler,
        rng: &mut impl Rng,
        game_over: bool,
        now: Duration,
        screen_width: f32,
        enemy: &EnemyConfig,
    ) -> Option<EnemyShip> {
        if self.state == SpawnerState::Stopped {
            return None;
        }
        if game_over {
            self.stop(sched);
            return None;
        }

        let id = EnemyId(self.next_id);
        self.next_id += 1;
        let x = spawn_x(rng, screen_width, enemy.width);
        let task = sched.after(self.descent, Timer::DescentFinished(id));
        self.descents.insert(id, task);
        log::trace!("spawned enemy {:?} at x={:.1}", id, x);
        Some(compute::new_enemy(id, x, now, enemy))
    }

    /// Forget the descent of `id` once its completion has fired.
    pub fn descent_finished(&mut self, id: EnemyId) -> bool {
        self.descents.remove(&id).is_some()
    }

    /// Cancel every descent still in flight.
    pub fn cancel_descents(&mut self, sched: &mut Scheduler) {
        for (_, task) in std::mem::take(&mut self.descents) {
            sched.cancel(task);
        }
    }
}
