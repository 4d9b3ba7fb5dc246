//! Game loop controller.
//!
//! `GameLoop` is the single owner of all mutable game state.  Input arrives as
//! [`Message`]s, timers come out of the scheduler it owns, and both are handled
//! one at a time on whichever thread calls [`GameLoop::handle`] and
//! [`GameLoop::update`].  Nothing else can reach the state, so no handler ever
//! races another.
//!
//! ```text
//!   Playing ──collision──▶ GameOver ──acknowledge──▶ Playing
//! ```

use std::time::Duration;

use rand::Rng;

use crate::audio::GameAudio;
use crate::compute;
use crate::config::{Config, ScoringRules};
use crate::entities::{EnemyId, GameState};
use crate::input::{TiltAdapter, TiltReading};
use crate::scheduler::{Fired, Scheduler, TaskId, Timer};
use crate::spawner::{Spawner, SpawnerState};
use crate::surface::{Dialog, Entity, Surface};

/// Everything that can be posted to the controller from outside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message {
    /// A gyroscope (or stand-in) reading.
    Tilt(TiltReading),
    /// The game-over dialog was acknowledged.
    Acknowledge,
    /// The window changed; nothing in the game state depends on it.
    Redraw,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct GameLoop<S: Surface, R: Rng> {
    cfg: Config,
    rules: ScoringRules,
    state: GameState,
    sched: Scheduler,
    spawner: Spawner,
    ticker: Option<TaskId>,
    tilt: TiltAdapter,
    audio: GameAudio,
    surface: S,
    rng: R,
}

impl<S: Surface, R: Rng> GameLoop<S, R> {
    pub fn new(cfg: Config, surface: S, audio: GameAudio, rng: R) -> Self {
        let state = compute::init_state(&cfg);
        let spawner = Spawner::new(cfg.timing.spawn_interval(), cfg.timing.descent());
        Self {
            rules: cfg.scoring,
            tilt: TiltAdapter::new(cfg.input.sensitivity),
            cfg,
            state,
            sched: Scheduler::new(),
            spawner,
            ticker: None,
            audio,
            surface,
            rng,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some_and(|t| self.sched.is_active(t))
    }

    pub fn spawner_state(&self) -> SpawnerState {
        self.spawner.state()
    }

    pub fn descents_in_flight(&self) -> usize {
        self.spawner.in_flight()
    }

    /// When the next timer is due, so a caller can sleep until then.
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.sched.next_due()
    }

    // ── Driving ──────────────────────────────────────────────────────────────

    /// Put the first round on screen and start music, ticker and spawner.
    pub fn start(&mut self, now: Duration) {
        self.run_due(now);
        self.show_player();
        self.surface.set_score(self.state.score);
        self.resume();
        log::info!(
            "game started on a {}x{} screen, rules {:?}",
            self.state.screen_width,
            self.state.screen_height,
            self.rules
        );
    }

    /// Fire every timer due by `now`, then bring enemy sprites up to date.
    pub fn update(&mut self, now: Duration) {
        self.run_due(now);
        self.animate(now);
    }

    /// Handle one external message received at `now`.  Timers that were due
    /// before it are handled first.
    pub fn handle(&mut self, msg: Message, now: Duration) -> Flow {
        self.run_due(now);
        match msg {
            Message::Tilt(reading) => self.on_tilt(&reading),
            Message::Acknowledge => self.on_acknowledge(),
            Message::Redraw => {}
            Message::Quit => {
                self.audio.stop_music();
                log::info!("quit with score {}", self.state.score);
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    fn run_due(&mut self, now: Duration) {
        while let Some(fired) = self.sched.pop_due(now) {
            self.on_timer(fired);
        }
    }

    fn on_timer(&mut self, fired: Fired) {
        match fired.timer {
            Timer::Tick => self.on_tick(fired.at),
            Timer::Spawn => self.on_spawn(fired.at),
            Timer::DescentFinished(id) => self.on_descent_finished(id),
        }
    }

    // ── Handlers ─────────────────────────────────────────────────────────────

    fn on_tilt(&mut self, reading: &TiltReading) {
        let delta = self.tilt.displacement(reading);
        self.state = compute::update_position(&self.state, delta);
        let p = &self.state.player;
        self.surface.set_position(Entity::Player, p.x, p.y);
    }

    fn on_tick(&mut self, at: Duration) {
        self.animate(at);
        let outcome = compute::tick(&self.state, &self.rules);
        self.state = outcome.state;
        match outcome.collision {
            Some(id) => self.game_over(id),
            None => self.surface.set_score(self.state.score),
        }
    }

    fn on_spawn(&mut self, at: Duration) {
        let spawned = self.spawner.fire(
            &mut self.sched,
            &mut self.rng,
            self.state.is_game_over(),
            at,
            self.state.screen_width,
            &self.cfg.enemy,
        );
        if let Some(enemy) = spawned {
            let entity = Entity::Enemy(enemy.id);
            self.surface.set_image(entity, &self.cfg.enemy.image);
            self.surface.set_position(entity, enemy.x, enemy.y);
            self.state = compute::add_enemy(&self.state, enemy);
        }
    }

    fn on_descent_finished(&mut self, id: EnemyId) {
        self.spawner.descent_finished(id);
        if let Some(state) = compute::dodge(&self.state, id, &self.rules) {
            self.state = state;
            self.surface.remove(Entity::Enemy(id));
            self.surface.set_score(self.state.score);
            log::trace!("enemy {:?} dodged, score {}", id, self.state.score);
        }
    }

    fn on_acknowledge(&mut self) {
        if !self.state.is_game_over() {
            return;
        }
        self.restart();
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Playing → GameOver.  Everything that keeps the round moving stops;
    /// enemies freeze where they are until the restart clears them.
    fn game_over(&mut self, hit: EnemyId) {
        if let Some(ticker) = self.ticker.take() {
            self.sched.cancel(ticker);
        }
        self.spawner.stop(&mut self.sched);
        self.spawner.cancel_descents(&mut self.sched);

        self.audio.stop_music();
        self.audio.play_collision();

        let p = &self.state.player;
        self.surface.set_visible(Entity::Player, false);
        self.surface.set_image(Entity::Explosion, &self.cfg.player.explosion_image);
        self.surface.set_position(Entity::Explosion, p.x, p.y);
        self.surface.set_visible(Entity::Explosion, true);
        self.surface.show_dialog(Dialog::game_over());

        log::info!(
            "game over: hit by {:?} with score {} (best {})",
            hit,
            self.state.score,
            self.state.best_score
        );
    }

    /// GameOver → Playing.
    fn restart(&mut self) {
        for enemy in &self.state.enemies {
            self.surface.remove(Entity::Enemy(enemy.id));
        }
        self.state = compute::restart(&self.state);
        self.surface.dismiss_dialog();
        self.surface.remove(Entity::Explosion);
        self.show_player();
        self.surface.set_score(self.state.score);
        self.resume();
        log::info!("restarted");
    }

    fn show_player(&mut self) {
        let p = &self.state.player;
        self.surface.set_image(Entity::Player, &self.cfg.player.image);
        self.surface.set_position(Entity::Player, p.x, p.y);
        self.surface.set_visible(Entity::Player, p.visible);
    }

    /// Start music, ticker and spawner.
    fn resume(&mut self) {
        self.audio.start_music();
        self.ticker = Some(self.sched.every(self.cfg.timing.tick(), Timer::Tick));
        self.spawner.start(&mut self.sched);
    }

    /// Move enemies along their descent and mirror them on the surface.
    /// Frozen while the game is over.
    fn animate(&mut self, now: Duration) {
        if self.state.is_game_over() {
            return;
        }
        self.state = compute::advance_enemies(&self.state, now, self.cfg.timing.descent());
        for enemy in &self.state.enemies {
            self.surface
                .set_position(Entity::Enemy(enemy.id), enemy.x, enemy.y);
        }
    }
}
