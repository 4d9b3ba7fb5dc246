use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use space_ships::audio::{AudioBackend, AudioPlayer, GameAudio};
use space_ships::config::Config;
use space_ships::entities::GameStatus;
use space_ships::input::TiltReading;
use space_ships::spawner::SpawnerState;
use space_ships::surface::{Entity, Scene};
use space_ships::{Flow, GameLoop, Message};

type Log = Rc<RefCell<Vec<String>>>;

struct FakePlayer {
    name: &'static str,
    log: Log,
}

impl AudioPlayer for FakePlayer {
    fn set_looping(&mut self, looping: bool) {
        self.log.borrow_mut().push(format!("{}:loop={}", self.name, looping));
    }
    fn play(&mut self) {
        self.log.borrow_mut().push(format!("{}:play", self.name));
    }
    fn stop(&mut self) {
        self.log.borrow_mut().push(format!("{}:stop", self.name));
    }
}

fn fake_audio() -> (GameAudio, Log) {
    let log: Log = Rc::default();
    let audio = GameAudio::from_players(
        Some(Box::new(FakePlayer { name: "music", log: log.clone() })),
        Some(Box::new(FakePlayer { name: "crash", log: log.clone() })),
    );
    (audio, log)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Enemies as wide as the screen: every one of them eventually hits the
/// player.  First spawn at 1000ms, first hit on the 5300ms tick.
fn collision_config() -> Config {
    let mut cfg = Config::default();
    cfg.enemy.width = cfg.screen.width;
    cfg
}

/// Descent shorter than a tick: every enemy lands before a tick can see it
/// on screen, so every enemy is a dodge.
fn dodge_config() -> Config {
    let mut cfg = Config::default();
    cfg.timing.descent_ms = 50;
    cfg
}

fn game(cfg: Config) -> (GameLoop<Scene, StdRng>, Log) {
    let (audio, log) = fake_audio();
    let mut game = GameLoop::new(cfg, Scene::new(), audio, StdRng::seed_from_u64(42));
    game.start(Duration::ZERO);
    (game, log)
}

fn played(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

// ── start ─────────────────────────────────────────────────────────────────────

#[test]
fn start_shows_player_and_starts_everything() {
    let (g, log) = game(Config::default());
    let player = g.surface().sprite(Entity::Player).unwrap();
    assert!(player.visible);
    assert_eq!((player.x, player.y), (180.0, 640.0));
    assert!(player.image.contains("starship.png"));
    assert_eq!(g.surface().score_label(), "HIGH SCORE: 0");
    assert!(g.is_ticking());
    assert_eq!(g.spawner_state(), SpawnerState::Spawning);
    assert_eq!(played(&log), vec!["music:play"]);
}

// ── tilt ──────────────────────────────────────────────────────────────────────

#[test]
fn tilt_moves_player_and_clamps() {
    let (mut g, _) = game(Config::default());
    let flow = g.handle(Message::Tilt(TiltReading::around_x(2.0)), ms(10));
    assert_eq!(flow, Flow::Continue);
    assert_eq!(g.state().player.x, 200.0); // 2.0 * sensitivity 10

    g.handle(Message::Tilt(TiltReading::around_x(100.0)), ms(20));
    assert_eq!(g.state().player.x, 360.0);
    assert_eq!(g.surface().sprite(Entity::Player).unwrap().x, 360.0);

    g.handle(Message::Tilt(TiltReading::around_x(-100.0)), ms(30));
    assert_eq!(g.state().player.x, 0.0);
}

#[test]
fn only_x_axis_of_reading_is_used() {
    let (mut g, _) = game(Config::default());
    let mut reading = TiltReading::around_x(0.0);
    reading.angular_velocity.y = 5.0;
    reading.angular_velocity.z = -5.0;
    g.handle(Message::Tilt(reading), ms(10));
    assert_eq!(g.state().player.x, 180.0);
}

// ── ticks, spawns, dodges ─────────────────────────────────────────────────────

#[test]
fn ticks_pay_survival_reward() {
    let (mut g, _) = game(Config::default());
    g.update(ms(550));
    assert_eq!(g.state().score, 100); // 5 ticks × 20
    assert_eq!(g.surface().score(), 100);
}

#[test]
fn spawner_creates_one_enemy_per_second() {
    let (mut g, _) = game(Config::default());
    g.update(ms(999));
    assert!(g.state().enemies.is_empty());
    g.update(ms(1000));
    assert_eq!(g.state().enemies.len(), 1);
    g.update(ms(3000));
    assert_eq!(g.state().enemies.len(), 3);
    assert_eq!(g.surface().enemy_count(), 3);

    let e = &g.state().enemies[0];
    assert!(e.x >= 0.0 && e.x <= 350.0);
    assert_eq!(g.descents_in_flight(), 3);
}

#[test]
fn enemies_descend_over_time() {
    let (mut g, _) = game(Config::default());
    g.update(ms(1000));
    assert_eq!(g.state().enemies[0].y, -50.0);
    g.update(ms(3500));
    let y = g.state().enemies[0].y;
    assert!((y - 325.0).abs() < 1e-3);
    let id = g.state().enemies[0].id;
    assert_eq!(g.surface().sprite(Entity::Enemy(id)).unwrap().y, y);
}

#[test]
fn finished_descent_is_a_dodge() {
    let (mut g, _) = game(dodge_config());
    g.update(ms(1049));
    assert_eq!(g.state().enemies.len(), 1);
    g.update(ms(1099));
    assert!(g.state().enemies.is_empty());
    assert_eq!(g.surface().enemy_count(), 0);
    // 10 ticks + 1 dodge
    assert_eq!(g.state().score, 10 * 20 + 20);
}

#[test]
fn score_never_decreases_while_playing() {
    let (mut g, _) = game(dodge_config());
    let mut last = 0;
    for t in (0..6000).step_by(7) {
        g.update(ms(t));
        assert_eq!(g.state().status, GameStatus::Playing);
        assert!(g.state().score >= last);
        last = g.state().score;
    }
}

#[test]
fn acknowledge_while_playing_is_ignored() {
    let (mut g, _) = game(Config::default());
    g.update(ms(300));
    g.handle(Message::Acknowledge, ms(300));
    assert_eq!(g.state().score, 60);
    assert!(g.is_ticking());
}

// ── game over ─────────────────────────────────────────────────────────────────

#[test]
fn collision_triggers_game_over() {
    let (mut g, log) = game(collision_config());
    g.update(ms(5250));
    assert_eq!(g.state().status, GameStatus::Playing);
    assert_eq!(g.state().score, 52 * 20);

    g.update(ms(5300));
    let s = g.state();
    assert_eq!(s.status, GameStatus::GameOver);
    assert_eq!(s.score, 52 * 20);
    assert!(!s.player.visible);

    assert!(!g.is_ticking());
    assert_eq!(g.spawner_state(), SpawnerState::Stopped);
    assert_eq!(g.descents_in_flight(), 0);

    let scene = g.surface();
    assert!(!scene.sprite(Entity::Player).unwrap().visible);
    let boom = scene.sprite(Entity::Explosion).unwrap();
    assert!(boom.visible);
    assert!(boom.image.contains("explosion"));
    let dialog = scene.dialog().unwrap();
    assert_eq!(dialog.title, "Game Over");
    assert_eq!(dialog.action, "Restart");

    assert_eq!(played(&log), vec!["music:play", "music:stop", "crash:play"]);
}

#[test]
fn nothing_moves_while_game_over() {
    let (mut g, _) = game(collision_config());
    g.update(ms(5300));
    let score = g.state().score;
    let enemies = g.state().enemies.clone();

    g.update(ms(30_000));
    assert_eq!(g.state().score, score);
    assert_eq!(g.state().enemies, enemies);
    assert_eq!(g.next_deadline(), None);
}

// ── restart ───────────────────────────────────────────────────────────────────

#[test]
fn acknowledge_restarts_round() {
    let (mut g, log) = game(collision_config());
    g.update(ms(5300));
    assert!(g.state().is_game_over());
    assert!(!g.state().enemies.is_empty());

    g.handle(Message::Acknowledge, ms(20_000));
    let s = g.state();
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.score, 0);
    assert!(s.enemies.is_empty());
    assert!(s.player.visible);
    assert_eq!(s.player.x, 180.0);
    assert_eq!(s.best_score, 52 * 20);

    assert!(g.is_ticking());
    assert_eq!(g.spawner_state(), SpawnerState::Spawning);

    let scene = g.surface();
    assert_eq!(scene.enemy_count(), 0);
    assert!(scene.sprite(Entity::Explosion).is_none());
    assert!(scene.sprite(Entity::Player).unwrap().visible);
    assert!(scene.dialog().is_none());
    assert_eq!(scene.score(), 0);
    assert_eq!(played(&log).last().map(String::as_str), Some("music:play"));
}

#[test]
fn restart_clock_starts_from_acknowledgement() {
    let (mut g, _) = game(collision_config());
    g.update(ms(5300));
    g.handle(Message::Acknowledge, ms(20_000));

    // No stale descents or ticks from the previous round.
    g.update(ms(20_550));
    assert_eq!(g.state().score, 5 * 20);
    assert!(g.state().enemies.is_empty());

    g.update(ms(21_000));
    assert_eq!(g.state().enemies.len(), 1);
}

#[test]
fn second_round_can_end_too() {
    let (mut g, _) = game(collision_config());
    g.update(ms(5300));
    g.handle(Message::Acknowledge, ms(10_000));
    g.update(ms(15_250));
    assert!(!g.state().is_game_over());
    g.update(ms(15_300));
    assert!(g.state().is_game_over());
    assert_eq!(g.state().score, 52 * 20);
}

// ── degraded operation ────────────────────────────────────────────────────────

struct NoDevice;

impl AudioBackend for NoDevice {
    fn create_player(&mut self, asset: &Path) -> anyhow::Result<Box<dyn AudioPlayer>> {
        anyhow::bail!("cannot open {}", asset.display())
    }
}

#[test]
fn missing_audio_degrades_to_silent_play() {
    let audio = GameAudio::load(&mut NoDevice, Path::new("a.wav"), Path::new("b.wav"));
    assert!(audio.is_silent());

    let mut cfg = collision_config();
    cfg.input.tilt_enabled = false;
    let mut g = GameLoop::new(cfg, Scene::new(), audio, StdRng::seed_from_u64(1));
    g.start(Duration::ZERO);
    g.update(ms(5300));
    assert!(g.state().is_game_over());
    g.handle(Message::Acknowledge, ms(6000));
    assert!(!g.state().is_game_over());
}

#[test]
fn quit_stops_music() {
    let (mut g, log) = game(Config::default());
    assert_eq!(g.handle(Message::Quit, ms(10)), Flow::Quit);
    assert_eq!(played(&log).last().map(String::as_str), Some("music:stop"));
}
