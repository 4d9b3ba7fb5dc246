//! Tilt input: turns angular-velocity readings into horizontal displacement,
//! and feeds the controller from the terminal.
//!
//! Terminals have no gyroscope, so the arrow keys (and A/D) stand in for one:
//! each press is reported as a single reading with a fixed angular velocity on
//! the x axis.  Every reading maps to exactly one position update; there is no
//! smoothing or accumulation.

use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::InputConfig;
use crate::controller::Message;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AngularVelocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// One orientation-change sample.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TiltReading {
    pub angular_velocity: AngularVelocity,
}

impl TiltReading {
    pub fn around_x(x: f32) -> Self {
        Self {
            angular_velocity: AngularVelocity { x, ..Default::default() },
        }
    }
}

/// Maps readings to `delta_x = angular_velocity.x * sensitivity`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltAdapter {
    sensitivity: f32,
}

impl TiltAdapter {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    pub fn displacement(&self, reading: &TiltReading) -> f32 {
        reading.angular_velocity.x * self.sensitivity
    }
}

// ── Terminal key mapping ─────────────────────────────────────────────────────

/// Translate one key event into a controller message.
///
/// Tilt keys produce nothing when tilt is disabled; that is the terminal
/// equivalent of a device without a gyroscope.
pub fn map_key(key: &KeyEvent, cfg: &InputConfig) -> Option<Message> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(Message::Quit)
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Message::Quit),
        KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => Some(Message::Acknowledge),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') if cfg.tilt_enabled => {
            Some(Message::Tilt(TiltReading::around_x(-cfg.key_tilt)))
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') if cfg.tilt_enabled => {
            Some(Message::Tilt(TiltReading::around_x(cfg.key_tilt)))
        }
        _ => None,
    }
}

/// Dedicate a thread to blocking terminal reads, posting every mapped event
/// to the controller's queue.  The thread ends when the receiver is dropped
/// or the terminal stops producing events.
pub fn spawn_terminal_input(tx: Sender<Message>, cfg: InputConfig) -> JoinHandle<()> {
    if !cfg.tilt_enabled {
        log::warn!("tilt input disabled, ship position is frozen");
    }
    thread::spawn(move || loop {
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(e) => {
                log::warn!("terminal input stopped: {e}");
                break;
            }
        };
        let msg = match ev {
            Event::Key(key) => map_key(&key, &cfg),
            Event::Resize(..) => Some(Message::Redraw),
            _ => None,
        };
        if let Some(msg) = msg {
            if tx.send(msg).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    })
}
