//! Space Ships: dodge the descending enemy fleet by tilting your ship.
//!
//! Modules, leaves first:
//! - `entities`: plain data (player, enemies, game state)
//! - `compute`: pure position, collision and scoring rules
//! - `input`: tilt readings → horizontal displacement
//! - `scheduler`: repeating and one-shot timers on a caller-driven clock
//! - `spawner`: the enemy spawn cycle
//! - `controller`: the single-owner game loop and Game Over / Restart cycle
//! - `audio`, `surface`, `display`: the outside world

pub mod audio;
pub mod compute;
pub mod config;
pub mod controller;
pub mod display;
pub mod entities;
pub mod input;
pub mod scheduler;
pub mod spawner;
pub mod surface;

pub use config::Config;
pub use controller::{Flow, GameLoop, Message};
