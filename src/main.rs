use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    terminal, ExecutableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use space_ships::audio::GameAudio;
use space_ships::config::{Config, ScoringPreset};
use space_ships::display::{self, Viewport};
use space_ships::input::spawn_terminal_input;
use space_ships::surface::Scene;
use space_ships::{Flow, GameLoop, Message};

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Dodge the descending enemy ships.  Arrow keys tilt the ship.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML config; missing file means defaults.
    #[arg(long, default_value = "space_ships.toml")]
    config: PathBuf,
    /// Reward table, overriding the config file.
    #[arg(long, value_enum)]
    scoring: Option<ScoringPreset>,
    /// Seed for enemy placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Play as if the device had no gyroscope.
    #[arg(long)]
    no_tilt: bool,
    /// Disable sound.
    #[arg(long)]
    mute: bool,
    /// Write logs here (RUST_LOG filters, default `info`).
    #[arg(long)]
    log_file: Option<PathBuf>,
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// The game owns the terminal, so logs only go to a file when asked for.
fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn open_audio(cfg: &Config) -> GameAudio {
    if !cfg.audio.enabled {
        log::info!("audio disabled");
        return GameAudio::silent();
    }

    #[cfg(feature = "audio")]
    {
        match space_ships::audio::RodioBackend::open() {
            Ok(mut backend) => {
                return GameAudio::load(
                    &mut backend,
                    &cfg.audio.music_path(),
                    &cfg.audio.collision_path(),
                );
            }
            Err(e) => log::warn!("no audio device, playing silent: {e:#}"),
        }
    }
    #[cfg(not(feature = "audio"))]
    log::info!("built without the `audio` feature, playing silent");

    GameAudio::silent()
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = Config::load_from_file(&cli.config)?;
    if let Some(preset) = cli.scoring {
        cfg.scoring = preset.rules();
    }
    if cli.no_tilt {
        cfg.input.tilt_enabled = false;
    }
    if cli.mute {
        cfg.audio.enabled = false;
    }
    Ok(cfg)
}

// ── Event loop ────────────────────────────────────────────────────────────────

/// Single consumer of every message.  Input arrives from the reader thread;
/// timers are drained from the game's own scheduler between messages.
fn run<W: Write>(
    out: &mut W,
    game: &mut GameLoop<Scene, StdRng>,
    rx: &mpsc::Receiver<Message>,
    world: (f32, f32),
) -> anyhow::Result<()> {
    let clock = Instant::now();
    game.start(clock.elapsed());

    loop {
        let frame_start = Instant::now();

        game.update(clock.elapsed());
        let (cols, rows) = terminal::size()?;
        display::render(out, game.surface(), &Viewport::new(cols, rows, world.0, world.1))?;

        // Sleep until the next frame, waking for input.
        loop {
            let left = FRAME.saturating_sub(frame_start.elapsed());
            let msg = match rx.recv_timeout(left) {
                Ok(msg) => msg,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };
            if game.handle(msg, clock.elapsed()) == Flow::Quit {
                return Ok(());
            }
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let cfg = load_config(&cli)?;

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let world = (cfg.screen.width, cfg.screen.height);
    let input_cfg = cfg.input.clone();
    let audio = open_audio(&cfg);
    let mut game = GameLoop::new(cfg, Scene::new(), audio, rng);

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Key-repeat reporting where the terminal supports it; others fall back.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let (tx, rx) = mpsc::channel::<Message>();
    spawn_terminal_input(tx, input_cfg);

    let result = run(&mut out, &mut game, &rx, world);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}
