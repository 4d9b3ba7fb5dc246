//! Audio playback behind a small handle abstraction.
//!
//! The game asks a backend for two handles, a looping background track and a
//! one-shot collision effect, and only ever says play or stop.  Any failure to
//! open the device or load an asset is logged and the game carries on silent.

use std::path::Path;

/// A playback handle for one loaded asset.
pub trait AudioPlayer {
    fn set_looping(&mut self, looping: bool);
    fn play(&mut self);
    fn stop(&mut self);
}

/// Creates playback handles from asset files.
pub trait AudioBackend {
    fn create_player(&mut self, asset: &Path) -> anyhow::Result<Box<dyn AudioPlayer>>;
}

/// Background music plus collision effect, either of which may be missing.
#[derive(Default)]
pub struct GameAudio {
    music: Option<Box<dyn AudioPlayer>>,
    collision: Option<Box<dyn AudioPlayer>>,
}

impl GameAudio {
    /// No sound at all.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Load both handles, dropping whichever cannot be created.
    pub fn load(backend: &mut dyn AudioBackend, music: &Path, collision: &Path) -> Self {
        let music = match backend.create_player(music) {
            Ok(mut player) => {
                player.set_looping(true);
                Some(player)
            }
            Err(e) => {
                log::warn!("background music unavailable ({}): {e:#}", music.display());
                None
            }
        };
        let collision = match backend.create_player(collision) {
            Ok(player) => Some(player),
            Err(e) => {
                log::warn!("collision sound unavailable ({}): {e:#}", collision.display());
                None
            }
        };
        Self { music, collision }
    }

    pub fn from_players(
        music: Option<Box<dyn AudioPlayer>>,
        collision: Option<Box<dyn AudioPlayer>>,
    ) -> Self {
        Self { music, collision }
    }

    pub fn start_music(&mut self) {
        if let Some(music) = &mut self.music {
            music.play();
        }
    }

    pub fn stop_music(&mut self) {
        if let Some(music) = &mut self.music {
            music.stop();
        }
    }

    pub fn play_collision(&mut self) {
        if let Some(sfx) = &mut self.collision {
            sfx.play();
        }
    }

    pub fn is_silent(&self) -> bool {
        self.music.is_none() && self.collision.is_none()
    }
}

#[cfg(feature = "audio")]
pub use device::RodioBackend;

#[cfg(feature = "audio")]
mod device {
    use std::io::Cursor;
    use std::path::Path;
    use std::rc::Rc;
    use std::sync::Arc;

    use anyhow::Context;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

    use super::{AudioBackend, AudioPlayer};

    /// Plays assets on the default output device.
    pub struct RodioBackend {
        stream: Rc<OutputStream>,
        handle: OutputStreamHandle,
    }

    impl RodioBackend {
        pub fn open() -> anyhow::Result<Self> {
            let (stream, handle) =
                OutputStream::try_default().context("opening default audio output")?;
            Ok(Self {
                stream: Rc::new(stream),
                handle,
            })
        }
    }

    impl AudioBackend for RodioBackend {
        fn create_player(&mut self, asset: &Path) -> anyhow::Result<Box<dyn AudioPlayer>> {
            let bytes = std::fs::read(asset)
                .with_context(|| format!("reading {}", asset.display()))?;
            let bytes: Arc<[u8]> = bytes.into();
            // Decode once up front so a bad file is caught at load time.
            Decoder::new(Cursor::new(bytes.clone()))
                .with_context(|| format!("decoding {}", asset.display()))?;
            Ok(Box::new(RodioPlayer {
                _stream: self.stream.clone(),
                handle: self.handle.clone(),
                bytes,
                looping: false,
                sink: None,
            }))
        }
    }

    struct RodioPlayer {
        // Dropping the last stream reference silences every sink, so each
        // player keeps one.
        _stream: Rc<OutputStream>,
        handle: OutputStreamHandle,
        bytes: Arc<[u8]>,
        looping: bool,
        sink: Option<Sink>,
    }

    impl AudioPlayer for RodioPlayer {
        fn set_looping(&mut self, looping: bool) {
            self.looping = looping;
        }

        fn play(&mut self) {
            self.stop();
            let sink = match Sink::try_new(&self.handle) {
                Ok(sink) => sink,
                Err(e) => {
                    log::warn!("audio sink unavailable: {e}");
                    return;
                }
            };
            let source = match Decoder::new(Cursor::new(self.bytes.clone())) {
                Ok(source) => source,
                Err(e) => {
                    log::warn!("audio decode failed: {e}");
                    return;
                }
            };
            if self.looping {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
            self.sink = Some(sink);
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
        }
    }
}
