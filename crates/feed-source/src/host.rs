use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The environment refused to start playback without a user gesture.
    #[error("autoplay blocked until user interaction")]
    AutoplayBlocked,
    #[error("media failed to load: {0}")]
    Load(String),
    #[error("embedded player failed to initialise: {0}")]
    PlayerInit(String),
    #[error("failed to release player: {0}")]
    Release(String),
}

/// Opaque id of a player instance created by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlayerHandle(pub u64);

/// Playback flags for file feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilePlayback {
    pub muted: bool,
    pub autoplay: bool,
    pub looping: bool,
}

impl FilePlayback {
    /// Muted, autoplaying, looping: the only combination browsers reliably
    /// allow without interaction.
    pub const BACKGROUND: FilePlayback = FilePlayback {
        muted: true,
        autoplay: true,
        looping: true,
    };
}

/// The environment a feed adapter drives: a media element for file feeds and
/// a player runtime for embedded feeds. Stream-image feeds need nothing from it.
pub trait PlaybackHost {
    fn play_file(&mut self, url: &str, playback: FilePlayback) -> Result<(), PlaybackError>;

    /// Whether the embedded player runtime has finished loading.
    fn player_runtime_ready(&self) -> bool;

    fn create_player(&mut self, video_id: &str) -> Result<PlayerHandle, PlaybackError>;

    fn play_player(&mut self, handle: PlayerHandle);

    fn release_player(&mut self, handle: PlayerHandle) -> Result<(), PlaybackError>;
}

/// Host with no real media stack. Every request succeeds; it only tracks which
/// players are alive so leaks are observable.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    next_player: u64,
    live_players: HashSet<PlayerHandle>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_players(&self) -> usize {
        self.live_players.len()
    }
}

impl PlaybackHost for HeadlessHost {
    fn play_file(&mut self, _url: &str, _playback: FilePlayback) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn player_runtime_ready(&self) -> bool {
        true
    }

    fn create_player(&mut self, _video_id: &str) -> Result<PlayerHandle, PlaybackError> {
        self.next_player += 1;
        let handle = PlayerHandle(self.next_player);
        self.live_players.insert(handle);
        Ok(handle)
    }

    fn play_player(&mut self, _handle: PlayerHandle) {}

    fn release_player(&mut self, handle: PlayerHandle) -> Result<(), PlaybackError> {
        if self.live_players.remove(&handle) {
            Ok(())
        } else {
            Err(PlaybackError::Release(format!("unknown player {}", handle.0)))
        }
    }
}
