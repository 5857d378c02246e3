//! Per-kind playback lifecycles.
//!
//! Each feed kind gets one handler implementing [`Lifecycle`]. Handlers never
//! own the timer queue or the state; the adapter lends them through [`Cx`]
//! for the duration of one call.

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    adapter::{AdapterConfig, FeedEvent, FeedState},
    host::{FilePlayback, PlaybackError, PlaybackHost, PlayerHandle},
    kind::{FeedKind, embedded_video_id},
    timers::{TimerKind, TimerQueue},
};

/// How much control the adapter has over an embedded player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmbedMode {
    /// Player not created yet.
    Pending,
    /// Player created; the adapter restarts it after it ends.
    Controlled,
    /// Player could not be created; the embed plays on its own, no looping control.
    Passive,
}

pub(crate) struct Cx<'a> {
    pub state: &'a mut FeedState,
    pub timers: &'a mut TimerQueue,
    pub host: &'a mut dyn PlaybackHost,
    pub config: &'a AdapterConfig,
    pub url: &'a str,
    pub now_ms: u64,
}

impl Cx<'_> {
    pub fn transition(&mut self, next: FeedState) {
        if *self.state != next {
            debug!(url = self.url, from = ?*self.state, to = ?next, "feed state");
            *self.state = next;
        }
    }

    pub fn fail(&mut self, err: &PlaybackError) {
        warn!(url = self.url, %err, "feed failed");
        self.timers.cancel_all();
        self.transition(FeedState::Error);
    }

    fn after(&mut self, kind: TimerKind, delay_ms: u64) {
        self.timers.schedule(kind, self.now_ms + delay_ms);
    }
}

pub(crate) trait Lifecycle {
    fn start(&mut self, cx: &mut Cx<'_>);

    fn on_event(&mut self, event: FeedEvent, cx: &mut Cx<'_>);

    fn on_timer(&mut self, _timer: TimerKind, _cx: &mut Cx<'_>) {}

    fn teardown(&mut self, _host: &mut dyn PlaybackHost) {}
}

/// Continuously replaced still image. The host renders it directly; the only
/// thing the adapter reacts to is a load failure.
#[derive(Debug, Default)]
pub(crate) struct StreamImageHandler;

impl Lifecycle for StreamImageHandler {
    fn start(&mut self, _cx: &mut Cx<'_>) {}

    fn on_event(&mut self, event: FeedEvent, cx: &mut Cx<'_>) {
        if event == FeedEvent::LoadError {
            cx.fail(&PlaybackError::Load("stream image".into()));
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct FileHandler;

impl FileHandler {
    fn play(&self, cx: &mut Cx<'_>) {
        match cx.host.play_file(cx.url, FilePlayback::BACKGROUND) {
            Ok(()) => cx.transition(FeedState::Ready),
            Err(PlaybackError::AutoplayBlocked) => {
                debug!(url = cx.url, "autoplay blocked, waiting for a gesture");
                cx.transition(FeedState::NeedsInteraction);
            }
            Err(err) => cx.fail(&err),
        }
    }
}

impl Lifecycle for FileHandler {
    fn start(&mut self, cx: &mut Cx<'_>) {
        cx.transition(FeedState::Ready);
        self.play(cx);
    }

    fn on_event(&mut self, event: FeedEvent, cx: &mut Cx<'_>) {
        match event {
            FeedEvent::LoadError => cx.fail(&PlaybackError::Load("media element".into())),
            FeedEvent::AutoplayRejected => cx.transition(FeedState::NeedsInteraction),
            FeedEvent::UserGesture if *cx.state == FeedState::NeedsInteraction => self.play(cx),
            // The element loops natively.
            FeedEvent::UserGesture | FeedEvent::PlaybackEnded => {}
        }
    }
}

#[derive(Debug)]
pub(crate) struct EmbeddedHandler {
    video_id: Option<String>,
    player: Option<PlayerHandle>,
    mode: EmbedMode,
    polls: u32,
}

impl EmbeddedHandler {
    pub fn new(url: &str) -> Self {
        Self {
            video_id: embedded_video_id(url).map(str::to_owned),
            player: None,
            mode: EmbedMode::Pending,
            polls: 0,
        }
    }

    pub fn mode(&self) -> EmbedMode {
        self.mode
    }

    fn go_passive(&mut self, cx: &Cx<'_>, reason: &str) {
        warn!(url = cx.url, reason, "embedded player unavailable, using passive embed");
        self.mode = EmbedMode::Passive;
    }

    fn init_player(&mut self, cx: &mut Cx<'_>) {
        let Some(video_id) = self.video_id.as_deref() else {
            self.go_passive(cx, "no video id in url");
            return;
        };
        match cx.host.create_player(video_id) {
            Ok(handle) => {
                debug!(url = cx.url, video_id, player = handle.0, "embedded player created");
                self.player = Some(handle);
                self.mode = EmbedMode::Controlled;
                cx.host.play_player(handle);
            }
            Err(err) => self.go_passive(cx, &err.to_string()),
        }
    }
}

impl Lifecycle for EmbeddedHandler {
    fn start(&mut self, cx: &mut Cx<'_>) {
        let delay = cx.config.reveal_delay_ms;
        cx.after(TimerKind::Reveal, delay);
    }

    fn on_event(&mut self, event: FeedEvent, cx: &mut Cx<'_>) {
        if event != FeedEvent::PlaybackEnded || self.mode != EmbedMode::Controlled {
            return;
        }
        if *cx.state == FeedState::Ready {
            cx.transition(FeedState::Looping);
            let delay = cx.config.restart_delay_ms;
            cx.after(TimerKind::Restart, delay);
        }
    }

    fn on_timer(&mut self, timer: TimerKind, cx: &mut Cx<'_>) {
        match timer {
            TimerKind::Reveal => {
                cx.transition(FeedState::Ready);
                if cx.host.player_runtime_ready() {
                    self.init_player(cx);
                } else {
                    let delay = cx.config.runtime_poll_ms;
                    cx.after(TimerKind::RuntimePoll, delay);
                }
            }
            TimerKind::RuntimePoll => {
                self.polls += 1;
                if cx.host.player_runtime_ready() {
                    self.init_player(cx);
                } else if self.polls >= cx.config.runtime_poll_limit {
                    self.go_passive(cx, "player runtime never loaded");
                } else {
                    let delay = cx.config.runtime_poll_ms;
                    cx.after(TimerKind::RuntimePoll, delay);
                }
            }
            TimerKind::Restart => {
                cx.transition(FeedState::Ready);
                if let Some(handle) = self.player {
                    cx.host.play_player(handle);
                }
            }
        }
    }

    fn teardown(&mut self, host: &mut dyn PlaybackHost) {
        if let Some(handle) = self.player.take() {
            if let Err(err) = host.release_player(handle) {
                debug!(player = handle.0, %err, "ignoring player release failure");
            }
        }
    }
}

/// Tagged handler, one variant per [`FeedKind`].
#[derive(Debug)]
pub(crate) enum FeedHandler {
    StreamImage(StreamImageHandler),
    File(FileHandler),
    Embedded(EmbeddedHandler),
}

impl FeedHandler {
    pub fn for_kind(kind: FeedKind, url: &str) -> Self {
        match kind {
            FeedKind::StreamImage => FeedHandler::StreamImage(StreamImageHandler),
            FeedKind::File => FeedHandler::File(FileHandler),
            FeedKind::EmbeddedPlayer => FeedHandler::Embedded(EmbeddedHandler::new(url)),
        }
    }

    pub fn embed_mode(&self) -> Option<EmbedMode> {
        match self {
            FeedHandler::Embedded(handler) => Some(handler.mode()),
            _ => None,
        }
    }

    fn inner(&mut self) -> &mut dyn Lifecycle {
        match self {
            FeedHandler::StreamImage(handler) => handler,
            FeedHandler::File(handler) => handler,
            FeedHandler::Embedded(handler) => handler,
        }
    }
}

impl Lifecycle for FeedHandler {
    fn start(&mut self, cx: &mut Cx<'_>) {
        self.inner().start(cx);
    }

    fn on_event(&mut self, event: FeedEvent, cx: &mut Cx<'_>) {
        self.inner().on_event(event, cx);
    }

    fn on_timer(&mut self, timer: TimerKind, cx: &mut Cx<'_>) {
        self.inner().on_timer(timer, cx);
    }

    fn teardown(&mut self, host: &mut dyn PlaybackHost) {
        self.inner().teardown(host);
    }
}
