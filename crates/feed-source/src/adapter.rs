use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    host::PlaybackHost,
    kind::FeedKind,
    lifecycle::{Cx, EmbedMode, FeedHandler, Lifecycle},
    timers::{REVEAL_DELAY_MS, RUNTIME_POLL_MS, TimerQueue},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedState {
    Uninitialized,
    Classified,
    /// Embedded player finished and is hidden until it restarts.
    Looping,
    Ready,
    NeedsInteraction,
    /// Terminal until the adapter is remounted.
    Error,
}

/// What the operator should see in place of the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceStatus {
    NoSignal,
    Connecting,
    Ready,
    NeedsInteraction,
    SignalLost,
}

/// Signals reported by whatever is actually displaying the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeedEvent {
    LoadError,
    AutoplayRejected,
    UserGesture,
    PlaybackEnded,
}

#[derive(Clone, Debug)]
pub struct AdapterConfig {
    pub reveal_delay_ms: u64,
    pub restart_delay_ms: u64,
    pub runtime_poll_ms: u64,
    /// Runtime polls before the embed is treated as uninitialisable.
    pub runtime_poll_limit: u32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: REVEAL_DELAY_MS,
            restart_delay_ms: REVEAL_DELAY_MS,
            runtime_poll_ms: RUNTIME_POLL_MS,
            runtime_poll_limit: 50,
        }
    }
}

/// Playback state machine for one feed URL.
///
/// Events are queued with [`push`](Self::push) and applied, together with any
/// timers due, by [`pump`](Self::pump). A new URL means a new adapter: tear the
/// old one down and mount a fresh one.
#[derive(Debug)]
pub struct FeedAdapter {
    url: String,
    kind: FeedKind,
    state: FeedState,
    handler: FeedHandler,
    timers: TimerQueue,
    events: VecDeque<FeedEvent>,
    config: AdapterConfig,
}

impl FeedAdapter {
    pub fn new(url: impl Into<String>, config: AdapterConfig) -> Self {
        let url = url.into();
        let kind = FeedKind::from_url(&url);
        Self {
            handler: FeedHandler::for_kind(kind, &url),
            url,
            kind,
            state: FeedState::Uninitialized,
            timers: TimerQueue::default(),
            events: VecDeque::new(),
            config,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> FeedKind {
        self.kind
    }

    pub fn state(&self) -> FeedState {
        self.state
    }

    pub fn embed_mode(&self) -> Option<EmbedMode> {
        self.handler.embed_mode()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn has_signal(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Classify and start the lifecycle. An empty URL never starts one.
    pub fn mount(&mut self, host: &mut dyn PlaybackHost, now_ms: u64) {
        if !self.has_signal() || self.state != FeedState::Uninitialized {
            return;
        }
        debug!(url = %self.url, kind = self.kind.label(), "mounting feed");
        self.state = FeedState::Classified;
        self.handler = FeedHandler::for_kind(self.kind, &self.url);
        let mut cx = Cx {
            state: &mut self.state,
            timers: &mut self.timers,
            host,
            config: &self.config,
            url: &self.url,
            now_ms,
        };
        self.handler.start(&mut cx);
    }

    pub fn push(&mut self, event: FeedEvent) {
        self.events.push_back(event);
    }

    /// Apply queued events in order, then every timer due at `now_ms`.
    /// Timers fire with their own deadline as the current time, so follow-up
    /// delays are measured from when they were due.
    pub fn pump(&mut self, host: &mut dyn PlaybackHost, now_ms: u64) {
        if self.state == FeedState::Uninitialized {
            self.events.clear();
            return;
        }

        while let Some(event) = self.events.pop_front() {
            if self.state == FeedState::Error {
                self.events.clear();
                break;
            }
            let mut cx = Cx {
                state: &mut self.state,
                timers: &mut self.timers,
                host: &mut *host,
                config: &self.config,
                url: &self.url,
                now_ms,
            };
            self.handler.on_event(event, &mut cx);
        }

        while self.state != FeedState::Error {
            let Some((timer, deadline)) = self.timers.pop_due(now_ms) else {
                break;
            };
            let mut cx = Cx {
                state: &mut self.state,
                timers: &mut self.timers,
                host: &mut *host,
                config: &self.config,
                url: &self.url,
                now_ms: deadline,
            };
            self.handler.on_timer(timer, &mut cx);
        }
    }

    /// Cancel pending timers and release whatever the handler owns.
    pub fn teardown(&mut self, host: &mut dyn PlaybackHost) {
        self.timers.cancel_all();
        self.events.clear();
        self.handler.teardown(host);
        self.state = FeedState::Uninitialized;
    }

    pub fn status(&self) -> SurfaceStatus {
        if !self.has_signal() {
            return SurfaceStatus::NoSignal;
        }
        match (self.kind, self.state) {
            (_, FeedState::Error) => SurfaceStatus::SignalLost,
            (_, FeedState::NeedsInteraction) => SurfaceStatus::NeedsInteraction,
            (_, FeedState::Ready) => SurfaceStatus::Ready,
            (FeedKind::StreamImage, FeedState::Classified) => SurfaceStatus::Ready,
            _ => SurfaceStatus::Connecting,
        }
    }

    pub fn surface_visible(&self) -> bool {
        matches!(
            self.status(),
            SurfaceStatus::Ready | SurfaceStatus::NeedsInteraction
        )
    }

    pub fn shows_connecting(&self) -> bool {
        self.status() == SurfaceStatus::Connecting
    }
}
