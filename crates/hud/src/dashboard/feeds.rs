use std::collections::BTreeMap;

use feed_source::{
    AdapterConfig, EmbedMode, FeedAdapter, FeedEvent, FeedKind, FeedState, HeadlessHost,
    PlaybackHost, SurfaceStatus,
};
use hud_model::{DashboardSnapshot, FeedId};
use serde::Serialize;
use tracing::info;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    pub feed: FeedId,
    pub url: String,
    pub kind: FeedKind,
    pub state: FeedState,
    pub status: SurfaceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed_mode: Option<EmbedMode>,
}

/// One adapter per feed, remounted whenever a snapshot changes that feed's URL.
pub struct FeedBoard<H = HeadlessHost> {
    host: H,
    config: AdapterConfig,
    adapters: BTreeMap<FeedId, FeedAdapter>,
}

impl FeedBoard<HeadlessHost> {
    pub fn headless() -> Self {
        Self::new(HeadlessHost::new(), AdapterConfig::default())
    }
}

impl<H: PlaybackHost> FeedBoard<H> {
    pub fn new(host: H, config: AdapterConfig) -> Self {
        Self {
            host,
            config,
            adapters: BTreeMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Follow the feed URLs of `snapshot`, then advance every adapter to `now_ms`.
    pub fn sync(&mut self, snapshot: &DashboardSnapshot, now_ms: u64) {
        for feed in FeedId::ALL {
            let url = snapshot.feeds.get(feed).url.as_str();
            if self.adapters.get(&feed).is_some_and(|adapter| adapter.url() == url) {
                continue;
            }
            if let Some(mut old) = self.adapters.remove(&feed) {
                old.teardown(&mut self.host);
            }
            info!(%feed, url, kind = FeedKind::from_url(url).label(), "feed source changed");
            let mut adapter = FeedAdapter::new(url, self.config.clone());
            adapter.mount(&mut self.host, now_ms);
            self.adapters.insert(feed, adapter);
        }
        self.tick(now_ms);
    }

    pub fn tick(&mut self, now_ms: u64) {
        for adapter in self.adapters.values_mut() {
            adapter.pump(&mut self.host, now_ms);
        }
    }

    /// Queue an event for `feed`; applied on the next tick.
    pub fn push(&mut self, feed: FeedId, event: FeedEvent) {
        if let Some(adapter) = self.adapters.get_mut(&feed) {
            adapter.push(event);
        }
    }

    pub fn adapter(&self, feed: FeedId) -> Option<&FeedAdapter> {
        self.adapters.get(&feed)
    }

    pub fn statuses(&self) -> Vec<FeedStatus> {
        self.adapters
            .iter()
            .map(|(feed, adapter)| FeedStatus {
                feed: *feed,
                url: adapter.url().to_string(),
                kind: adapter.kind(),
                state: adapter.state(),
                status: adapter.status(),
                embed_mode: adapter.embed_mode(),
            })
            .collect()
    }

    pub fn teardown(&mut self) {
        for (_, mut adapter) in std::mem::take(&mut self.adapters) {
            adapter.teardown(&mut self.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hud_model::Feed;
    use telemetry_sim::{DemoSimulator, ManualClock, SnapshotGenerator};

    use super::*;

    fn demo_snapshot() -> DashboardSnapshot {
        DemoSimulator::new("/VIP1.jpg", Arc::new(ManualClock::new(0))).generate()
    }

    #[test]
    fn embedded_feeds_connect_then_turn_ready() {
        let mut board = FeedBoard::headless();
        let snapshot = demo_snapshot();

        board.sync(&snapshot, 0);
        let statuses = board.statuses();
        assert_eq!(statuses.len(), 2);
        assert!(statuses.iter().all(|s| s.kind == FeedKind::EmbeddedPlayer));
        assert!(statuses.iter().all(|s| s.status == SurfaceStatus::Connecting));

        board.sync(&snapshot, 1_000);
        assert!(board.statuses().iter().all(|s| s.status == SurfaceStatus::Ready));
        assert_eq!(board.host().live_players(), 2);
    }

    #[test]
    fn url_change_remounts_only_that_feed() {
        let mut board = FeedBoard::headless();
        let mut snapshot = demo_snapshot();
        board.sync(&snapshot, 0);
        board.sync(&snapshot, 1_000);

        snapshot.feeds.live = Feed::mp4("/media/live.mp4");
        board.sync(&snapshot, 2_000);

        let live = board.adapter(FeedId::Live).unwrap();
        assert_eq!(live.kind(), FeedKind::File);
        assert_eq!(live.state(), FeedState::Ready);
        let manipulated = board.adapter(FeedId::Manipulated).unwrap();
        assert_eq!(manipulated.kind(), FeedKind::EmbeddedPlayer);
        assert_eq!(board.host().live_players(), 1);
    }

    #[test]
    fn empty_urls_show_no_signal() {
        let mut board = FeedBoard::headless();
        let mut snapshot = demo_snapshot();
        snapshot.feeds.live = Feed::mp4("");
        board.sync(&snapshot, 0);
        assert_eq!(
            board.adapter(FeedId::Live).unwrap().status(),
            SurfaceStatus::NoSignal
        );
    }

    #[test]
    fn teardown_releases_players() {
        let mut board = FeedBoard::headless();
        let snapshot = demo_snapshot();
        board.sync(&snapshot, 0);
        board.sync(&snapshot, 1_000);
        board.teardown();
        assert_eq!(board.host().live_players(), 0);
        assert!(board.statuses().is_empty());
    }
}
