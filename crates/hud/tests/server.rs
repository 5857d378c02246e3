use std::sync::{Arc, Mutex, Once};

use actix_web::{App, http::StatusCode, test, web};
use hud::dashboard::{
    DataMode, Poller, SnapshotStore,
    feeds::FeedBoard,
    scheduler::RetryPolicy,
    server::{ServerState, routes},
    source::SimulatedSource,
};
use serde_json::{Value, json};
use telemetry_sim::{ManualClock, MockConfig, MockSimulator};

struct NoPause;

impl hud::dashboard::Pause for NoPause {
    fn pause(&self, _delay: std::time::Duration) -> bool {
        true
    }
}

fn state(mode: DataMode) -> ServerState {
    static METRICS: Once = Once::new();
    METRICS.call_once(|| {
        hud::dashboard::telemetry::init_metrics_recorder();
    });

    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let mock = MockConfig {
        live_url: "https://cdn.example/live.mp4".into(),
        manipulated_url: "https://cdn.example/manipulated.mp4".into(),
        seed: Some(5),
    };
    let store = SnapshotStore::shared(mode);
    let poller = Arc::new(Poller::new(
        mode,
        Box::new(SimulatedSource::new("mock", MockSimulator::new(mock.clone(), clock.clone()))),
        Box::new(MockSimulator::new(mock, clock)),
        store.clone(),
        RetryPolicy::default(),
        Box::new(NoPause),
    ));
    ServerState {
        mode,
        store,
        poller,
        feeds: Arc::new(Mutex::new(FeedBoard::headless())),
    }
}

#[actix_web::test]
async fn dashboard_is_empty_until_first_refresh() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(DataMode::Mock)))
            .configure(routes),
    )
    .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/dashboard").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let view: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/view").to_request())
            .await;
    assert_eq!(view["isLoading"], true);
    assert_eq!(view["isError"], false);
    assert_eq!(view["mode"], "mock");

    let refresh = test::TestRequest::post().uri("/api/refresh").to_request();
    let resp = test::call_service(&app, refresh).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["generation"], 1);
    assert_eq!(body["applied"], true);
    assert_eq!(body["fallback"], false);

    let snapshot: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/api/dashboard").to_request(),
    )
    .await;
    assert!(snapshot["detections"].as_array().is_some_and(|d| !d.is_empty()));
    assert_eq!(snapshot["feeds"]["live"]["url"], "https://cdn.example/live.mp4");
}

#[actix_web::test]
async fn overlay_is_served_as_png() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(DataMode::Mock)))
            .configure(routes),
    )
    .await;
    test::call_service(&app, test::TestRequest::post().uri("/api/refresh").to_request()).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/overlay/live.png?highlightTarget=false")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let body = test::read_body(resp).await;
    assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/overlay/thermal.png").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn health_and_metrics_respond() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(DataMode::Mock)))
            .configure(routes),
    )
    .await;

    let health: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
    assert_eq!(health["status"], "ok");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn feeds_report_after_sync() {
    let state = state(DataMode::Mock);
    state.poller.poll_once();
    let snapshot = state.store.lock().unwrap().latest().unwrap();
    state.feeds.lock().unwrap().sync(&snapshot, 0);

    let app = test::init_service(App::new().app_data(web::Data::new(state)).configure(routes)).await;
    let feeds: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/feeds").to_request())
            .await;
    let feeds = feeds.as_array().expect("array of feed statuses");
    assert_eq!(feeds.len(), 2);
    assert_eq!(feeds[0]["feed"], "live");
    assert_eq!(feeds[0]["kind"], "file");
}

fn feed_event(feed: &str, event: &str) -> test::TestRequest {
    test::TestRequest::post()
        .uri(&format!("/api/feeds/{feed}/events"))
        .set_json(json!({ "event": event }))
}

fn mounted_app_state() -> ServerState {
    let state = state(DataMode::Mock);
    state.poller.poll_once();
    let snapshot = state.store.lock().unwrap().latest().unwrap();
    state.feeds.lock().unwrap().sync(&snapshot, 0);
    state
}

#[actix_web::test]
async fn load_error_marks_feed_signal_lost() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(mounted_app_state()))
            .configure(routes),
    )
    .await;

    let status: Value =
        test::call_and_read_body_json(&app, feed_event("live", "load-error").to_request()).await;
    assert_eq!(status["feed"], "live");
    assert_eq!(status["state"], "error");
    assert_eq!(status["status"], "signal-lost");

    let feeds: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/feeds").to_request())
            .await;
    assert_eq!(feeds[0]["status"], "signal-lost");
    assert_eq!(feeds[1]["status"], "ready");
}

#[actix_web::test]
async fn gesture_recovers_a_blocked_autoplay() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(mounted_app_state()))
            .configure(routes),
    )
    .await;

    let status: Value = test::call_and_read_body_json(
        &app,
        feed_event("manipulated", "autoplay-rejected").to_request(),
    )
    .await;
    assert_eq!(status["status"], "needs-interaction");

    let status: Value =
        test::call_and_read_body_json(&app, feed_event("manipulated", "user-gesture").to_request())
            .await;
    assert_eq!(status["status"], "ready");
}

#[actix_web::test]
async fn feed_events_reject_unknown_feeds_and_events() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state(DataMode::Mock)))
            .configure(routes),
    )
    .await;

    let resp = test::call_service(&app, feed_event("live", "load-error").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, feed_event("thermal", "load-error").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, feed_event("live", "exploded").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
