//! Actix Web surface exposing the dashboard view, an SSE snapshot stream,
//! feed status and playback events, rendered overlays and Prometheus metrics.
//!
//! The server runs on its own thread with its own Actix system so the poller
//! never shares a runtime with request handling.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use actix_web::{
    App, HttpResponse, HttpServer,
    http::header,
    web::{self, Bytes},
};
use anyhow::{Context, Result};
use async_stream::stream;
use chrono::{SecondsFormat, Utc};
use feed_source::FeedEvent;
use hud_model::FeedId;
use overlay::{DisplayFlags, OverlayRenderer, RasterSurface};
use serde::{Deserialize, Serialize};
use serde_json::{json, to_string};
use telemetry_sim::{Clock, SystemClock};
use tokio::sync::oneshot;
use tracing::{debug, error, info};

use crate::dashboard::{
    config::DataMode,
    poller::{PollOutcome, Poller},
    service::SharedFeeds,
    store::{SharedStore, lock},
    telemetry,
};

const SSE_TICK: Duration = Duration::from_millis(250);

/// Shared state backing HTTP handlers.
#[derive(Clone)]
pub struct ServerState {
    pub mode: DataMode,
    pub store: SharedStore,
    pub poller: Arc<Poller>,
    pub feeds: SharedFeeds,
}

/// Handle for the HTTP server thread.
pub struct HttpSurface {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl HttpSurface {
    /// Signal the server to stop and block until the thread exits.
    pub fn stop(self) {
        if let Some(tx) = self.shutdown {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle {
            let _ = handle.join();
        }
    }
}

/// Bind `addr` and serve on a dedicated thread.
pub fn spawn_http_surface(addr: SocketAddr, state: ServerState) -> Result<HttpSurface> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let handle = telemetry::spawn_thread("hud-http", move || {
        if let Err(err) = actix_web::rt::System::new().block_on(async move {
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(web::Data::new(state.clone()))
                    .configure(routes)
            })
            .bind(addr)?
            .run();
            info!(%addr, "HTTP surface listening");

            let srv_handle = server.handle();
            actix_web::rt::spawn(async move {
                let _ = shutdown_rx.await;
                srv_handle.stop(true).await;
            });

            server.await
        }) {
            error!("HTTP server error: {err}");
        }
    })
    .context("failed to spawn HTTP server thread")?;

    Ok(HttpSurface {
        shutdown: Some(shutdown_tx),
        handle: Some(handle),
    })
}

/// Route table, shared with the handler tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/dashboard", web::get().to(dashboard_handler))
        .route("/api/view", web::get().to(view_handler))
        .route("/api/stream", web::get().to(stream_handler))
        .route("/api/refresh", web::post().to(refresh_handler))
        .route("/api/feeds", web::get().to(feeds_handler))
        .route("/api/feeds/{feed}/events", web::post().to(feed_event_handler))
        .route("/overlay/{feed}.png", web::get().to(overlay_handler))
        .route("/health", web::get().to(health_handler))
        .route("/metrics", web::get().to(metrics_handler));
}

fn with_cors(mut builder: actix_web::HttpResponseBuilder) -> actix_web::HttpResponseBuilder {
    builder
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST"))
        .insert_header((header::ACCESS_CONTROL_EXPOSE_HEADERS, "Content-Type"));
    builder
}

/// Latest snapshot; 204 while loading, 503 once loading has failed outright.
async fn dashboard_handler(state: web::Data<ServerState>) -> HttpResponse {
    let view = lock(&state.store).view();
    match view.snapshot {
        Some(snapshot) => with_cors(HttpResponse::Ok()).json(&*snapshot),
        None if view.is_error => with_cors(HttpResponse::ServiceUnavailable())
            .json(json!({ "error": "no snapshot available" })),
        None => with_cors(HttpResponse::NoContent()).finish(),
    }
}

async fn view_handler(state: web::Data<ServerState>) -> HttpResponse {
    let view = lock(&state.store).view();
    with_cors(HttpResponse::Ok()).json(view)
}

/// One SSE `data:` frame per newly applied snapshot.
async fn stream_handler(state: web::Data<ServerState>) -> HttpResponse {
    let state = state.clone();
    let stream = stream! {
        yield Ok::<Bytes, actix_web::Error>(Bytes::from_static(b"retry: 500\n\n"));
        let mut interval = actix_web::rt::time::interval(SSE_TICK);
        let mut last_revision = 0u64;
        loop {
            interval.tick().await;
            let (revision, snapshot) = {
                let store = lock(&state.store);
                (store.revision(), store.latest())
            };
            match snapshot {
                Some(snapshot) if revision != last_revision => {
                    last_revision = revision;
                    match to_string(&*snapshot) {
                        Ok(json) => {
                            let chunk = format!("id: {revision}\ndata: {json}\n\n");
                            yield Ok::<Bytes, actix_web::Error>(Bytes::from(chunk));
                        }
                        Err(err) => {
                            let chunk = format!("event: error\ndata: {err}\n\n");
                            yield Ok::<Bytes, actix_web::Error>(Bytes::from(chunk));
                        }
                    }
                }
                _ => {
                    yield Ok::<Bytes, actix_web::Error>(Bytes::from_static(b": keep-alive\n\n"));
                }
            }
        }
    };

    with_cors(HttpResponse::Ok())
        .append_header(("Cache-Control", "no-cache"))
        .append_header(("Content-Type", "text/event-stream"))
        .append_header(("Connection", "keep-alive"))
        .streaming(stream)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    generation: u64,
    applied: bool,
    fallback: bool,
}

/// Fetch out of band. The fetch blocks, so it runs on the blocking pool.
async fn refresh_handler(state: web::Data<ServerState>) -> HttpResponse {
    let poller = state.poller.clone();
    match web::block(move || poller.poll_once()).await {
        Ok(outcome) => {
            let (applied, fallback) = match outcome {
                PollOutcome::Applied { fallback, .. } => (true, fallback),
                _ => (false, false),
            };
            with_cors(HttpResponse::Accepted()).json(RefreshResponse {
                generation: outcome.generation(),
                applied,
                fallback,
            })
        }
        Err(err) => with_cors(HttpResponse::InternalServerError()).body(err.to_string()),
    }
}

/// Feed statuses as of now; due reveal/restart timers fire first.
async fn feeds_handler(state: web::Data<ServerState>) -> HttpResponse {
    let statuses = {
        let mut board = lock(&state.feeds);
        board.tick(SystemClock.now_ms());
        board.statuses()
    };
    with_cors(HttpResponse::Ok()).json(statuses)
}

#[derive(Deserialize)]
struct FeedEventRequest {
    event: FeedEvent,
}

/// Playback signal from the client displaying `feed`, e.g.
/// `{"event": "autoplay-rejected"}`. Answers with the feed's new status.
async fn feed_event_handler(
    path: web::Path<String>,
    body: web::Json<FeedEventRequest>,
    state: web::Data<ServerState>,
) -> HttpResponse {
    let feed: FeedId = match path.parse() {
        Ok(feed) => feed,
        Err(err) => return with_cors(HttpResponse::NotFound()).json(json!({ "error": err })),
    };
    let event = body.into_inner().event;

    let status = {
        let mut board = lock(&state.feeds);
        if board.adapter(feed).is_none() {
            None
        } else {
            board.push(feed, event);
            board.tick(SystemClock.now_ms());
            board.statuses().into_iter().find(|status| status.feed == feed)
        }
    };
    match status {
        Some(status) => {
            debug!(%feed, ?event, state = ?status.state, "feed event applied");
            with_cors(HttpResponse::Ok()).json(status)
        }
        None => with_cors(HttpResponse::NotFound())
            .json(json!({ "error": format!("feed {feed} is not mounted") })),
    }
}

/// Current overlay for one feed as a transparent PNG.
async fn overlay_handler(
    path: web::Path<String>,
    query: web::Query<DisplayFlags>,
    state: web::Data<ServerState>,
) -> HttpResponse {
    let feed: FeedId = match path.parse() {
        Ok(feed) => feed,
        Err(err) => return HttpResponse::NotFound().body(err),
    };
    let flags = effective_flags(state.mode, query.into_inner());
    let detections = lock(&state.store)
        .latest()
        .map(|snapshot| snapshot.detections.clone())
        .unwrap_or_default();

    let mut surface = RasterSurface::default();
    OverlayRenderer.render(Some(&mut surface), &detections, feed, flags);
    match surface.to_png() {
        Ok(png) => with_cors(HttpResponse::Ok())
            .append_header(("Cache-Control", "no-cache"))
            .content_type("image/png")
            .body(png),
        Err(err) => HttpResponse::InternalServerError().body(err.to_string()),
    }
}

/// Demo telemetry carries no detections worth boxing.
pub fn effective_flags(mode: DataMode, flags: DisplayFlags) -> DisplayFlags {
    match mode {
        DataMode::Demo => DisplayFlags {
            show_boxes: false,
            ..flags
        },
        _ => flags,
    }
}

async fn health_handler() -> HttpResponse {
    with_cors(HttpResponse::Ok()).json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

async fn metrics_handler() -> HttpResponse {
    match telemetry::prometheus_handle() {
        Some(handle) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(handle.render()),
        None => HttpResponse::NoContent().finish(),
    }
}
