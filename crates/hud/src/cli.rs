use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use hud::dashboard::{
    self, ConfigArgs, DashboardConfig, DashboardHandle,
    server::{ServerState, effective_flags, spawn_http_surface},
    telemetry,
};
use hud_model::FeedId;
use overlay::{DisplayFlags, OverlayRenderer, RasterSurface};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "hud", version, about = "Surveillance HUD telemetry back end")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the poller and the HTTP surface until Ctrl+C.
    Serve(ServeArgs),
    /// Print one snapshot of the configured mode as JSON.
    Snapshot(ConfigArgs),
    /// Render one overlay frame to a PNG file.
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Address the HTTP surface listens on.
    #[arg(long, env = "HUD_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Feed whose detections are drawn.
    #[arg(long, value_parser = parse_feed, default_value = "live")]
    feed: FeedId,
    /// Output PNG path.
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
    /// Draw nothing but the cleared canvas.
    #[arg(long = "hide-boxes", action = clap::ArgAction::SetTrue)]
    hide_boxes: bool,
    /// Draw targets in the neutral style.
    #[arg(long = "no-highlight", action = clap::ArgAction::SetTrue)]
    no_highlight: bool,
}

fn parse_feed(raw: &str) -> Result<FeedId, String> {
    raw.parse()
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Snapshot(args) => snapshot(&args),
        Command::Render(args) => render(&args),
    }
}

fn serve(args: ServeArgs) -> Result<()> {
    let config = DashboardConfig::from_args(&args.config)?;
    let _telemetry_guard = telemetry::enter_runtime(&config.telemetry);
    let _ = telemetry::init_metrics_recorder();
    let span = tracing::info_span!("hud.serve", mode = %config.mode, bind = %args.bind);
    let _span_guard = span.enter();

    let dashboard = DashboardHandle::start(&config)?;
    let http = spawn_http_surface(
        args.bind,
        ServerState {
            mode: dashboard.mode(),
            store: dashboard.store().clone(),
            poller: dashboard.poller().clone(),
            feeds: dashboard.feeds().clone(),
        },
    )?;

    dashboard::wait_for_ctrl_c()?;
    info!("shutting down");
    http.stop();
    dashboard.stop();
    Ok(())
}

fn snapshot(args: &ConfigArgs) -> Result<()> {
    let config = DashboardConfig::from_args(args)?;
    let _telemetry_guard = telemetry::enter_runtime(&config.telemetry);
    let snapshot = dashboard::poll_single(&config)?;
    let json = serde_json::to_string_pretty(&*snapshot).context("failed to encode snapshot")?;
    println!("{json}");
    Ok(())
}

fn render(args: &RenderArgs) -> Result<()> {
    let config = DashboardConfig::from_args(&args.config)?;
    let _telemetry_guard = telemetry::enter_runtime(&config.telemetry);
    let snapshot = dashboard::poll_single(&config)?;

    let flags = effective_flags(
        config.mode,
        DisplayFlags {
            show_boxes: !args.hide_boxes,
            highlight_target: !args.no_highlight,
        },
    );
    let mut surface = RasterSurface::default();
    OverlayRenderer.render(Some(&mut surface), &snapshot.detections, args.feed, flags);
    surface
        .save_png(&args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(feed = %args.feed, out = %args.out.display(), "overlay written");
    Ok(())
}
