//! Configuration parsing for the dashboard back end.
//!
//! Flags fall back to `HUD_*` environment variables and are resolved once into
//! an immutable [`DashboardConfig`].

use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;
use telemetry_sim::MockConfig;
use tracing::warn;

/// Where snapshots come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Deterministic scripted telemetry.
    Demo,
    /// Randomised local telemetry.
    Mock,
    /// Remote backend over HTTP.
    Api,
}

impl DataMode {
    pub fn label(self) -> &'static str {
        match self {
            DataMode::Demo => "demo",
            DataMode::Mock => "mock",
            DataMode::Api => "api",
        }
    }

    /// Parse a mode string, falling back to [`DataMode::Mock`] for anything
    /// unrecognised.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!(mode = raw, "unknown data mode, using mock");
            DataMode::Mock
        })
    }
}

impl fmt::Display for DataMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(DataMode::Demo),
            "mock" => Ok(DataMode::Mock),
            "api" => Ok(DataMode::Api),
            other => Err(format!("unknown data mode `{other}`")),
        }
    }
}

#[derive(Clone, Debug, Default)]
/// Optional tracing outputs.
pub struct TelemetryOptions {
    /// Write a Chrome trace JSON file capturing poll spans.
    pub chrome_trace_path: Option<PathBuf>,
}

/// Flags shared by every subcommand that produces snapshots.
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Snapshot source: demo, mock or api.
    #[arg(long, env = "HUD_DATA_MODE", default_value = "mock")]
    pub mode: String,
    /// Backend origin for api mode, e.g. http://10.0.12.5:5000.
    #[arg(long, env = "HUD_API_BASE_URL", default_value = "")]
    pub api_base_url: String,
    /// Path of the dashboard endpoint on the backend.
    #[arg(long, env = "HUD_DASHBOARD_PATH", default_value = "/api/dashboard")]
    pub dashboard_path: String,
    /// Video file served for the live feed in mock mode.
    #[arg(long, env = "HUD_MOCK_LIVE_MP4_URL", default_value = "")]
    pub mock_live_url: String,
    /// Video file served for the manipulated feed in mock mode.
    #[arg(long, env = "HUD_MOCK_MANIP_MP4_URL", default_value = "")]
    pub mock_manipulated_url: String,
    /// Portrait shown for the demo target.
    #[arg(long, env = "HUD_DEMO_PORTRAIT_URL", default_value = "/VIP1.jpg")]
    pub demo_portrait_url: String,
    /// Timeout for one backend request.
    #[arg(long, env = "HUD_REQUEST_TIMEOUT_MS", default_value_t = 5_000)]
    pub request_timeout_ms: u64,
    /// Fixed seed for the mock simulator.
    #[arg(long, env = "HUD_SEED")]
    pub seed: Option<u64>,
    /// Write a Chrome trace JSON file to this path.
    #[arg(long = "chrome-trace", value_name = "PATH")]
    pub chrome_trace: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub mode: DataMode,
    pub api_base_url: String,
    pub dashboard_path: String,
    pub mock: MockConfig,
    pub demo_portrait_url: String,
    pub request_timeout: Duration,
    pub telemetry: TelemetryOptions,
}

impl DashboardConfig {
    pub fn from_args(args: &ConfigArgs) -> Result<Self> {
        let mode = DataMode::parse_lenient(&args.mode);
        if mode == DataMode::Api && args.api_base_url.trim().is_empty() {
            bail!("api mode needs a backend origin: pass --api-base-url or set HUD_API_BASE_URL");
        }
        if args.request_timeout_ms == 0 {
            bail!("--request-timeout-ms must be at least 1");
        }

        Ok(Self {
            mode,
            api_base_url: args.api_base_url.trim().to_string(),
            dashboard_path: args.dashboard_path.clone(),
            mock: MockConfig {
                live_url: args.mock_live_url.clone(),
                manipulated_url: args.mock_manipulated_url.clone(),
                seed: args.seed,
            },
            demo_portrait_url: args.demo_portrait_url.clone(),
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            telemetry: TelemetryOptions {
                chrome_trace_path: args.chrome_trace.clone(),
            },
        })
    }

    /// Full URL of the backend dashboard endpoint.
    pub fn dashboard_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        let path = self.dashboard_path.trim();
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}
