use anyhow::{Context, Result};
use hud_model::DashboardSnapshot;
use reqwest::blocking::Client;
use tracing::debug;

use crate::dashboard::{
    config::DashboardConfig,
    source::{FetchError, SnapshotSource},
};

/// Blocking client for the backend dashboard endpoint.
pub struct ApiClient {
    http: Client,
    url: String,
}

impl ApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            url: config.dashboard_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotSource for ApiClient {
    fn fetch(&mut self) -> Result<DashboardSnapshot, FetchError> {
        let response = self
            .http
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("{} returned {status}", self.url)));
        }

        let body = response
            .bytes()
            .map_err(|err| FetchError::Transport(format!("reading body: {err}")))?;
        debug!(url = %self.url, bytes = body.len(), "dashboard response");
        Ok(DashboardSnapshot::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        format!("backend {}", self.url)
    }
}
