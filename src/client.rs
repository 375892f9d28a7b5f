use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::model::{Classroom, Student};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5178/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What a front-end needs from the roster API.
#[async_trait]
pub trait RosterService: Send + Sync {
    async fn fetch_classes(&self) -> Result<Vec<Classroom>>;

    async fn fetch_students(&self) -> Result<Vec<Student>>;

    /// `true` when `GET /health` answers with a 2xx status.
    async fn ping(&self) -> bool;
}

#[derive(Clone)]
pub struct RosterClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for RosterClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RosterClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RosterClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(concat!("roster-client/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .no_proxy()
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::new(&cfg.client.base_url, cfg.client_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("invalid path {}", path))?;
        debug!(%url, "GET");
        let res = self
            .http
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("failed to reach {}", url))?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%url, %status, "roster API error");
            return Err(anyhow!("roster API error {}: {}", status, body));
        }
        res.json::<T>()
            .await
            .with_context(|| format!("invalid JSON from {}", url))
    }
}

/// Relative joins drop the last path segment unless it ends with `/`.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };
    Url::parse(&with_slash).with_context(|| format!("invalid base URL {}", raw))
}

#[async_trait]
impl RosterService for RosterClient {
    async fn fetch_classes(&self) -> Result<Vec<Classroom>> {
        self.get_json("api/classes").await
    }

    async fn fetch_students(&self) -> Result<Vec<Student>> {
        self.get_json("api/students").await
    }

    async fn ping(&self) -> bool {
        let Ok(url) = self.base_url.join("health") else {
            return false;
        };
        match self.http.get(url).send().await {
            Ok(res) => res.status().is_success(),
            Err(err) => {
                debug!(?err, "health check failed");
                false
            }
        }
    }
}
