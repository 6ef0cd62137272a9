use std::time::Duration;

use anyhow::Context as _;
use url::Url;

pub const API_URL_ENV: &str = "DOCSITE_API_URL";
pub const HTTP_TIMEOUT_ENV: &str = "DOCSITE_HTTP_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the content API lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Builds the config from `--api-url` when given, else from the environment.
    pub fn resolve(api_url: Option<&str>) -> anyhow::Result<Self> {
        let base_url = match api_url {
            Some(raw) => raw.to_owned(),
            None => std::env::var(API_URL_ENV)
                .with_context(|| format!("{API_URL_ENV} is required (or pass --api-url)"))?,
        };
        let timeout_secs = match std::env::var(HTTP_TIMEOUT_ENV) {
            Ok(raw) => raw.trim().parse::<u64>().with_context(|| {
                format!("invalid {HTTP_TIMEOUT_ENV}={raw:?}. expected whole seconds")
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(&base_url, Duration::from_secs(timeout_secs.max(1)))
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            anyhow::bail!("{API_URL_ENV} is empty");
        }
        let parsed = Url::parse(&base_url).context("parse content api base url")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            anyhow::bail!("content api url must be http/https: {base_url}");
        }
        Ok(Self { base_url, timeout })
    }

    pub fn documentations_endpoint(&self) -> String {
        format!("{}/api/documentations", self.base_url)
    }
}
