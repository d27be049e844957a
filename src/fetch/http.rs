//! HTTP artifact fetching.
//!
//! Provides a blocking HTTP client that streams response bodies straight
//! into the caller's writer, so large installers never sit in memory.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use std::io::Write;
use std::time::Duration;

use super::Fetcher;

/// Fetches artifacts over HTTP/HTTPS.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default 300-second timeout.
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(300))
    }

    /// Create a new HTTP fetcher with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rigup/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_to(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Request to {} failed", url))?;

        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }

        let written = response
            .copy_to(sink)
            .with_context(|| format!("Reading body of {} failed", url))?;

        tracing::debug!("Fetched {} bytes from {}", written, url);
        Ok(written)
    }
}
