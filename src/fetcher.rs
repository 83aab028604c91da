//! HTTP retrieval of the published sheet.
//!
//! Every request carries a fresh cache-busting token so intermediate caches
//! never serve a stale export. The response body is handed to
//! [`parser::parse_dataset`](crate::parser::parse_dataset).

use crate::error::{DashboardError, Result};
use crate::models::Dataset;
use crate::{config, parser};
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Anything the refresh controller can pull a fresh [`Dataset`] from.
pub trait DatasetSource: Send + Sync + 'static {
    fn fetch_dataset(&self) -> impl Future<Output = Result<Dataset>> + Send;
}

/// Append the cache-busting parameter to `base`.
pub fn cache_busted_url(base: &str, token: i64) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", base, sep, config::CACHE_BUST_PARAM, token)
}

/// Downloads and parses the CSV export of one sheet tab.
pub struct SheetFetcher {
    /// Export endpoint, without the cache-busting parameter.
    pub url: String,
    timeout: Duration,
    client: Client,
}

impl SheetFetcher {
    /// Create a fetcher for `url`.
    ///
    /// Fails when `url` is blank or the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(DashboardError::InvalidArgument(
                "sheet URL must not be empty".into(),
            ));
        }
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The URL for the next request, stamped with the current time.
    pub fn request_url(&self) -> String {
        cache_busted_url(&self.url, chrono::Utc::now().timestamp_millis())
    }

    /// Fetch the raw CSV text.
    ///
    /// Non-success statuses fail with [`DashboardError::Status`] carrying the
    /// status line, e.g. `"503 Service Unavailable"`.
    pub async fn fetch_text(&self) -> Result<String> {
        let url = self.request_url();
        debug!(%url, "requesting sheet export");

        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashboardError::Status(status.to_string()));
        }
        Ok(resp.text().await?)
    }

    /// Fetch and parse the sheet.
    pub async fn fetch_dataset(&self) -> Result<Dataset> {
        let text = self.fetch_text().await?;
        let dataset = parser::parse_dataset(&text)?;
        debug!(
            records = dataset.records.len(),
            columns = dataset.column_keys.len(),
            "parsed sheet export"
        );
        Ok(dataset)
    }
}

impl DatasetSource for SheetFetcher {
    async fn fetch_dataset(&self) -> Result<Dataset> {
        SheetFetcher::fetch_dataset(self).await
    }
}
