//! Live line-chart data from a published Google Sheet.
//!
//! Downloads the sheet's CSV export, parses it into [`Record`]s with one
//! numeric series per column, and keeps the result fresh on a fixed timer.
//! Chart drawing is left to the consumer; [`chart`] provides the series,
//! colors and axis labels.
//!
//! # Quick start
//!
//! ```no_run
//! use sheet_dashboard::{DashboardView, SheetDashboard};
//!
//! #[tokio::main]
//! async fn main() -> sheet_dashboard::Result<()> {
//!     let dashboard = SheetDashboard::builder().build()?;
//!
//!     // One-off fetch
//!     let dataset = dashboard.fetch().await?;
//!     println!("{} rows", dataset.records.len());
//!
//!     // Or keep it refreshed every 60 seconds
//!     let mut controller = dashboard.controller();
//!     let mut updates = controller.subscribe();
//!     controller.start();
//!     while updates.changed().await.is_ok() {
//!         let view = DashboardView::from_state(&updates.borrow_and_update());
//!         println!("{:?}", view);
//!     }
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod refresh;

pub use chart::{ChartSeries, DashboardView};
pub use error::{DashboardError, Result};
pub use fetcher::{DatasetSource, SheetFetcher};
pub use models::{Dataset, Record};
pub use refresh::{RefreshController, RefreshState};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// ---------------------------------------------------------------------------
// SheetDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SheetDashboard`].
///
/// Use [`SheetDashboard::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SheetDashboardBuilder::build).
pub struct SheetDashboardBuilder {
    url: String,
    timeout: Duration,
    refresh_interval: Duration,
}

impl Default for SheetDashboardBuilder {
    fn default() -> Self {
        Self {
            url: config::SHEET_CSV_URL.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            refresh_interval: config::REFRESH_INTERVAL,
        }
    }
}

impl SheetDashboardBuilder {
    /// Read from a different CSV endpoint.
    ///
    /// Defaults to [`config::SHEET_CSV_URL`]. See [`config::export_csv_url`]
    /// for building the export URL of another published sheet.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the HTTP request timeout.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the period between background refreshes.
    ///
    /// Defaults to 60 seconds.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Validate the settings and build the HTTP client.
    ///
    /// Does not touch the network.
    pub fn build(self) -> Result<SheetDashboard> {
        if self.refresh_interval.is_zero() {
            return Err(DashboardError::InvalidArgument(
                "refresh interval must be greater than zero".into(),
            ));
        }
        let fetcher = SheetFetcher::new(self.url, self.timeout)?;
        Ok(SheetDashboard {
            fetcher: Arc::new(fetcher),
            refresh_interval: self.refresh_interval,
        })
    }
}

// ---------------------------------------------------------------------------
// SheetDashboard
// ---------------------------------------------------------------------------

/// Entry point: a configured fetcher plus its refresh period.
pub struct SheetDashboard {
    fetcher: Arc<SheetFetcher>,
    refresh_interval: Duration,
}

impl SheetDashboard {
    /// Create a new builder for configuring the dashboard.
    pub fn builder() -> SheetDashboardBuilder {
        SheetDashboardBuilder::default()
    }

    /// Fetch and parse the sheet once.
    pub async fn fetch(&self) -> Result<Dataset> {
        self.fetcher.fetch_dataset().await
    }

    /// A stopped [`RefreshController`] sharing this dashboard's fetcher.
    pub fn controller(&self) -> RefreshController<SheetFetcher> {
        RefreshController::with_shared_source(self.fetcher.clone(), self.refresh_interval)
    }

    pub fn fetcher(&self) -> &SheetFetcher {
        &self.fetcher
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }
}

impl fmt::Display for SheetDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SheetDashboard(url={}, refresh_interval={}s, timeout={}s)",
            self.fetcher.url,
            self.refresh_interval.as_secs_f64(),
            self.fetcher.timeout().as_secs_f64()
        )
    }
}
