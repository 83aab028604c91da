//! Chart-ready views of a [`Dataset`].
//!
//! Drawing is left to whatever frontend consumes this crate. This module
//! decides which columns get a chart, which color each one uses, how missing
//! cells show up (as gaps), how axis ticks are labelled, and which of the
//! loading / error / content views a [`RefreshState`] maps to.

use crate::config;
use crate::models::Dataset;
use crate::refresh::RefreshState;

/// True if `key` names the date/label column rather than a data series.
fn is_date_key(key: &str) -> bool {
    let key = key.trim().to_lowercase();
    key == config::DATE_KEY || key == config::DATE_LABEL.to_lowercase()
}

/// Column keys that get a chart, in header order.
///
/// Skips blank keys and any key naming the date column (trimmed,
/// case-insensitive).
pub fn chart_keys(dataset: &Dataset) -> Vec<&str> {
    dataset
        .column_keys
        .iter()
        .map(String::as_str)
        .filter(|key| !key.trim().is_empty() && !is_date_key(key))
        .collect()
}

// ---------------------------------------------------------------------------
// ChartSeries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    /// X axis label, the row's date cell.
    pub label: String,
    /// `None` is drawn as a gap, never as zero.
    pub value: Option<f64>,
}

/// One line chart: a single column plotted against the date labels.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub key: String,
    pub title: String,
    pub color: &'static str,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn new(dataset: &Dataset, key: &str, color: &'static str) -> Self {
        let points = dataset
            .series(key)
            .map(|(label, value)| ChartPoint {
                label: label.to_string(),
                value,
            })
            .collect();
        Self {
            key: key.to_string(),
            title: key.trim().to_string(),
            color,
            points,
        }
    }

    /// Points with a value, for renderers that bridge over gaps.
    pub fn present_points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.points
            .iter()
            .filter_map(|p| p.value.map(|v| (p.label.as_str(), v)))
    }

    /// `(min, max)` over the present values, `None` if every value is missing.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.present_points().fold(None, |range, (_, v)| match range {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// One series per chartable column, colored by position in the palette.
pub fn build_charts(dataset: &Dataset) -> Vec<ChartSeries> {
    let palette = config::chart_colors();
    chart_keys(dataset)
        .into_iter()
        .enumerate()
        .map(|(index, key)| ChartSeries::new(dataset, key, palette[index % palette.len()]))
        .collect()
}

// ---------------------------------------------------------------------------
// Axis ticks
// ---------------------------------------------------------------------------

/// Compact Y axis label: `1500` → `"1.5K"`, `2_000_000` → `"2M"`.
///
/// Non-finite input yields an empty label.
pub fn format_axis_tick(tick: f64) -> String {
    if !tick.is_finite() {
        return String::new();
    }
    let magnitude = tick.abs();
    let (scaled, suffix) = if magnitude >= 1_000_000_000.0 {
        (tick / 1_000_000_000.0, "B")
    } else if magnitude >= 1_000_000.0 {
        (tick / 1_000_000.0, "M")
    } else if magnitude >= 1_000.0 {
        (tick / 1_000.0, "K")
    } else {
        return tick.to_string();
    };
    let formatted = format!("{:.1}", scaled);
    let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
    format!("{}{}", trimmed, suffix)
}

// ---------------------------------------------------------------------------
// DashboardView
// ---------------------------------------------------------------------------

/// What a frontend should show for a given [`RefreshState`].
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// The initial fetch is still running.
    Loading,
    /// A fetch failed and no data has ever been loaded.
    Error(String),
    /// Charts, with an error banner when the last background refresh failed
    /// and the charts show stale data.
    Content {
        charts: Vec<ChartSeries>,
        error: Option<String>,
    },
}

impl DashboardView {
    pub fn from_state(state: &RefreshState) -> Self {
        if state.loading {
            return DashboardView::Loading;
        }
        match &state.error {
            Some(message) if state.dataset.records.is_empty() => {
                DashboardView::Error(message.clone())
            }
            error => DashboardView::Content {
                charts: build_charts(&state.dataset),
                error: error.clone(),
            },
        }
    }
}
