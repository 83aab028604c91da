use std::time::Duration;

pub const DOCUMENT_ID: &str = "1DIGrcCCankqnKvRqPuEOKO4liv8HiF39rv-8IC7tbFU";
pub const SHEET_GID: &str = "1121823434";
pub const SHEET_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/1DIGrcCCankqnKvRqPuEOKO4liv8HiF39rv-8IC7tbFU/export?format=csv&gid=1121823434";

/// Query parameter carrying the per-request cache-busting token.
pub const CACHE_BUST_PARAM: &str = "_";

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Reserved record key holding the first-column label of every row.
pub const DATE_KEY: &str = "date";

/// Header the published sheet uses for its date column ("date" in Persian).
/// Columns carrying this name are never charted.
pub const DATE_LABEL: &str = "تاریخ";

pub const FETCH_FAILED_MESSAGE: &str = "Unable to load data from the Google Sheet. \
     Make sure the sheet is published publicly and the link is correct.";

pub fn chart_colors() -> [&'static str; 8] {
    [
        "#38bdf8", // sky-400
        "#34d399", // emerald-400
        "#facc15", // yellow-400
        "#fb923c", // orange-400
        "#f87171", // red-400
        "#a78bfa", // violet-400
        "#ec4899", // pink-400
        "#22d3ee", // cyan-400
    ]
}

/// Build the CSV export URL for one tab of a published spreadsheet.
pub fn export_csv_url(document_id: &str, gid: &str) -> String {
    format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv&gid={}",
        document_id, gid
    )
}
