use serde::Serialize;

use super::record::Record;

// ---------------------------------------------------------------------------
// Dataset — Result of one successful fetch
// ---------------------------------------------------------------------------

/// Parsed sheet contents: rows in source order plus the value-column headers
/// (every header after the first, in header order).
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub records: Vec<Record>,
    pub column_keys: Vec<String>,
}

impl Dataset {
    pub fn new(records: Vec<Record>, column_keys: Vec<String>) -> Self {
        Self {
            records,
            column_keys,
        }
    }

    /// A dataset with no rows and no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.column_keys.is_empty()
    }

    /// The `(label, value)` series for one column across all records.
    pub fn series<'a>(&'a self, key: &'a str) -> impl Iterator<Item = (&'a str, Option<f64>)> + 'a {
        self.records
            .iter()
            .map(move |r| (r.date.as_str(), r.value(key)))
    }
}
