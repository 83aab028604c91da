use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config;

// ---------------------------------------------------------------------------
// Record — One row of the sheet, keyed by column
// ---------------------------------------------------------------------------

/// One data row: the first-column label plus one optional number per column.
///
/// `None` marks a cell that was empty or not numeric. Stored numbers are never
/// `NaN`. Values keep the header's column order; inserting a key that is
/// already present overwrites its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub date: String,
    values: Vec<(String, Option<f64>)>,
}

impl Record {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            values: Vec::new(),
        }
    }

    /// Set the value for `key`, last write wins.
    pub fn insert(&mut self, key: impl Into<String>, value: Option<f64>) {
        let key = key.into();
        let value = value.filter(|v| !v.is_nan());
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
    }

    /// Value for a column. The outer `None` means the key is absent; the
    /// inner `None` is the missing marker.
    pub fn get(&self, key: &str) -> Option<Option<f64>> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Numeric value for a column, `None` when absent or missing.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.get(key).flatten()
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of keys including the reserved date key.
    pub fn key_count(&self) -> usize {
        self.values.len() + 1
    }
}

/// Serializes as a flat object: `{"date": "...", "<column>": number | null}`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(config::DATE_KEY, &self.date)?;
        // A column literally named "date" would shadow the label.
        for (key, value) in self.values.iter().filter(|(k, _)| k != config::DATE_KEY) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
