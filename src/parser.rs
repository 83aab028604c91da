//! CSV payload parsing.
//!
//! Turns the raw text of a sheet export into a [`Dataset`]. Row splitting is
//! quote-aware (RFC 4180 style), so a quoted cell such as `"1,250"` stays a
//! single field. Numeric coercion follows JavaScript's `parseFloat`: the
//! longest leading decimal literal wins and anything unparseable becomes the
//! missing marker.

use crate::error::Result;
use crate::models::{Dataset, Record};
use csv::{ReaderBuilder, Trim};
use tracing::{trace, warn};

/// Tracks whether a quoted field is still open across physical lines.
#[derive(Default)]
struct QuoteScan {
    in_quotes: bool,
}

impl QuoteScan {
    /// Feed one physical line; returns true if a quoted field is still open
    /// at its end. A quote only opens a field at the start of that field.
    fn feed(&mut self, line: &str) -> bool {
        let mut at_field_start = !self.in_quotes;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if self.in_quotes {
                if c == '"' {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                    } else {
                        self.in_quotes = false;
                    }
                }
            } else if c == '"' && at_field_start {
                self.in_quotes = true;
            }
            at_field_start = !self.in_quotes && c == ',';
        }
        self.in_quotes
    }
}

/// Split the payload into logical rows.
///
/// Line endings may be `\n` or `\r\n`. Each row is trimmed and blank rows
/// are dropped. A quoted cell spanning several lines stays one row with its
/// inner lines untouched. A quote that never closes is treated as literal
/// text: its line becomes a row of its own and the following lines are split
/// normally.
pub fn normalize_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.trim().lines().collect();
    let mut rows = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        let first = lines[start].trim();
        if first.is_empty() {
            start += 1;
            continue;
        }

        let mut scan = QuoteScan::default();
        let mut end = start;
        let mut open = scan.feed(first);
        while open && end + 1 < lines.len() {
            end += 1;
            open = scan.feed(lines[end]);
        }

        if open {
            warn!(line = start + 1, "unterminated quote; reading the line on its own");
            rows.push(first.to_string());
            start += 1;
            continue;
        }

        if end == start {
            rows.push(first.to_string());
        } else {
            let mut parts = vec![lines[start].trim_start()];
            parts.extend_from_slice(&lines[start + 1..=end]);
            rows.push(parts.join("\n").trim_end().to_string());
        }
        start = end + 1;
    }
    rows
}

/// Split delimited text into rows of string fields.
///
/// Rows may have differing lengths. Quoted fields may contain commas,
/// doubled quotes and line breaks. Each logical row is read on its own, so a
/// malformed quote cannot swallow the rows after it.
pub fn split_rows(text: &str) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    for line in normalize_lines(text) {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(line.as_bytes());
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }
    }
    Ok(rows)
}

/// Parse a numeric cell the way `parseFloat` does.
///
/// Leading whitespace is skipped, then the longest prefix that forms a
/// decimal literal (optional sign, digits, optional fraction, optional
/// exponent) or `Infinity` is parsed. Returns `None` when no such prefix
/// exists. Never returns `NaN`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let s = cell.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    if s[end..].starts_with("Infinity") {
        let inf = f64::INFINITY;
        return Some(if bytes[0] == b'-' { -inf } else { inf });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Parse a full CSV payload into a [`Dataset`].
///
/// The first row is the header; its first cell names the date/label column
/// and the rest become the column keys. Payloads with fewer than two
/// non-blank lines yield an empty dataset. Short rows get missing values for
/// the absent trailing cells; extra cells are ignored.
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    let rows = split_rows(text)?;
    if rows.len() < 2 {
        return Ok(Dataset::empty());
    }

    let mut rows = rows.into_iter();
    let column_keys: Vec<String> = match rows.next() {
        Some(headers) => headers.into_iter().skip(1).collect(),
        None => return Ok(Dataset::empty()),
    };

    let records = rows
        .map(|fields| {
            let mut record = Record::new(fields.first().cloned().unwrap_or_default());
            for (index, key) in column_keys.iter().enumerate() {
                let cell = fields.get(index + 1).map(String::as_str).unwrap_or("");
                let value = parse_number(cell);
                if value.is_none() {
                    trace!(column = %key, cell = %cell, "non-numeric cell stored as missing");
                }
                record.insert(key.as_str(), value);
            }
            record
        })
        .collect();

    Ok(Dataset::new(records, column_keys))
}
