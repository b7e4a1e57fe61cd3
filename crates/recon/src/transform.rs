//! Best-effort field coercion for warehouse exports.
//!
//! A value that cannot be converted becomes empty (or, for country
//! lookups, passes through unchanged). Coercion never fails a row; every
//! fallback is counted in [`CoercionStats`] so a run can report how many
//! fields were defaulted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::country;
use crate::snapshot::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRule {
    Text,
    Integer,
    Decimal,
    /// `TRUE` / `FALSE`.
    Boolean,
    /// `YYYY-MM-DD`.
    Date,
    /// UTC epoch milliseconds.
    DatetimeMs,
    /// ISO alpha-3 → display name.
    CountryName,
    /// Display name → ISO alpha-3.
    CountryCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Input was null-like; output is empty.
    Empty,
    /// Input converted (or already in target form).
    Converted,
    /// Input not understood; output is the neutral fallback.
    Defaulted,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnStats {
    pub converted: usize,
    pub empty: usize,
    pub defaulted: usize,
}

/// Per-column coercion counters for one cleaned table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoercionStats {
    pub rows: usize,
    pub columns: BTreeMap<String, ColumnStats>,
}

impl CoercionStats {
    pub fn total_defaulted(&self) -> usize {
        self.columns.values().map(|c| c.defaulted).sum()
    }

    fn record(&mut self, column: &str, coercion: Coercion) {
        let entry = self.columns.entry(column.to_string()).or_default();
        match coercion {
            Coercion::Empty => entry.empty += 1,
            Coercion::Converted => entry.converted += 1,
            Coercion::Defaulted => entry.defaulted += 1,
        }
    }
}

const NULL_TOKENS: &[&str] = &["", "nan", "null", "none"];

pub fn is_null_like(raw: &str) -> bool {
    let v = raw.trim().to_ascii_lowercase();
    NULL_TOKENS.contains(&v.as_str())
}

/// Apply one rule to one raw cell.
pub fn coerce(rule: FieldRule, raw: &str) -> (String, Coercion) {
    if is_null_like(raw) {
        return (String::new(), Coercion::Empty);
    }
    let value = raw.trim();

    let converted = match rule {
        FieldRule::Text => Some(value.to_string()),
        FieldRule::Integer => to_integer(value),
        FieldRule::Decimal => to_decimal(value),
        FieldRule::Boolean => to_boolean(value).map(str::to_string),
        FieldRule::Date => parse_datetime(value).map(|dt| dt.format("%Y-%m-%d").to_string()),
        FieldRule::DatetimeMs => parse_datetime(value).map(|dt| dt.timestamp_millis().to_string()),
        FieldRule::CountryName => {
            return match country::iso3_to_name(value) {
                Some(name) => (name.to_string(), Coercion::Converted),
                None => (value.to_string(), Coercion::Defaulted),
            };
        }
        FieldRule::CountryCode => {
            return match country::name_to_iso3(value) {
                Some(code) => (code.to_string(), Coercion::Converted),
                None => (value.to_string(), Coercion::Defaulted),
            };
        }
    };

    match converted {
        Some(v) => (v, Coercion::Converted),
        None => (String::new(), Coercion::Defaulted),
    }
}

/// Apply `rules` to every row of `table`. Unlisted columns are treated as text.
pub fn clean_table(table: &Table, rules: &BTreeMap<String, FieldRule>) -> (Vec<Vec<String>>, CoercionStats) {
    let column_rules: Vec<FieldRule> = table
        .headers
        .iter()
        .map(|h| rules.get(h).copied().unwrap_or(FieldRule::Text))
        .collect();

    let mut stats = CoercionStats::default();
    let mut out = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        let mut cleaned = Vec::with_capacity(row.len());
        for ((cell, rule), header) in row.iter().zip(&column_rules).zip(&table.headers) {
            let (value, coercion) = coerce(*rule, cell);
            stats.record(header, coercion);
            cleaned.push(value);
        }
        out.push(cleaned);
        stats.rows += 1;
    }

    (out, stats)
}

fn to_integer(value: &str) -> Option<String> {
    let compact: String = value.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
    if let Ok(n) = compact.parse::<i64>() {
        return Some(n.to_string());
    }
    // Exports of nullable integer columns come through as floats ("12.0").
    let f = compact.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some((f as i64).to_string())
    } else {
        None
    }
}

fn to_decimal(value: &str) -> Option<String> {
    let normalized = value.replace(',', ".");
    let f = normalized.parse::<f64>().ok()?;
    f.is_finite().then(|| f.to_string())
}

fn to_boolean(value: &str) -> Option<&'static str> {
    match value.to_lowercase().as_str() {
        "t" | "true" | "1" | "yes" | "y" | "oui" => Some("TRUE"),
        "f" | "false" | "0" | "no" | "n" | "non" => Some("FALSE"),
        _ => None,
    }
}

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%:z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// A time part followed by a bare `[+-]HH` offset. Plain dates such as
/// "2024-03-05" also end in `-DD`, so a `:` must precede the sign.
fn has_short_offset(value: &str) -> bool {
    let bytes = value.as_bytes();
    let n = bytes.len();
    n > 3
        && matches!(bytes[n - 3], b'+' | b'-')
        && bytes[n - 2].is_ascii_digit()
        && bytes[n - 1].is_ascii_digit()
        && value[..n - 3].contains(':')
}

/// Parse the timestamp shapes warehouse exports produce. Naive values are UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let mut value = value.trim().to_string();
    // Postgres renders whole-hour offsets as "+02"; chrono wants "+02:00".
    if has_short_offset(&value) {
        value.push_str(":00");
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&value, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&value, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}
