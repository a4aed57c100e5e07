//! Tabular file reading for ingestion
//!
//! Reads a whole CSV or spreadsheet file into memory as a [`Table`]: header
//! names plus loosely typed cells. Format is chosen by file extension.

use crate::error::{Error, Result};
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDateTime;
use review_common::records::timestamp_value;
use review_common::RawRecord;
use serde_json::{json, Value};
use std::io::Read;
use std::path::Path;

/// Cell texts read as missing values
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Largest integer a float holds exactly (2^53)
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Input file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// `.xlsx` files are spreadsheets; everything else is read as CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => SourceFormat::Spreadsheet,
            _ => SourceFormat::Csv,
        }
    }
}

/// Fully loaded tabular data
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    /// Rows are at most `headers.len()` wide
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// One field mapping per row; missing trailing cells become null
    pub fn into_records(self) -> Vec<RawRecord> {
        let headers = self.headers;
        self.rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                headers
                    .iter()
                    .map(|h| (h.clone(), cells.next().unwrap_or(Value::Null)))
                    .collect()
            })
            .collect()
    }
}

/// Read a whole tabular file, dispatching on extension
pub fn read_table(path: &Path) -> Result<Table> {
    match SourceFormat::from_path(path) {
        SourceFormat::Spreadsheet => read_spreadsheet(path),
        SourceFormat::Csv => {
            let file = std::fs::File::open(path)?;
            read_csv(file)
        }
    }
}

/// Read CSV text with a header row
///
/// A row wider than the header is a parse failure; narrower rows are kept.
pub fn read_csv<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = normalize_headers(reader.headers()?.iter().map(str::to_string).collect());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(Error::Ingest(format!(
                "line {}: expected at most {} fields, saw {}",
                line,
                headers.len(),
                record.len()
            )));
        }
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(infer_cell).collect());
    }

    Ok(Table { headers, rows })
}

/// Read the first worksheet of a spreadsheet
pub fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet(format!("{} has no worksheets", path.display())))??;

    let mut sheet_rows = range.rows();
    let headers = match sheet_rows.next() {
        Some(cells) => normalize_headers(
            cells
                .iter()
                .map(|c| match c {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        None => Vec::new(),
    };

    let rows = sheet_rows
        .map(|cells| cells.iter().map(spreadsheet_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|v| !v.is_null()))
        .collect();

    Ok(Table { headers, rows })
}

/// Fill blank header names and disambiguate duplicates (`Name`, `Name.1`, ...)
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(raw.len());
    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {}", i)
        } else {
            name
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", base, n);
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}

/// Loose per-cell typing for CSV text
///
/// Missing markers become null, canonical integers become integers, other
/// numbers become floats, and everything else stays text. Text with a leading
/// zero or `+` stays text so phone numbers and codes keep their digits.
pub fn infer_cell(text: &str) -> Value {
    if NA_VALUES.contains(&text) {
        return Value::Null;
    }

    let trimmed = text.trim();
    if is_canonical_integer(trimmed) {
        if let Ok(i) = trimmed.parse::<i64>() {
            return json!(i);
        }
    }
    if looks_numeric(trimmed) {
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return json!(f);
            }
        }
    }

    Value::String(text.to_string())
}

fn is_canonical_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0'))
}

fn looks_numeric(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    body.starts_with(|c: char| c.is_ascii_digit() || c == '.')
        && !(body.starts_with('0') && body.len() > 1 && body.as_bytes()[1].is_ascii_digit())
}

fn spreadsheet_cell(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => json!(i),
        Data::Float(f) if !f.is_finite() => Value::Null,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT_INT => json!(*f as i64),
        Data::Float(f) => json!(f),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map(timestamp_value).unwrap_or(Value::Null),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(timestamp_value)
            .unwrap_or_else(|_| Value::String(s.clone())),
        Data::DurationIso(s) => Value::String(s.clone()),
        _ => Value::Null,
    }
}
