//! Spreadsheet cells as seen by the results importer.
//!
//! A sheet is a ragged `Vec<Vec<Cell>>`. CSV files are read into the same
//! shape so that a results sheet saved from a spreadsheet program parses the
//! same way as one handed over cell by cell.

use std::io::Read;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};

use crate::error::ImportError;

/// Largest serial a spreadsheet will render as a date (9999-12-31).
const MAX_DATE_SERIAL: f64 = 2_958_465.0;
/// Serial 60 is the phantom 1900-02-29 of the 1900 date system.
const PHANTOM_LEAP_SERIAL: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Whether the cell carries a usable value: blank text, `0` and `NaN`
    /// count as missing.
    pub fn is_present(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Text(text) => !text.trim().is_empty(),
            Cell::Number(value) => *value != 0.0 && !value.is_nan(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(value) => format_number(*value),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => (!value.is_nan()).then_some(*value),
            Cell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
            }
        }
    }

    /// Leading-prefix float parse: `"12.5/20"` reads as `12.5`.
    pub fn parse_float_prefix(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(value) => (!value.is_nan()).then_some(*value),
            Cell::Text(text) => float_prefix(text.trim_start()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn float_prefix(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let fraction_start = end + 1;
        let mut fraction_end = fraction_start;
        while fraction_end < bytes.len() && bytes[fraction_end].is_ascii_digit() {
            fraction_end += 1;
        }
        mantissa_digits += fraction_end - fraction_start;
        if mantissa_digits > 0 {
            end = fraction_end;
        }
    }
    if mantissa_digits == 0 {
        return None;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exponent_end = end + 1;
        if exponent_end < bytes.len() && (bytes[exponent_end] == b'+' || bytes[exponent_end] == b'-')
        {
            exponent_end += 1;
        }
        let exponent_digits_start = exponent_end;
        while exponent_end < bytes.len() && bytes[exponent_end].is_ascii_digit() {
            exponent_end += 1;
        }
        if exponent_end > exponent_digits_start {
            end = exponent_end;
        }
    }
    text[..end].parse::<f64>().ok()
}

/// Converts a 1900-system date serial to `YYYY-MM-DD`.
pub fn serial_to_iso_date(serial: f64) -> Option<String> {
    if !serial.is_finite() || !(0.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    if days == PHANTOM_LEAP_SERIAL {
        return Some("1900-02-29".to_string());
    }
    // Serials after the phantom day are shifted by one.
    let (base, offset) = if days < PHANTOM_LEAP_SERIAL {
        (NaiveDate::from_ymd_opt(1899, 12, 31)?, days)
    } else {
        (NaiveDate::from_ymd_opt(1899, 12, 30)?, days)
    };
    let date = base.checked_add_signed(Duration::days(offset))?;
    Some(format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    ))
}

fn cell_from_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        Cell::Empty
    } else if let Ok(value) = trimmed.parse::<f64>() {
        if value.is_finite() {
            Cell::Number(value)
        } else {
            Cell::Text(field.to_string())
        }
    } else {
        Cell::Text(field.to_string())
    }
}

/// Reads one grid row per physical line. Blank lines become empty rows so
/// the fixed header layout keeps its row numbers.
pub fn grid_from_reader<R: Read>(mut reader: R) -> Result<Vec<Vec<Cell>>, ImportError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text);
    text.lines().map(row_from_line).collect()
}

fn row_from_line(line: &str) -> Result<Vec<Cell>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut row: Vec<Cell> = match reader.records().next() {
        Some(record) => record?.iter().map(cell_from_field).collect(),
        None => Vec::new(),
    };
    while matches!(row.last(), Some(Cell::Empty)) {
        row.pop();
    }
    Ok(row)
}

pub fn read_csv_grid(path: &Path) -> Result<Vec<Vec<Cell>>, ImportError> {
    let file = std::fs::File::open(path)?;
    grid_from_reader(file)
}
