//! Cell values and their text rendering

use calamine::{Data, DataType};
use chrono::NaiveDateTime;

/// A single cell, normalised from whatever the workbook reader delivers
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    /// Formula cell: only the last cached result is ever rendered
    Formula {
        formula: String,
        cached: Box<CellValue>,
    },
    Error(String),
}

impl CellValue {
    /// Render as text, or `None` for empty/error cells.
    ///
    /// Integers have no decimal point, other numbers keep up to six
    /// decimals, dates render as `YYYYMMDD`.
    pub fn render(&self) -> Option<String> {
        match self {
            CellValue::Empty | CellValue::Error(_) => None,
            CellValue::Text(s) if s.is_empty() => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Boolean(true) => Some("True".to_string()),
            CellValue::Boolean(false) => Some("False".to_string()),
            CellValue::Date(dt) => Some(dt.format("%Y%m%d").to_string()),
            CellValue::Formula { cached, .. } => cached.render(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::DateTime(dt) => {
                if dt.is_duration() {
                    CellValue::Number(dt.as_f64())
                } else {
                    // honours the workbook's 1900/1904 date system
                    dt.as_datetime()
                        .map(CellValue::Date)
                        .unwrap_or(CellValue::Number(dt.as_f64()))
                }
            }
            Data::DateTimeIso(s) => data
                .as_datetime()
                .or_else(|| data.as_date().and_then(|d| d.and_hms_opt(0, 0, 0)))
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

/// Format a number for output, removing unnecessary decimal places
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return format!("{}", n as i64);
    }
    let rounded = (n * 1e6).round() / 1e6;
    let text = format!("{:.6}", rounded);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
