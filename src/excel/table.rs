//! Table discovery from an origin cell

use super::address::CellRef;
use super::sheet::Sheet;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// One table row keyed by column label
pub type TableRow = HashMap<String, String>;

/// Scans a labelled table whose label row starts at `origin`.
///
/// Column extent: rightward from the origin until the first blank label.
/// Row extent, one of two modes:
/// - no end value: stop at the first row whose cell in sheet column A is
///   blank or whitespace-only;
/// - end value: stop at the first row whose origin-column cell equals it.
///
/// Both modes stop at the sheet's physical extent.
#[derive(Debug, Clone)]
pub struct TableScanner<'a> {
    sheet: &'a Sheet,
    origin: CellRef,
    end_value: Option<&'a str>,
}

impl<'a> TableScanner<'a> {
    pub fn new(sheet: &'a Sheet, origin: CellRef) -> Self {
        Self {
            sheet,
            origin,
            end_value: None,
        }
    }

    pub fn with_end_value(mut self, end_value: Option<&'a str>) -> Self {
        self.end_value = end_value;
        self
    }

    /// Column labels, left to right
    pub fn labels(&self) -> Vec<String> {
        let (_, width) = self.sheet.extent();
        let mut labels = Vec::new();

        for col in self.origin.col..width {
            match self.sheet.text(self.origin.row, col) {
                Some(label) if !label.trim().is_empty() => labels.push(label),
                _ => break,
            }
        }

        labels
    }

    /// All data rows before the terminator
    pub fn scan(&self) -> Vec<TableRow> {
        let labels = self.labels();
        if labels.is_empty() {
            return Vec::new();
        }
        for label in repeated_labels(&labels) {
            warn!(origin = %self.origin, label, "repeated column label, rightmost column wins");
        }

        let (height, _) = self.sheet.extent();
        let mut rows = Vec::new();

        for row in self.origin.row + 1..height {
            if self.is_terminator(row) {
                break;
            }
            let record = labels
                .iter()
                .enumerate()
                .map(|(offset, label)| {
                    let value = self
                        .sheet
                        .text(row, self.origin.col + offset as u32)
                        .unwrap_or_default();
                    (label.clone(), value)
                })
                .collect();
            rows.push(record);
        }

        debug!(
            origin = %self.origin,
            columns = labels.len(),
            rows = rows.len(),
            "scanned table"
        );
        rows
    }

    fn is_terminator(&self, row: u32) -> bool {
        match self.end_value {
            Some(end) => self.sheet.text(row, self.origin.col).as_deref() == Some(end),
            None => self
                .sheet
                .text(row, 0)
                .map_or(true, |value| value.trim().is_empty()),
        }
    }
}

/// Labels that occur more than once, in first-seen order
fn repeated_labels(labels: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for label in labels {
        if !seen.insert(label.as_str()) && !repeated.contains(&label.as_str()) {
            repeated.push(label.as_str());
        }
    }
    repeated
}
