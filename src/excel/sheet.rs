//! Random-access view over one worksheet

use super::address::CellRef;
use super::cell::CellValue;
use calamine::{Data, Range};
use std::collections::BTreeMap;

static EMPTY: CellValue = CellValue::Empty;

/// One worksheet, addressable by zero-based (row, col).
///
/// Rows are stored sparsely: readers often skip blank rows entirely, so a
/// row that was never delivered reads back as empty cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Vec<CellValue>>,
    height: u32,
    width: u32,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a sheet from dense rows starting at A1
    pub fn from_rows<V: Into<CellValue>>(
        name: impl Into<String>,
        rows: impl IntoIterator<Item = Vec<V>>,
    ) -> Self {
        let mut sheet = Self::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                sheet.set(r as u32, c as u32, value.into());
            }
        }
        sheet
    }

    /// Build a sheet from calamine's value range, wrapping cells that also
    /// have formula text so they render their cached result.
    pub fn from_range(
        name: impl Into<String>,
        values: &Range<Data>,
        formulas: Option<&Range<String>>,
    ) -> Self {
        let mut sheet = Self::new(name);

        if let Some((start_row, start_col)) = values.start() {
            for (row, col, data) in values.cells() {
                let value = CellValue::from(data);
                if !value.is_empty() {
                    sheet.set(start_row + row as u32, start_col + col as u32, value);
                }
            }
        }

        if let Some(formulas) = formulas {
            if let Some((start_row, start_col)) = formulas.start() {
                for (row, col, formula) in formulas.cells() {
                    if formula.is_empty() {
                        continue;
                    }
                    let (row, col) = (start_row + row as u32, start_col + col as u32);
                    let cached = sheet.cell(row, col).clone();
                    sheet.set(
                        row,
                        col,
                        CellValue::Formula {
                            formula: formula.clone(),
                            cached: Box::new(cached),
                        },
                    );
                }
            }
        }

        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Store a value; empty values never grow the sheet's extent.
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_empty() {
            if let Some(cells) = self.rows.get_mut(&row) {
                if let Some(cell) = cells.get_mut(col as usize) {
                    *cell = CellValue::Empty;
                }
            }
            return;
        }

        let cells = self.rows.entry(row).or_default();
        if cells.len() <= col as usize {
            cells.resize(col as usize + 1, CellValue::Empty);
        }
        cells[col as usize] = value;

        self.height = self.height.max(row + 1);
        self.width = self.width.max(col + 1);
    }

    /// Store a value by A1 address
    pub fn set_at(
        &mut self,
        address: &str,
        value: impl Into<CellValue>,
    ) -> Result<(), crate::error::AddressParseError> {
        let cell = CellRef::parse(address)?;
        self.set(cell.row, cell.col, value.into());
        Ok(())
    }

    /// Raw cell; anything outside the stored data is empty
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        self.rows
            .get(&row)
            .and_then(|cells| cells.get(col as usize))
            .unwrap_or(&EMPTY)
    }

    /// Rendered cell text, `None` for empty/error cells
    pub fn text(&self, row: u32, col: u32) -> Option<String> {
        self.cell(row, col).render()
    }

    pub fn text_at(&self, cell: CellRef) -> Option<String> {
        self.text(cell.row, cell.col)
    }

    /// Physical extent as (rows, columns), counted from A1
    pub fn extent(&self) -> (u32, u32) {
        (self.height, self.width)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(s.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::from(s.as_str())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}
