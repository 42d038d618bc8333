//! Workbook loading - spreadsheet container → in-memory sheets

use super::sheet::Sheet;
use crate::error::{ErpError, ErpResult};
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use tracing::debug;

/// An opened workbook: every worksheet, addressable by zero-based index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Open an xlsx/xlsm/xlsb/xls/ods file from disk
    pub fn open<P: AsRef<Path>>(path: P) -> ErpResult<Self> {
        let path = path.as_ref();
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            ErpError::Workbook(format!(
                "Failed to open workbook '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::load(&mut workbook)
    }

    /// Open a workbook from uploaded bytes
    pub fn from_bytes(bytes: Vec<u8>) -> ErpResult<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| ErpError::Workbook(format!("Failed to open workbook: {}", e)))?;
        Self::load(&mut workbook)
    }

    fn load<RS: Read + Seek>(workbook: &mut Sheets<RS>) -> ErpResult<Self> {
        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());

        for sheet_name in sheet_names {
            let values = workbook.worksheet_range(&sheet_name).map_err(|e| {
                ErpError::Workbook(format!("Failed to read sheet '{}': {}", sheet_name, e))
            })?;
            // Not every container exposes formula text; cached values suffice
            let formulas = workbook.worksheet_formula(&sheet_name).ok();

            let sheet = Sheet::from_range(sheet_name.clone(), &values, formulas.as_ref());
            debug!(sheet = %sheet_name, extent = ?sheet.extent(), "loaded sheet");
            sheets.push(sheet);
        }

        Ok(Self { sheets })
    }

    /// Sheet by zero-based index
    pub fn sheet(&self, index: usize) -> ErpResult<&Sheet> {
        self.sheets.get(index).ok_or_else(|| {
            ErpError::Workbook(format!(
                "Sheet index {} out of range (workbook has {} sheets)",
                index,
                self.sheets.len()
            ))
        })
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}
