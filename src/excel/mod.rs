//! Spreadsheet access
//!
//! - Addressing: A1 strings ↔ zero-based coordinates
//! - Cells: typed values rendered to text
//! - Sheets: dense random-access view over sparse rows
//! - Tables: label row + data rows discovered from an origin cell

mod address;
mod cell;
mod importer;
mod sheet;
mod table;

pub use address::{column_letter, CellRef};
pub use cell::{format_number, CellValue};
pub use importer::Workbook;
pub use sheet::Sheet;
pub use table::{TableRow, TableScanner};
