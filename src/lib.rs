//! excel2erp - client order spreadsheets to ERP import archives
//!
//! A mapping document declares one output shape (a header file and a detail
//! file) and any number of input layouts, one per client. For each layout an
//! extractor is synthesized once at startup; converting a workbook then reads
//! the header cells and the line-item table, cleans values with regex
//! replacements, fills defaults, and packs both text files into a zip.
//!
//! # Example
//!
//! ```no_run
//! use excel2erp::{Engine, UserInput, Workbook};
//! use std::path::Path;
//!
//! let engine = Engine::from_path(Path::new("excel2erp.yaml"))?;
//! for field in engine.missing_fields("el-dorado")? {
//!     println!("{} ({})", field.prompt, field.kind.type_name());
//! }
//!
//! let workbook = Workbook::open("pedido.xlsx")?;
//! let mut inputs = UserInput::new();
//! inputs.insert("DocDueDate".to_string(), "2024-12-20".to_string());
//!
//! let package = engine.convert("el-dorado", &workbook, &inputs)?;
//! std::fs::write(&package.filename, &package.bytes)?;
//! # Ok::<(), excel2erp::error::ErpError>(())
//! ```

pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use crate::core::{Engine, Extraction, MissingField, SourceExtractor, UserInput};
pub use error::{ErpError, ErpResult};
pub use excel::{CellRef, Sheet, Workbook};
pub use types::Config;
pub use writer::Package;
