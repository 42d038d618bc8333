use std::fmt;
use thiserror::Error;

pub type ErpResult<T> = Result<T, ErpError>;

#[derive(Error, Debug)]
pub enum ErpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Address(#[from] AddressParseError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// User-input fields the caller has not supplied, header and detail alike
    #[error("Missing user input: {}", .0.join(", "))]
    MissingInput(Vec<String>),
}

/// An A1-style address that does not match `LETTERS DIGITS` with a row >= 1.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cell address: '{address}'")]
pub struct AddressParseError {
    pub address: String,
}

impl AddressParseError {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Every required value that came out blank, header fields and detail rows alike.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionError {
    /// Header fields that are blank
    pub header: Vec<String>,
    /// `(row index, blank fields)` for each offending detail row
    pub detail: Vec<(usize, Vec<String>)>,
}

impl ExtractionError {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.detail.is_empty()
    }

    /// Ok when nothing was collected, otherwise the whole report.
    pub fn into_result(self) -> Result<(), ExtractionError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Required values are blank")?;
        if !self.header.is_empty() {
            write!(f, "; header: [{}]", self.header.join(", "))?;
        }
        if !self.detail.is_empty() {
            let rows: Vec<String> = self
                .detail
                .iter()
                .map(|(index, fields)| format!("row({}): [{}]", index, fields.join(", ")))
                .collect();
            write!(f, "; detail: {}", rows.join(", "))?;
        }
        Ok(())
    }
}
