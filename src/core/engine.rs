//! Conversion engine: one synthesized extractor per configured source

use super::extractor::{Extraction, MissingField, SourceExtractor, UserInput};
use crate::error::{ErpError, ErpResult};
use crate::excel::Workbook;
use crate::parser;
use crate::types::{Config, Source};
use crate::writer::{self, Package};
use std::path::Path;
use tracing::info;

/// Immutable conversion state built once at startup and shared read-only
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    extractors: Vec<SourceExtractor>,
}

impl Engine {
    /// Synthesize extractors for every source of an already validated config
    pub fn new(config: Config) -> ErpResult<Self> {
        let extractors = config
            .sources
            .iter()
            .map(|source| SourceExtractor::synthesize(source, &config.result))
            .collect::<ErpResult<Vec<_>>>()?;

        info!(
            config = %config.name,
            sources = extractors.len(),
            "engine ready"
        );

        Ok(Self { config, extractors })
    }

    /// Load, validate and synthesize from a YAML or JSON file
    pub fn from_path(path: &Path) -> ErpResult<Self> {
        Self::new(parser::load_config(path)?)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sources(&self) -> &[Source] {
        &self.config.sources
    }

    pub fn extractor(&self, source: &str) -> ErpResult<&SourceExtractor> {
        self.extractors
            .iter()
            .find(|e| e.source_name() == source)
            .ok_or_else(|| ErpError::UnknownSource(source.to_string()))
    }

    /// Fields the caller must supply for `source`
    pub fn missing_fields(&self, source: &str) -> ErpResult<&[MissingField]> {
        Ok(self.extractor(source)?.missing_fields())
    }

    /// Fail with every user-input field of `source` that `inputs` leaves blank
    pub fn check_inputs(&self, source: &str, inputs: &UserInput) -> ErpResult<()> {
        let unset: Vec<String> = self
            .missing_fields(source)?
            .iter()
            .filter(|field| inputs.get(&field.name).map_or(true, |v| v.trim().is_empty()))
            .map(|field| field.name.clone())
            .collect();
        if unset.is_empty() {
            Ok(())
        } else {
            Err(ErpError::MissingInput(unset))
        }
    }

    /// Unvalidated extraction, for showing a file before converting it
    pub fn preview(&self, source: &str, workbook: &Workbook) -> ErpResult<Extraction> {
        self.extractor(source)?.preview(workbook)
    }

    /// Extract, validate and package one order
    pub fn convert(
        &self,
        source: &str,
        workbook: &Workbook,
        inputs: &UserInput,
    ) -> ErpResult<Package> {
        let extraction = self.extractor(source)?.extract(workbook, inputs)?;
        writer::assemble(&self.config.result, source, &extraction, inputs)
    }
}
