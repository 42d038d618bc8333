use crate::error::{ErpError, ErpResult};
use crate::excel::CellRef;
use crate::types::{Config, FileSpec, SourceProperty};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Serialization of a mapping document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is read as YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Read, parse and validate a mapping document.
///
/// # Example
/// ```no_run
/// use excel2erp::parser::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("excel2erp.yaml"))?;
/// println!("Sources: {}", config.sources.len());
/// # Ok::<(), excel2erp::error::ErpError>(())
/// ```
pub fn load_config(path: &Path) -> ErpResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ErpError::Config(format!(
            "Failed to read config '{}': {}",
            path.display(),
            e
        ))
    })?;
    debug!(path = %path.display(), "loading config");
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse a mapping document from text and validate it
pub fn parse_config(content: &str, format: ConfigFormat) -> ErpResult<Config> {
    let config: Config = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Json => serde_json::from_str(content)?,
    };
    validate_config(&config)?;
    Ok(config)
}

/// Structural checks that deserialization alone cannot express
pub fn validate_config(config: &Config) -> ErpResult<()> {
    let mut seen = HashSet::new();
    for source in &config.sources {
        if !seen.insert(source.name.as_str()) {
            return Err(ErpError::Config(format!(
                "Duplicate source name '{}'",
                source.name
            )));
        }

        let context = format!("source '{}'", source.name);
        unique_names(
            source.header.iter().map(|p| p.name.as_str()),
            &format!("{} header", context),
        )?;
        unique_names(
            source.detail.properties.iter().map(|p| p.name.as_str()),
            &format!("{} detail", context),
        )?;

        for prop in &source.header {
            check_address(prop, &context)?;
        }
        for prop in source.header.iter().chain(&source.detail.properties) {
            check_replacements(prop, &context)?;
        }
        CellRef::parse(&source.detail.locator).map_err(|e| {
            ErpError::Config(format!("{} detail locator: {}", context, e))
        })?;
    }

    check_file_spec(&config.result.header, "result header")?;
    check_file_spec(&config.result.detail, "result detail")?;
    if config.result.header.filename == config.result.detail.filename {
        return Err(ErpError::Config(format!(
            "Header and detail share the filename '{}'",
            config.result.header.filename
        )));
    }
    Ok(())
}

fn check_file_spec(spec: &FileSpec, context: &str) -> ErpResult<()> {
    if spec.filename.trim().is_empty() {
        return Err(ErpError::Config(format!("{} has no filename", context)));
    }
    unique_names(spec.properties.iter().map(|p| p.name.as_str()), context)
}

fn check_address(prop: &SourceProperty, context: &str) -> ErpResult<()> {
    CellRef::parse(&prop.locator).map(|_| ()).map_err(|e| {
        ErpError::Config(format!("{} header field '{}': {}", context, prop.name, e))
    })
}

fn check_replacements(prop: &SourceProperty, context: &str) -> ErpResult<()> {
    prop.replacements.compile().map(|_| ()).map_err(|e| {
        ErpError::Config(format!("{} property '{}': {}", context, prop.name, e))
    })
}

fn unique_names<'a>(names: impl IntoIterator<Item = &'a str>, context: &str) -> ErpResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ErpError::Config(format!(
                "Duplicate property '{}' in {}",
                name, context
            )));
        }
    }
    Ok(())
}
