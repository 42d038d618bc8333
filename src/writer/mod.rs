//! Output assembly: delimited text files packed into one zip archive

use crate::core::template::{expand, INDEX_KEY};
use crate::core::{Extraction, Record, UserInput};
use crate::error::ErpResult;
use crate::types::{FileSpec, ResultConfig};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use tracing::{info, warn};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Synthetic template key holding the source name
pub const SOURCE_NAME_KEY: &str = "sourceName";

/// One rendered text entry of the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    pub name: String,
    pub content: String,
}

/// A finished conversion: both text files and the zip that carries them
#[derive(Debug, Clone)]
pub struct Package {
    /// Archive name, `.zip` included
    pub filename: String,
    pub header: RenderedFile,
    pub detail: RenderedFile,
    pub bytes: Vec<u8>,
}

/// Render `records` as one line each, framed by the file's prolog and epilog.
///
/// A value is the record's non-blank value, else the property's
/// `defaultValue`, else empty. Values containing `${` are expanded against
/// `context`, the record, and the row `index`, in that order of precedence
/// from lowest to highest.
pub fn render_file(
    spec: &FileSpec,
    separator: &str,
    records: &[Record],
    context: &HashMap<String, String>,
) -> String {
    let mut lines = Vec::with_capacity(records.len() + 2);

    let prolog = spec.prolog.trim_end();
    if !prolog.is_empty() {
        lines.push(prolog.to_string());
    }
    for (index, record) in records.iter().enumerate() {
        lines.push(render_line(spec, separator, record, index, context));
    }
    let epilog = spec.epilog.trim_end();
    if !epilog.is_empty() {
        lines.push(epilog.to_string());
    }

    lines.join("\n")
}

/// One delimited line in the property order of `spec`
pub fn render_line(
    spec: &FileSpec,
    separator: &str,
    record: &Record,
    index: usize,
    context: &HashMap<String, String>,
) -> String {
    let mut values: Option<HashMap<String, String>> = None;

    spec.properties
        .iter()
        .map(|prop| {
            let value = record
                .get(&prop.name)
                .filter(|v| !v.trim().is_empty())
                .or(prop.default_value.as_ref())
                .map(String::as_str)
                .unwrap_or_default();

            if !value.contains("${") {
                return value.to_string();
            }
            let values = values.get_or_insert_with(|| {
                let mut merged = context.clone();
                merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));
                merged.insert(INDEX_KEY.to_string(), index.to_string());
                merged
            });
            expand(value, values)
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Archive name: `base_name` expanded against `context`, plus `.zip`.
///
/// Expanded values come from the workbook, so the result is reduced to a
/// single path component.
pub fn archive_name(base_name: &str, context: &HashMap<String, String>) -> String {
    format!("{}.zip", file_name(&expand(base_name, context)))
}

/// Expand a file name template into a plain name with no directory part
fn file_name(expanded: &str) -> String {
    let name: String = expanded
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if name != expanded {
        warn!(from = %expanded, to = %name, "replaced path characters in file name");
    }
    name
}

/// Zip the given entries, in order, as deflated UTF-8 text
pub fn write_archive(entries: &[&RenderedFile]) -> ErpResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(entry.content.as_bytes())?;
    }

    Ok(zip.finish()?.into_inner())
}

/// Render header and detail files for one validated extraction and zip them
pub fn assemble(
    result: &ResultConfig,
    source_name: &str,
    extraction: &Extraction,
    inputs: &UserInput,
) -> ErpResult<Package> {
    let mut context: HashMap<String, String> = inputs.clone();
    context.insert(SOURCE_NAME_KEY.to_string(), source_name.to_string());

    let header = RenderedFile {
        name: file_name(&expand(&result.header.filename, &context)),
        content: render_file(
            &result.header,
            &result.separator,
            std::slice::from_ref(&extraction.header),
            &context,
        ),
    };

    context.extend(
        extraction
            .header
            .iter()
            .map(|(k, v)| (k.clone(), v.clone())),
    );
    context.insert(SOURCE_NAME_KEY.to_string(), source_name.to_string());

    let detail = RenderedFile {
        name: file_name(&expand(&result.detail.filename, &context)),
        content: render_file(
            &result.detail,
            &result.separator,
            &extraction.detail,
            &context,
        ),
    };

    let filename = archive_name(&result.base_name, &context);
    let bytes = write_archive(&[&header, &detail])?;

    info!(
        archive = %filename,
        rows = extraction.detail.len(),
        bytes = bytes.len(),
        "package assembled"
    );

    Ok(Package {
        filename,
        header,
        detail,
        bytes,
    })
}
