use crate::core::{Engine, UserInput};
use crate::error::{ErpError, ErpResult};
use crate::excel::Workbook;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a `NAME=VALUE` pair given on the command line
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

/// Execute the sources command - list configured input layouts
pub fn sources(config: &Path) -> ErpResult<()> {
    let engine = Engine::from_path(config)?;
    let cfg = engine.config();

    println!("{}", format!("📋 {}", cfg.name).bold().green());
    if !cfg.description.is_empty() {
        println!("   {}", cfg.description);
    }
    println!();

    for source in engine.sources() {
        println!("   {} {}", source.name.bright_blue().bold(), source.description);
    }
    println!();
    println!("   {} sources", engine.sources().len());

    Ok(())
}

/// Execute the missing command - show the values a user must supply
pub fn missing(config: &Path, source: &str) -> ErpResult<()> {
    let engine = Engine::from_path(config)?;
    let fields = engine.missing_fields(source)?;

    println!(
        "{}",
        format!("📝 User input for '{}'", source).bold().green()
    );
    if fields.is_empty() {
        println!("   {}", "Nothing to collect".cyan());
        return Ok(());
    }
    for field in fields {
        println!(
            "   {} ({}) {}",
            field.name.bright_blue().bold(),
            field.kind.type_name(),
            field.prompt
        );
    }

    Ok(())
}

/// Execute the preview command - print the extracted values without validating
pub fn preview(config: &Path, source: &str, workbook: &Path) -> ErpResult<()> {
    let engine = Engine::from_path(config)?;
    let extractor = engine.extractor(source)?;
    let book = Workbook::open(workbook)?;
    let extraction = extractor.preview(&book)?;

    println!("{}", "🔍 Preview".bold().green());
    println!("   Source:   {}", source.bright_blue().bold());
    println!("   Workbook: {}\n", workbook.display());

    println!("{}", "Header:".bold().cyan());
    for plan in extractor.header_plan() {
        let value = extraction
            .header
            .get(&plan.name)
            .map(String::as_str)
            .unwrap_or("");
        println!(
            "   {} = {} {}",
            plan.name.bright_blue(),
            value.bold(),
            format!("[{}]", plan.binding.kind_name()).dimmed()
        );
    }

    println!("\n{}", format!("Detail ({} rows):", extraction.detail.len()).bold().cyan());
    let names: Vec<&str> = extractor
        .detail_plan()
        .iter()
        .map(|plan| plan.name.as_str())
        .collect();
    println!("   {}", names.join(" | ").dimmed());
    for row in &extraction.detail {
        let values: Vec<&str> = names
            .iter()
            .map(|name| row.get(*name).map(String::as_str).unwrap_or(""))
            .collect();
        println!("   {}", values.join(" | "));
    }

    Ok(())
}

/// Execute the convert command - write the ERP archive for one workbook
pub fn convert(
    config: &Path,
    source: &str,
    workbook: &Path,
    output: &Path,
    assignments: Vec<(String, String)>,
) -> ErpResult<PathBuf> {
    let engine = Engine::from_path(config)?;
    let inputs: UserInput = assignments.into_iter().collect();

    if let Err(e) = engine.check_inputs(source, &inputs) {
        if let ErpError::MissingInput(ref names) = e {
            println!(
                "{}",
                format!("❌ Missing values: {}", names.join(", ")).bold().red()
            );
            println!("   Supply them with --set NAME=VALUE");
        }
        return Err(e);
    }

    println!("{}", "🔄 Converting".bold().green());
    println!("   Source:   {}", source.bright_blue().bold());
    println!("   Workbook: {}", workbook.display());

    let book = Workbook::open(workbook)?;
    let package = match engine.convert(source, &book, &inputs) {
        Ok(package) => package,
        Err(e) => {
            println!("\n{}", format!("❌ {}", e).bold().red());
            return Err(e);
        }
    };

    fs::create_dir_all(output)?;
    let path = output.join(&package.filename);
    fs::write(&path, &package.bytes)?;

    println!(
        "   Entries:  {}, {}",
        package.header.name, package.detail.name
    );
    println!("\n{}", "✅ Archive written".bold().green());
    println!("   {}", path.display());

    Ok(path)
}
