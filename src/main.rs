use clap::{Parser, Subcommand};
use excel2erp::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "excel2erp")]
#[command(about = "Convert client order spreadsheets into ERP import archives")]
#[command(long_about = "excel2erp - Spreadsheet to ERP converter

Reads a client's order workbook using the layout declared for that client
in the mapping document, and writes a zip with the header and detail text
files the ERP imports.

COMMANDS:
  sources   - List the configured client layouts
  missing   - Show the values a user must supply for a layout
  preview   - Print what would be extracted from a workbook
  convert   - Write the ERP archive

EXAMPLES:
  excel2erp sources
  excel2erp missing el-dorado
  excel2erp preview el-dorado pedido.xlsx
  excel2erp convert el-dorado pedido.xlsx -o out --set DocDueDate=2024-12-20")]
#[command(version)]
struct Cli {
    /// Mapping document (YAML or JSON)
    #[arg(
        short,
        long,
        global = true,
        env = "EXCEL2ERP_CONFIG",
        default_value = "excel2erp.yaml"
    )]
    config: PathBuf,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured sources
    Sources,

    /// Show the user-input fields of a source
    Missing {
        /// Source name
        source: String,
    },

    /// Print the extracted header and detail without validating
    Preview {
        /// Source name
        source: String,

        /// Workbook to read (.xlsx, .xls, .ods)
        workbook: PathBuf,
    },

    #[command(long_about = "Convert one workbook into an ERP archive.

Every user-input field reported by 'missing' must be given with --set.
Date fields are reduced to their digits (2024-12-20 becomes 20241220).

The archive name comes from the result's baseName template, expanded
with the header values, the user inputs and ${sourceName}.")]
    /// Write the ERP archive for a workbook
    Convert {
        /// Source name
        source: String,

        /// Workbook to read (.xlsx, .xls, .ods)
        workbook: PathBuf,

        /// Directory for the archive
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// User input value, repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = cli::parse_assignment)]
        set: Vec<(String, String)>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "excel2erp=debug"
    } else {
        "excel2erp=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sources => cli::sources(&cli.config)?,

        Commands::Missing { source } => cli::missing(&cli.config, &source)?,

        Commands::Preview { source, workbook } => {
            cli::preview(&cli.config, &source, &workbook)?
        }

        Commands::Convert {
            source,
            workbook,
            output,
            set,
        } => {
            cli::convert(&cli.config, &source, &workbook, &output, set)?;
        }
    }

    Ok(())
}
