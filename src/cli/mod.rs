//! CLI command handlers

pub mod commands;

pub use commands::{convert, missing, parse_assignment, preview, sources};
