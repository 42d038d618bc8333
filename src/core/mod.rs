//! Extraction core: replacements, templates, extractor synthesis

pub mod engine;
pub mod extractor;
pub mod replacements;
pub mod template;

pub use engine::Engine;
pub use extractor::{
    Binding, Extraction, FieldPlan, MissingField, Record, SourceExtractor, UserInput,
};
pub use replacements::{Replacement, ReplacementRules, Replacements};
pub use template::{expand, normalize_date};
