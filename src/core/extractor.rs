//! Extractor synthesis
//!
//! Reconciles what an output file needs (a [`FileSpec`]) with what one input
//! layout supplies (a [`Source`]). Every output property gets exactly one
//! [`Binding`], decided once per (source, result) pair:
//!
//! 1. **Derived** - the source maps the name to a cell or column label
//! 2. **SourceDefault** - the source's `defaultValues` has the name
//! 3. **Constant** - the output property has a literal `defaultValue`
//! 4. **RowIndex** - the output `defaultValue` is exactly `${index}`
//! 5. **UserInput** - nothing above applies; the caller must supply it
//!
//! The list is in precedence order. A derived value whose sheet cell comes
//! out blank falls back to the source default, then the output default.

use super::replacements::Replacements;
use super::template::normalize_date;
use crate::error::{ErpError, ErpResult, ExtractionError};
use crate::excel::{CellRef, Sheet, TableScanner, Workbook};
use crate::types::{FileSpec, PropertyType, ResultConfig, ResultProperty, Source};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Placeholder marking a row-position default
pub const INDEX_PLACEHOLDER: &str = "${index}";

/// Output field name → rendered value
pub type Record = HashMap<String, String>;

/// Caller-supplied values for user-input fields
pub type UserInput = HashMap<String, String>;

/// How one output property gets its value
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<L> {
    Derived {
        locator: L,
        replacements: Replacements,
        /// Used when the sheet value is blank
        fallback: Option<String>,
    },
    SourceDefault(String),
    Constant(String),
    RowIndex,
    UserInput,
}

impl<L> Binding<L> {
    /// Blank values are an extraction error
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Binding::Derived { fallback: None, .. } | Binding::UserInput
        )
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Binding::Derived { .. } => "sheet",
            Binding::SourceDefault(_) => "source default",
            Binding::Constant(_) => "constant",
            Binding::RowIndex => "row index",
            Binding::UserInput => "user input",
        }
    }
}

/// One output property and its binding
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan<L> {
    pub name: String,
    pub kind: PropertyType,
    pub binding: Binding<L>,
}

/// A value the caller has to collect before conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    pub name: String,
    pub prompt: String,
    pub kind: PropertyType,
}

/// Extracted records of one order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub header: Record,
    pub detail: Vec<Record>,
}

/// Header and detail extractors of one source, plus its missing fields.
///
/// Built once from an immutable config; holds no mutable state.
#[derive(Debug, Clone)]
pub struct SourceExtractor {
    source_name: String,
    sheet_index: usize,
    header: Vec<FieldPlan<CellRef>>,
    detail_origin: CellRef,
    end_value: Option<String>,
    detail: Vec<FieldPlan<String>>,
    missing: Vec<MissingField>,
}

impl SourceExtractor {
    /// Classify every header and detail output property for `source`.
    pub fn synthesize(source: &Source, result: &ResultConfig) -> ErpResult<Self> {
        let header_mappings = source
            .header
            .iter()
            .map(|p| {
                let cell = CellRef::parse(&p.locator).map_err(|e| {
                    ErpError::Config(format!(
                        "Source '{}', header property '{}': {}",
                        source.name, p.name, e
                    ))
                })?;
                Ok((p.name.as_str(), (cell, p.replacements.compile()?)))
            })
            .collect::<ErpResult<HashMap<_, _>>>()?;

        let detail_origin = CellRef::parse(&source.detail.locator).map_err(|e| {
            ErpError::Config(format!("Source '{}', detail locator: {}", source.name, e))
        })?;

        let detail_mappings = source
            .detail
            .properties
            .iter()
            .map(|p| Ok((p.name.as_str(), (p.locator.clone(), p.replacements.compile()?))))
            .collect::<ErpResult<HashMap<_, _>>>()?;

        warn_unused(&source.name, "header", &result.header, header_mappings.keys().copied());
        warn_unused(&source.name, "detail", &result.detail, detail_mappings.keys().copied());

        let header = plan_fields(&result.header, &header_mappings, &source.default_values);
        let detail = plan_fields(&result.detail, &detail_mappings, &source.default_values);

        let mut missing: Vec<MissingField> = Vec::new();
        let user_inputs = user_input_properties(&header, &result.header)
            .chain(user_input_properties(&detail, &result.detail));
        for prop in user_inputs {
            if !missing.iter().any(|m| m.name == prop.name) {
                missing.push(MissingField {
                    name: prop.name.clone(),
                    prompt: prop.prompt().to_string(),
                    kind: prop.kind,
                });
            }
        }

        debug!(
            source = %source.name,
            header = header.len(),
            detail = detail.len(),
            missing = missing.len(),
            "synthesized extractor"
        );

        Ok(Self {
            source_name: source.name.clone(),
            sheet_index: source.sheet_index,
            header,
            detail_origin,
            end_value: source.detail.end_value.clone(),
            detail,
            missing,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    /// Fields the caller must supply, header fields first
    pub fn missing_fields(&self) -> &[MissingField] {
        &self.missing
    }

    pub fn header_plan(&self) -> &[FieldPlan<CellRef>] {
        &self.header
    }

    pub fn detail_plan(&self) -> &[FieldPlan<String>] {
        &self.detail
    }

    /// Header values from the workbook; user-input fields are left out.
    pub fn extract_header(&self, workbook: &Workbook) -> ErpResult<Record> {
        let sheet = workbook.sheet(self.sheet_index)?;
        Ok(self.header_from_sheet(sheet))
    }

    /// Detail rows from the workbook; user-input fields are left out.
    pub fn extract_detail(&self, workbook: &Workbook) -> ErpResult<Vec<Record>> {
        let sheet = workbook.sheet(self.sheet_index)?;
        Ok(self.detail_from_sheet(sheet))
    }

    /// Unvalidated header and detail, for previewing a file
    pub fn preview(&self, workbook: &Workbook) -> ErpResult<Extraction> {
        let sheet = workbook.sheet(self.sheet_index)?;
        Ok(Extraction {
            header: self.header_from_sheet(sheet),
            detail: self.detail_from_sheet(sheet),
        })
    }

    /// Extract, merge user input, and check every required value.
    ///
    /// Fails with one [`ExtractionError`] listing every blank required
    /// header field and every offending detail row.
    pub fn extract(&self, workbook: &Workbook, inputs: &UserInput) -> ErpResult<Extraction> {
        let mut extraction = self.preview(workbook)?;

        apply_inputs(&self.header, &mut extraction.header, inputs);
        for row in &mut extraction.detail {
            apply_inputs(&self.detail, row, inputs);
        }

        self.validate(&extraction)?;
        Ok(extraction)
    }

    /// Collect every blank required value
    pub fn validate(&self, extraction: &Extraction) -> Result<(), ExtractionError> {
        let report = ExtractionError {
            header: blank_required(&self.header, &extraction.header),
            detail: extraction
                .detail
                .iter()
                .enumerate()
                .filter_map(|(index, row)| {
                    let blanks = blank_required(&self.detail, row);
                    (!blanks.is_empty()).then_some((index, blanks))
                })
                .collect(),
        };
        if !report.is_empty() {
            warn!(source = %self.source_name, "{}", report);
        }
        report.into_result()
    }

    fn header_from_sheet(&self, sheet: &Sheet) -> Record {
        let mut record = Record::new();
        for plan in &self.header {
            let value = match &plan.binding {
                Binding::Derived {
                    locator,
                    replacements,
                    fallback,
                } => derive(
                    sheet.text_at(*locator).unwrap_or_default(),
                    replacements,
                    fallback,
                ),
                Binding::SourceDefault(value) | Binding::Constant(value) => value.clone(),
                Binding::RowIndex => "0".to_string(),
                Binding::UserInput => continue,
            };
            record.insert(plan.name.clone(), value);
        }
        record
    }

    fn detail_from_sheet(&self, sheet: &Sheet) -> Vec<Record> {
        TableScanner::new(sheet, self.detail_origin)
            .with_end_value(self.end_value.as_deref())
            .scan()
            .into_iter()
            .enumerate()
            .map(|(index, row)| {
                let mut record = Record::new();
                for plan in &self.detail {
                    let value = match &plan.binding {
                        Binding::Derived {
                            locator,
                            replacements,
                            fallback,
                        } => derive(
                            row.get(locator).cloned().unwrap_or_default(),
                            replacements,
                            fallback,
                        ),
                        Binding::SourceDefault(value) | Binding::Constant(value) => {
                            value.clone()
                        }
                        Binding::RowIndex => index.to_string(),
                        Binding::UserInput => continue,
                    };
                    record.insert(plan.name.clone(), value);
                }
                record
            })
            .collect()
    }
}

/// Classify each property of `spec` against the source's mappings
fn plan_fields<L: Clone>(
    spec: &FileSpec,
    mappings: &HashMap<&str, (L, Replacements)>,
    source_defaults: &BTreeMap<String, String>,
) -> Vec<FieldPlan<L>> {
    spec.properties
        .iter()
        .map(|prop| FieldPlan {
            name: prop.name.clone(),
            kind: prop.kind,
            binding: classify(prop, mappings.get(prop.name.as_str()), source_defaults),
        })
        .collect()
}

fn classify<L: Clone>(
    prop: &ResultProperty,
    mapping: Option<&(L, Replacements)>,
    source_defaults: &BTreeMap<String, String>,
) -> Binding<L> {
    let source_default = source_defaults.get(&prop.name);
    let spec_default = prop
        .default_value
        .as_ref()
        .filter(|v| v.as_str() != INDEX_PLACEHOLDER);

    if let Some((locator, replacements)) = mapping {
        return Binding::Derived {
            locator: locator.clone(),
            replacements: replacements.clone(),
            fallback: source_default.or(spec_default).cloned(),
        };
    }
    if let Some(value) = source_default {
        return Binding::SourceDefault(value.clone());
    }
    match prop.default_value.as_deref() {
        Some(INDEX_PLACEHOLDER) => Binding::RowIndex,
        Some(value) => Binding::Constant(value.to_string()),
        None => Binding::UserInput,
    }
}

fn derive(raw: String, replacements: &Replacements, fallback: &Option<String>) -> String {
    let value = replacements.apply(&raw);
    match fallback {
        Some(fallback) if value.trim().is_empty() => fallback.clone(),
        _ => value,
    }
}

fn apply_inputs<L>(plans: &[FieldPlan<L>], record: &mut Record, inputs: &UserInput) {
    for plan in plans {
        if !matches!(plan.binding, Binding::UserInput) {
            continue;
        }
        if let Some(value) = inputs.get(&plan.name) {
            let value = match plan.kind {
                PropertyType::Date => normalize_date(value),
                PropertyType::Text => value.clone(),
            };
            record.insert(plan.name.clone(), value);
        }
    }
}

fn blank_required<L>(plans: &[FieldPlan<L>], record: &Record) -> Vec<String> {
    plans
        .iter()
        .filter(|plan| plan.binding.is_required())
        .filter(|plan| {
            record
                .get(&plan.name)
                .map_or(true, |value| value.trim().is_empty())
        })
        .map(|plan| plan.name.clone())
        .collect()
}

fn user_input_properties<'a, L>(
    plans: &'a [FieldPlan<L>],
    spec: &'a FileSpec,
) -> impl Iterator<Item = &'a ResultProperty> {
    plans
        .iter()
        .zip(&spec.properties)
        .filter(|(plan, _)| matches!(plan.binding, Binding::UserInput))
        .map(|(_, prop)| prop)
}

fn warn_unused<'a>(
    source: &str,
    section: &str,
    spec: &FileSpec,
    mapped: impl IntoIterator<Item = &'a str>,
) {
    for name in mapped {
        if spec.property(name).is_none() {
            warn!(source, section, property = %name, "mapped property is not part of the output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ReplacementRules;
    use crate::types::{DetailConfig, PropertyType, SourceProperty};

    fn property(name: &str, locator: &str) -> SourceProperty {
        SourceProperty {
            name: name.to_string(),
            locator: locator.to_string(),
            replacements: ReplacementRules::default(),
        }
    }

    fn file_spec(properties: Vec<ResultProperty>) -> FileSpec {
        FileSpec {
            filename: "f.txt".to_string(),
            prolog: String::new(),
            epilog: String::new(),
            properties,
        }
    }

    fn result_config(header: Vec<ResultProperty>, detail: Vec<ResultProperty>) -> ResultConfig {
        ResultConfig {
            separator: "\t".to_string(),
            base_name: "${sourceName}".to_string(),
            header: file_spec(header),
            detail: file_spec(detail),
        }
    }

    fn source(header: Vec<SourceProperty>, detail: Vec<SourceProperty>) -> Source {
        Source {
            name: "acme".to_string(),
            description: String::new(),
            logo: None,
            sheet_index: 0,
            default_values: BTreeMap::new(),
            header,
            detail: DetailConfig {
                locator: "A4".to_string(),
                end_value: None,
                properties: detail,
            },
        }
    }

    fn order_sheet() -> Workbook {
        let mut sheet = Sheet::new("Pedido");
        sheet.set_at("B1", "PED-0042").unwrap();
        sheet.set_at("A4", "Cod.").unwrap();
        sheet.set_at("B4", "Cant.").unwrap();
        sheet.set_at("A5", "00123").unwrap();
        sheet.set_at("B5", 5.0).unwrap();
        sheet.set_at("A6", "00456").unwrap();
        sheet.set_at("B6", 2.5).unwrap();
        Workbook::new(vec![sheet])
    }

    #[test]
    fn test_missing_list_is_exactly_the_unresolved_names() {
        let result = result_config(
            vec![
                ResultProperty::new("A"),
                ResultProperty::new("B"),
                ResultProperty::new("C"),
            ],
            vec![],
        );
        let mut src = source(vec![property("A", "B1")], vec![]);
        src.default_values.insert("B".to_string(), "1".to_string());

        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();
        let missing: Vec<&str> = extractor
            .missing_fields()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(missing, vec!["C"]);

        let header = extractor.extract_header(&order_sheet()).unwrap();
        assert_eq!(header["A"], "PED-0042");
        assert_eq!(header["B"], "1");
        assert!(!header.contains_key("C"));

        // B ignores the sheet no matter what it holds
        let empty = Workbook::new(vec![Sheet::new("blank")]);
        assert_eq!(extractor.extract_header(&empty).unwrap()["B"], "1");
    }

    #[test]
    fn test_classification_precedence() {
        let result = result_config(
            vec![
                ResultProperty::new("Mapped").with_default("fallback"),
                ResultProperty::new("SourceWins").with_default("fallback"),
                ResultProperty::new("Literal").with_default("NEX"),
                ResultProperty::new("Line").with_default("${index}"),
                ResultProperty::new("Asked"),
            ],
            vec![],
        );
        let mut src = source(vec![property("Mapped", "B1")], vec![]);
        src.default_values
            .insert("SourceWins".to_string(), "source".to_string());

        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();
        let kinds: Vec<&str> = extractor
            .header_plan()
            .iter()
            .map(|p| p.binding.kind_name())
            .collect();
        assert_eq!(
            kinds,
            vec!["sheet", "source default", "constant", "row index", "user input"]
        );

        let header = extractor.extract_header(&order_sheet()).unwrap();
        assert_eq!(header["SourceWins"], "source");
        assert_eq!(header["Literal"], "NEX");
        assert_eq!(header["Line"], "0");
    }

    #[test]
    fn test_blank_derived_value_falls_back_to_default() {
        let result = result_config(
            vec![ResultProperty::new("Comments").with_default("none")],
            vec![],
        );
        let src = source(vec![property("Comments", "Z99")], vec![]);
        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();

        assert!(!extractor.header_plan()[0].binding.is_required());
        let extraction = extractor
            .extract(&order_sheet(), &UserInput::new())
            .unwrap();
        assert_eq!(extraction.header["Comments"], "none");
    }

    #[test]
    fn test_detail_rows_remap_labels_and_apply_replacements() {
        let result = result_config(
            vec![],
            vec![
                ResultProperty::new("LineNum").with_default("${index}"),
                ResultProperty::new("ItemCode"),
                ResultProperty::new("Quantity"),
                ResultProperty::new("Warehouse").with_default("CD"),
            ],
        );
        let mut item = property("ItemCode", "Cod.");
        item.replacements = ReplacementRules::new([("^0+", "")]);
        let src = source(vec![], vec![item, property("Quantity", "Cant.")]);

        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();
        let rows = extractor.extract_detail(&order_sheet()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["ItemCode"], "123");
        assert_eq!(rows[0]["Quantity"], "5");
        assert_eq!(rows[0]["LineNum"], "0");
        assert_eq!(rows[1]["ItemCode"], "456");
        assert_eq!(rows[1]["Quantity"], "2.5");
        assert_eq!(rows[1]["LineNum"], "1");
        assert_eq!(rows[1]["Warehouse"], "CD");
    }

    #[test]
    fn test_blank_detail_rows_are_all_reported() {
        let result = result_config(
            vec![],
            vec![ResultProperty::new("ItemCode"), ResultProperty::new("Quantity")],
        );
        let src = source(
            vec![],
            vec![property("ItemCode", "Cod."), property("Quantity", "Cant.")],
        );
        let mut sheet = Sheet::new("Pedido");
        sheet.set_at("A4", "Cod.").unwrap();
        sheet.set_at("B4", "Cant.").unwrap();
        for (row, qty) in [(5, ""), (6, "3"), (7, " ")] {
            sheet.set_at(&format!("A{row}"), "X").unwrap();
            sheet.set_at(&format!("B{row}"), qty).unwrap();
        }
        let workbook = Workbook::new(vec![sheet]);

        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();
        let err = extractor
            .extract(&workbook, &UserInput::new())
            .unwrap_err();

        match err {
            ErpError::Extraction(report) => {
                assert!(report.header.is_empty());
                assert_eq!(
                    report.detail,
                    vec![
                        (0, vec!["Quantity".to_string()]),
                        (2, vec!["Quantity".to_string()]),
                    ]
                );
            }
            other => panic!("Expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn test_user_input_is_merged_and_validated() {
        let result = result_config(
            vec![
                ResultProperty::new("DocDate").with_kind(PropertyType::Date),
                ResultProperty::new("Comments"),
            ],
            vec![ResultProperty::new("Project")],
        );
        let src = source(vec![], vec![]);
        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();

        let names: Vec<&str> = extractor
            .missing_fields()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["DocDate", "Comments", "Project"]);

        let mut inputs = UserInput::new();
        inputs.insert("DocDate".to_string(), "2024-12-15".to_string());
        let err = extractor.extract(&order_sheet(), &inputs).unwrap_err();
        assert!(err.to_string().contains("header: [Comments]"));

        inputs.insert("Comments".to_string(), "urgente".to_string());
        inputs.insert("Project".to_string(), "P1".to_string());
        let extraction = extractor.extract(&order_sheet(), &inputs).unwrap();
        assert_eq!(extraction.header["DocDate"], "20241215");
        assert_eq!(extraction.header["Comments"], "urgente");
        // Detail table at A4 is absent from this source's mapping but still scanned
        assert!(extraction.detail.iter().all(|row| row["Project"] == "P1"));
    }

    #[test]
    fn test_invalid_locator_is_config_error() {
        let result = result_config(vec![ResultProperty::new("A")], vec![]);
        let src = source(vec![property("A", "1B")], vec![]);
        let err = SourceExtractor::synthesize(&src, &result).unwrap_err();
        assert!(matches!(err, ErpError::Config(_)));
        assert!(err.to_string().contains("'1B'"));

        let mut bad_detail = source(vec![], vec![]);
        bad_detail.detail.locator = "nope".to_string();
        assert!(SourceExtractor::synthesize(&bad_detail, &result).is_err());
    }

    #[test]
    fn test_missing_sheet_index_is_workbook_error() {
        let result = result_config(vec![], vec![]);
        let mut src = source(vec![], vec![]);
        src.sheet_index = 2;
        let extractor = SourceExtractor::synthesize(&src, &result).unwrap();
        let err = extractor.preview(&order_sheet()).unwrap_err();
        assert!(matches!(err, ErpError::Workbook(_)));
    }
}
