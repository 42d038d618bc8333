use crate::core::ReplacementRules;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

//==============================================================================
// Application configuration
//==============================================================================

/// Whole mapping document: the shared output shape plus every input layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    /// UI label overrides
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    #[serde(default)]
    pub sources: Vec<Source>,
    pub result: ResultConfig,
}

impl Config {
    /// Label override for `name`, or the name itself
    pub fn param<'a>(&'a self, name: &'a str) -> &'a str {
        self.parameters.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.name == name)
    }
}

//==============================================================================
// Input layouts
//==============================================================================

/// One client's spreadsheet layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub sheet_index: usize,
    #[serde(default, deserialize_with = "scalar_map")]
    pub default_values: BTreeMap<String, String>,
    /// Header fields; locators are A1 addresses
    #[serde(default)]
    pub header: Vec<SourceProperty>,
    pub detail: DetailConfig,
}

/// Where one value lives and how it is cleaned up
#[derive(Debug, Clone, Deserialize)]
pub struct SourceProperty {
    pub name: String,
    /// A1 address (header) or column label (detail)
    pub locator: String,
    #[serde(default)]
    pub replacements: ReplacementRules,
}

/// Line-item table of one layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailConfig {
    /// A1 address of the label row's first cell
    pub locator: String,
    #[serde(default, deserialize_with = "optional_scalar")]
    pub end_value: Option<String>,
    #[serde(default)]
    pub properties: Vec<SourceProperty>,
}

//==============================================================================
// Output shape
//==============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultConfig {
    pub separator: String,
    /// Archive name template, expanded without the `.zip` suffix
    pub base_name: String,
    pub header: FileSpec,
    pub detail: FileSpec,
}

/// Declared shape of one output text file
#[derive(Debug, Clone, Deserialize)]
pub struct FileSpec {
    pub filename: String,
    #[serde(default)]
    pub prolog: String,
    #[serde(default)]
    pub epilog: String,
    pub properties: Vec<ResultProperty>,
}

impl FileSpec {
    pub fn property(&self, name: &str) -> Option<&ResultProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultProperty {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: PropertyType,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Literal, template, or exactly `${index}`
    #[serde(default, deserialize_with = "optional_scalar")]
    pub default_value: Option<String>,
}

impl ResultProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyType::Text,
            prompt: None,
            default_value: None,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_kind(mut self, kind: PropertyType) -> Self {
        self.kind = kind;
        self
    }

    /// Prompt shown when the user has to supply the value
    pub fn prompt(&self) -> &str {
        self.prompt.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[default]
    Text,
    Date,
}

impl PropertyType {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Date => "date",
        }
    }
}

//==============================================================================
// Scalar helpers
//==============================================================================

/// Any YAML/JSON scalar read as text (`77086`, `true`, `"abc"`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarText(pub String);

impl<'de> Deserialize<'de> for ScalarText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = ScalarText;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(ScalarText(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(ScalarText(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ScalarText(String::new()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<ScalarText>::deserialize(deserializer)?.map(|s| s.0))
}

fn scalar_map<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let map = Option::<BTreeMap<String, ScalarText>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, v.0))
        .collect())
}
