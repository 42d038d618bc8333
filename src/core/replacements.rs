//! Ordered regex replacements applied to mapped values

use crate::error::{ErpError, ErpResult};
use crate::types::ScalarText;
use regex::Regex;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// One `pattern → replacement` pair
#[derive(Debug, Clone)]
pub struct Replacement {
    pattern: Regex,
    replacement: String,
}

impl Replacement {
    pub fn new(pattern: &str, replacement: impl Into<String>) -> ErpResult<Self> {
        let compiled = Regex::new(pattern).map_err(|e| {
            ErpError::Config(format!("Invalid replacement pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            pattern: compiled,
            replacement: replacement.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Replace every match
    pub fn apply(&self, value: &str) -> String {
        self.pattern
            .replace_all(value, self.replacement.as_str())
            .into_owned()
    }
}

impl PartialEq for Replacement {
    fn eq(&self, other: &Self) -> bool {
        self.pattern() == other.pattern() && self.replacement == other.replacement
    }
}

/// Replacement pipeline, applied in declaration order.
///
/// `[(a→b), (b→c)]` turns `"a"` into `"c"`. An empty pipeline is the identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Replacements(Vec<Replacement>);

impl Replacements {
    pub fn new<P, R>(pairs: impl IntoIterator<Item = (P, R)>) -> ErpResult<Self>
    where
        P: AsRef<str>,
        R: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(pattern, replacement)| Replacement::new(pattern.as_ref(), replacement))
            .collect::<ErpResult<Vec<_>>>()
            .map(Self)
    }

    pub fn apply(&self, raw: &str) -> String {
        self.0
            .iter()
            .fold(raw.to_string(), |acc, replacement| replacement.apply(&acc))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replacement> {
        self.0.iter()
    }
}

/// Replacement pairs as written in the mapping document, in declaration
/// order and not yet compiled.
///
/// Compiling is left to config validation so a bad pattern is reported as a
/// configuration error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementRules(Vec<(String, String)>);

impl ReplacementRules {
    pub fn new<P: Into<String>, R: Into<String>>(pairs: impl IntoIterator<Item = (P, R)>) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(p, r)| (p.into(), r.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn compile(&self) -> ErpResult<Replacements> {
        Replacements::new(self.0.iter().map(|(p, r)| (p.as_str(), r.as_str())))
    }
}

/// Reads a mapping while keeping its order
impl<'de> Deserialize<'de> for ReplacementRules {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedPairs;

        impl<'de> Visitor<'de> for OrderedPairs {
            type Value = ReplacementRules;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of regex pattern to replacement")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(ReplacementRules::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::new();
                while let Some((pattern, replacement)) =
                    map.next_entry::<ScalarText, ScalarText>()?
                {
                    pairs.push((pattern.0, replacement.0));
                }
                Ok(ReplacementRules(pairs))
            }
        }

        deserializer.deserialize_any(OrderedPairs)
    }
}
