//! Bank template table.
//!
//! A template is a plain record: which texts identify the issuer and which
//! patterns pull each statement field. The table is compiled and validated
//! once, then shared read-only by every parse.

mod builtin;

pub use builtin::builtin_specs;

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TemplateError;
use crate::models::statement::FieldName;

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

lazy_static! {
    static ref BUILTIN_TABLE: TemplateTable =
        TemplateTable::from_specs(builtin_specs()).expect("built-in templates are valid");
}

/// Editable description of one bank template.
///
/// This is the configuration surface: an ordered JSON list of these records
/// makes up a template table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSpec {
    /// Unique short identifier.
    pub bank_key: String,

    /// Human-readable names; the first is canonical.
    pub display_name: Vec<String>,

    /// Any match asserts this bank.
    pub identifier_patterns: Vec<String>,

    /// Field name to ordered extraction patterns.
    #[serde(default)]
    pub field_patterns: BTreeMap<String, Vec<String>>,
}

impl TemplateSpec {
    pub fn new<I, S>(bank_key: impl Into<String>, display_name: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bank_key: bank_key.into(),
            display_name: display_name.into_iter().map(Into::into).collect(),
            identifier_patterns: Vec::new(),
            field_patterns: BTreeMap::new(),
        }
    }

    pub fn with_identifiers<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identifier_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn with_field<I, S>(mut self, field: FieldName, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_patterns
            .entry(field.as_str().to_string())
            .or_default()
            .extend(patterns.into_iter().map(Into::into));
        self
    }
}

/// A compiled, validated bank template.
#[derive(Debug, Clone)]
pub struct BankTemplate {
    bank_key: String,
    display_name: Vec<String>,
    identifier_patterns: Vec<Regex>,
    field_patterns: BTreeMap<FieldName, Vec<Regex>>,
}

impl BankTemplate {
    /// Validate and compile a template spec.
    ///
    /// All patterns are compiled case-insensitively.
    pub fn compile(spec: &TemplateSpec) -> Result<Self> {
        let bank_key = spec.bank_key.trim();

        if spec.display_name.iter().all(|n| n.trim().is_empty()) {
            return Err(TemplateError::MissingDisplayName(bank_key.to_string()));
        }
        if spec.identifier_patterns.is_empty() {
            return Err(TemplateError::MissingIdentifiers(bank_key.to_string()));
        }

        let identifier_patterns = spec
            .identifier_patterns
            .iter()
            .map(|p| compile_pattern(bank_key, p))
            .collect::<Result<Vec<_>>>()?;

        let mut field_patterns = BTreeMap::new();
        for (key, patterns) in &spec.field_patterns {
            let field = FieldName::from_str(key).map_err(|_| TemplateError::UnknownField {
                bank_key: bank_key.to_string(),
                field: key.clone(),
            })?;
            if patterns.is_empty() {
                return Err(TemplateError::EmptyFieldPatterns {
                    bank_key: bank_key.to_string(),
                    field: key.clone(),
                });
            }
            let compiled = patterns
                .iter()
                .map(|p| compile_pattern(bank_key, p))
                .collect::<Result<Vec<_>>>()?;
            field_patterns.insert(field, compiled);
        }

        Ok(Self {
            bank_key: bank_key.to_string(),
            display_name: spec
                .display_name
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            identifier_patterns,
            field_patterns,
        })
    }

    pub fn bank_key(&self) -> &str {
        &self.bank_key
    }

    /// Canonical display name.
    pub fn name(&self) -> &str {
        // Compile rejects templates without a non-empty name.
        self.display_name.first().map(String::as_str).unwrap_or(&self.bank_key)
    }

    pub fn display_names(&self) -> &[String] {
        &self.display_name
    }

    pub fn identifier_patterns(&self) -> &[Regex] {
        &self.identifier_patterns
    }

    /// Patterns for a field, empty when the template omits it.
    pub fn field_patterns(&self, field: FieldName) -> &[Regex] {
        self.field_patterns
            .get(&field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether this template expects the field via pattern matching.
    pub fn defines(&self, field: FieldName) -> bool {
        self.field_patterns.contains_key(&field)
    }

    /// Whether any identifier pattern matches the text.
    pub fn is_identified_by(&self, text: &str) -> bool {
        self.identifier_patterns.iter().any(|p| p.is_match(text))
    }
}

fn compile_pattern(bank_key: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| TemplateError::InvalidPattern {
            bank_key: bank_key.to_string(),
            pattern: pattern.to_string(),
            source,
        })
}

/// Ordered, immutable collection of bank templates.
///
/// Order is significant: identification is first-match-wins.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    templates: Vec<BankTemplate>,
}

impl TemplateTable {
    /// Validate and compile an ordered list of specs.
    pub fn from_specs(specs: impl IntoIterator<Item = TemplateSpec>) -> Result<Self> {
        let mut templates = Vec::new();
        let mut seen = HashSet::new();

        for (position, spec) in specs.into_iter().enumerate() {
            if spec.bank_key.trim().is_empty() {
                return Err(TemplateError::EmptyKey(position));
            }
            let template = BankTemplate::compile(&spec)?;
            if !seen.insert(template.bank_key.clone()) {
                return Err(TemplateError::DuplicateKey(template.bank_key));
            }
            templates.push(template);
        }

        if templates.is_empty() {
            return Err(TemplateError::EmptyTable);
        }

        debug!("Compiled template table with {} banks", templates.len());

        Ok(Self { templates })
    }

    /// Parse a JSON list of template specs.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let specs: Vec<TemplateSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// Load a JSON template table from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The built-in table of supported banks.
    pub fn builtin() -> &'static TemplateTable {
        &BUILTIN_TABLE
    }

    pub fn get(&self, bank_key: &str) -> Option<&BankTemplate> {
        self.templates.iter().find(|t| t.bank_key == bank_key)
    }

    /// Templates in identification order.
    pub fn iter(&self) -> impl Iterator<Item = &BankTemplate> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
