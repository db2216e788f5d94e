//! Statement result data models.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel rendered for a field that could not be extracted.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// One of the fixed statement fields under extraction.
///
/// Declaration order is the canonical field order used everywhere a
/// deterministic iteration is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    /// Date the statement was generated.
    StatementDate,
    /// Date by which payment must be made.
    PaymentDueDate,
    /// Last four digits of the card number.
    #[serde(rename = "card_last_4_digits")]
    CardLast4Digits,
    /// Total amount due.
    TotalDue,
    /// Minimum amount due.
    MinPayment,
}

impl FieldName {
    /// All fields in canonical order.
    pub const ALL: [FieldName; 5] = [
        FieldName::StatementDate,
        FieldName::PaymentDueDate,
        FieldName::CardLast4Digits,
        FieldName::TotalDue,
        FieldName::MinPayment,
    ];

    /// Wire identifier of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldName::StatementDate => "statement_date",
            FieldName::PaymentDueDate => "payment_due_date",
            FieldName::CardLast4Digits => "card_last_4_digits",
            FieldName::TotalDue => "total_due",
            FieldName::MinPayment => "min_payment",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            FieldName::StatementDate => "Statement Date",
            FieldName::PaymentDueDate => "Payment Due Date",
            FieldName::CardLast4Digits => "Card Last 4 Digits",
            FieldName::TotalDue => "Total Amount Due",
            FieldName::MinPayment => "Minimum Amount Due",
        }
    }

    /// Whether the field holds a monetary amount.
    pub fn is_amount(self) -> bool {
        matches!(self, FieldName::TotalDue | FieldName::MinPayment)
    }

    /// Whether the field holds a date.
    pub fn is_date(self) -> bool {
        matches!(self, FieldName::StatementDate | FieldName::PaymentDueDate)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldName::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| format!("unknown statement field: {}", s))
    }
}

/// Value of an extracted field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// The field was found with this (normalized) value.
    Found(String),
    /// The field could not be extracted.
    #[default]
    NotFound,
}

impl FieldValue {
    /// Build a value from raw text, mapping blank and sentinel text to `NotFound`.
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case(NOT_FOUND)
            || trimmed.eq_ignore_ascii_case("null")
        {
            FieldValue::NotFound
        } else {
            FieldValue::Found(trimmed.to_string())
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, FieldValue::Found(_))
    }

    /// The found value, if any.
    pub fn as_found(&self) -> Option<&str> {
        match self {
            FieldValue::Found(v) => Some(v),
            FieldValue::NotFound => None,
        }
    }

    /// Value as rendered for callers, with the `NOT_FOUND` sentinel.
    pub fn as_str(&self) -> &str {
        self.as_found().unwrap_or(NOT_FOUND)
    }

    /// Parse the value as a decimal amount.
    pub fn as_amount(&self) -> Option<Decimal> {
        self.as_found().and_then(|v| Decimal::from_str(v).ok())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldValue::from_raw(&raw))
    }
}

/// Pipeline stage that produced a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Bank template pattern match.
    Pattern,
    /// Language-model fallback.
    Fallback,
    /// Neither stage found the field.
    None,
}

/// Mapping from every statement field to its value.
///
/// Always holds all five fields, iterated in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<FieldName, FieldValue>,
}

impl FieldMap {
    /// A map with every field `NotFound`.
    pub fn not_found() -> Self {
        Self {
            values: FieldName::ALL
                .into_iter()
                .map(|f| (f, FieldValue::NotFound))
                .collect(),
        }
    }

    pub fn get(&self, field: FieldName) -> &FieldValue {
        // Every key is inserted at construction.
        self.values.get(&field).unwrap_or(&FieldValue::NotFound)
    }

    pub fn set(&mut self, field: FieldName, value: FieldValue) {
        self.values.insert(field, value);
    }

    /// Fields that are still `NotFound`, in canonical order.
    pub fn missing(&self) -> Vec<FieldName> {
        self.iter()
            .filter(|(_, v)| !v.is_found())
            .map(|(f, _)| f)
            .collect()
    }

    pub fn found_count(&self) -> usize {
        self.values.values().filter(|v| v.is_found()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }
}

impl Default for FieldMap {
    fn default() -> Self {
        Self::not_found()
    }
}

/// One named value in a statement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionField {
    pub name: FieldName,
    pub value: FieldValue,
    pub source: FieldSource,
}

impl ExtractionField {
    /// Parse a date field value using the layouts seen on supported statements.
    pub fn as_date(&self) -> Option<NaiveDate> {
        const FORMATS: [&str; 8] = [
            "%d/%m/%Y",
            "%d-%m-%Y",
            "%d-%b-%Y",
            "%d %b %Y",
            "%d %B %Y",
            "%B %d, %Y",
            "%b %d, %Y",
            "%Y-%m-%d",
        ];

        if !self.name.is_date() {
            return None;
        }
        let value = self.value.as_found()?;
        FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    }
}

/// Overall outcome of a statement parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementStatus {
    Success,
    Failure,
}

impl fmt::Display for StatementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementStatus::Success => "SUCCESS",
            StatementStatus::Failure => "FAILURE",
        })
    }
}

/// Which stages contributed to the final fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    /// Template patterns only.
    #[serde(rename = "RegEx")]
    Regex,
    /// At least one field came from the language-model fallback.
    #[serde(rename = "RegEx+AI")]
    RegexWithAi,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExtractionMethod::Regex => "RegEx",
            ExtractionMethod::RegexWithAi => "RegEx+AI",
        })
    }
}

/// Outcome of the fallback stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackStatus {
    /// The capability answered with a structured response.
    Success,
    /// A capability exists but nothing was missing.
    Skipped,
    /// The call failed, timed out or returned garbage.
    Failed,
    /// No capability is configured.
    NotAvailable,
}

impl fmt::Display for FallbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackStatus::Success => "SUCCESS",
            FallbackStatus::Skipped => "SKIPPED",
            FallbackStatus::Failed => "FAILED",
            FallbackStatus::NotAvailable => "NOT_AVAILABLE",
        })
    }
}

/// Why a statement could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureReason {
    /// The text was empty or whitespace only.
    EmptyInput,
    /// No template identifier matched.
    BankNotRecognized,
    /// The document could not be read as text (corrupt, encrypted or scanned).
    UnreadableDocument,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::EmptyInput => "No readable text in statement (empty input)",
            FailureReason::BankNotRecognized => {
                "Bank not recognized: no supported issuer identifier found in statement text"
            }
            FailureReason::UnreadableDocument => {
                "No readable text in statement (document is corrupt, password-protected or scanned)"
            }
        })
    }
}

/// The unit returned per parsed statement.
///
/// `status` is `Success` whenever a bank was identified, even if every field
/// is `NOT_FOUND`. Inspect [`StatementResult::fields`] to judge completeness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResult {
    pub status: StatementStatus,

    /// Key of the identified template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_key: Option<String>,

    /// Canonical display name of the identified bank.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,

    pub fallback_status: FallbackStatus,

    /// The five fields in canonical order.
    pub fields: Vec<ExtractionField>,

    /// Input text, kept for diagnostics.
    pub raw_text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl StatementResult {
    /// Build a failure result. Every field is reported as `NOT_FOUND`.
    pub fn failure(
        reason: FailureReason,
        raw_text: impl Into<String>,
        fallback_status: FallbackStatus,
    ) -> Self {
        Self {
            status: StatementStatus::Failure,
            bank_key: None,
            bank_name: None,
            extraction_method: None,
            fallback_status,
            fields: FieldName::ALL
                .into_iter()
                .map(|name| ExtractionField {
                    name,
                    value: FieldValue::NotFound,
                    source: FieldSource::None,
                })
                .collect(),
            raw_text: raw_text.into(),
            reason: Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatementStatus::Success
    }

    pub fn field(&self, name: FieldName) -> Option<&ExtractionField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Value of a field, `NotFound` when absent.
    pub fn value(&self, name: FieldName) -> &FieldValue {
        self.field(name)
            .map(|f| &f.value)
            .unwrap_or(&FieldValue::NotFound)
    }

    /// Fields still `NOT_FOUND`.
    pub fn missing_fields(&self) -> Vec<FieldName> {
        self.fields
            .iter()
            .filter(|f| !f.value.is_found())
            .map(|f| f.name)
            .collect()
    }

    /// Flatten into the shape consumed by rendering code.
    pub fn flatten(&self) -> FlatStatementResult {
        FlatStatementResult {
            status: self.status,
            bank_name: self.bank_name.clone(),
            extraction_method: self.extraction_method,
            llm_status: self.fallback_status,
            statement_date: self.value(FieldName::StatementDate).clone(),
            payment_due_date: self.value(FieldName::PaymentDueDate).clone(),
            card_last_4_digits: self.value(FieldName::CardLast4Digits).clone(),
            total_due: self.value(FieldName::TotalDue).clone(),
            min_payment: self.value(FieldName::MinPayment).clone(),
            raw_text: self.raw_text.clone(),
            reason: self.reason.map(|r| r.to_string()),
        }
    }
}

/// Flattened statement result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatStatementResult {
    pub status: StatementStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<ExtractionMethod>,
    pub llm_status: FallbackStatus,
    pub statement_date: FieldValue,
    pub payment_due_date: FieldValue,
    pub card_last_4_digits: FieldValue,
    pub total_due: FieldValue,
    pub min_payment: FieldValue,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_name_parsing() {
        assert_eq!(FieldName::from_str("total_due"), Ok(FieldName::TotalDue));
        assert_eq!(
            FieldName::from_str("card_last_4_digits"),
            Ok(FieldName::CardLast4Digits)
        );
        assert!(FieldName::from_str("transactions").is_err());
    }

    #[test]
    fn test_field_name_serde_matches_wire_name() {
        for field in FieldName::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn test_field_value_from_raw() {
        assert_eq!(FieldValue::from_raw("  1234 "), FieldValue::Found("1234".to_string()));
        assert_eq!(FieldValue::from_raw(""), FieldValue::NotFound);
        assert_eq!(FieldValue::from_raw("not_found"), FieldValue::NotFound);
        assert_eq!(FieldValue::from_raw("null"), FieldValue::NotFound);
    }

    #[test]
    fn test_field_value_amount() {
        let value = FieldValue::Found("12345.67".to_string());
        assert_eq!(value.as_amount(), Some(Decimal::new(1234567, 2)));
        assert_eq!(FieldValue::NotFound.as_amount(), None);
    }

    #[test]
    fn test_extraction_field_dates() {
        let field = |v: &str| ExtractionField {
            name: FieldName::StatementDate,
            value: FieldValue::Found(v.to_string()),
            source: FieldSource::Pattern,
        };
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);

        assert_eq!(field("15/03/2024").as_date(), expected);
        assert_eq!(field("15-Mar-2024").as_date(), expected);
        assert_eq!(field("March 15, 2024").as_date(), expected);
        assert_eq!(field("15 Mar 2024").as_date(), expected);
        assert_eq!(field("sometime in March").as_date(), None);
    }

    #[test]
    fn test_field_map_missing_in_order() {
        let mut map = FieldMap::not_found();
        map.set(FieldName::PaymentDueDate, FieldValue::Found("04/04/2024".to_string()));

        assert_eq!(
            map.missing(),
            vec![
                FieldName::StatementDate,
                FieldName::CardLast4Digits,
                FieldName::TotalDue,
                FieldName::MinPayment,
            ]
        );
        assert_eq!(map.found_count(), 1);
    }

    #[test]
    fn test_failure_flatten() {
        let result = StatementResult::failure(
            FailureReason::BankNotRecognized,
            "some text",
            FallbackStatus::NotAvailable,
        );
        let json = serde_json::to_value(result.flatten()).unwrap();

        assert_eq!(json["status"], "FAILURE");
        assert_eq!(json["llm_status"], "NOT_AVAILABLE");
        assert_eq!(json["total_due"], NOT_FOUND);
        assert_eq!(json["raw_text"], "some text");
        assert!(json["reason"].as_str().unwrap().contains("Bank not recognized"));
        assert!(json.get("bank_name").is_none());
        assert!(json.get("extraction_method").is_none());
    }

    #[test]
    fn test_extraction_method_labels() {
        assert_eq!(serde_json::to_string(&ExtractionMethod::Regex).unwrap(), "\"RegEx\"");
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::RegexWithAi).unwrap(),
            "\"RegEx+AI\""
        );
        assert_eq!(ExtractionMethod::RegexWithAi.to_string(), "RegEx+AI");
    }
}
