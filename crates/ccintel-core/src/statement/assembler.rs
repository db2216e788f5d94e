//! Merges stage outputs into the final statement result.

use crate::models::statement::{
    ExtractionField, ExtractionMethod, FallbackStatus, FieldMap, FieldName, FieldSource,
    FieldValue, StatementResult, StatementStatus,
};
use crate::templates::BankTemplate;

/// Build the result for an identified statement.
///
/// Pattern values take precedence over fallback values. The method is
/// `RegEx+AI` only when a fallback value made it into the result.
pub fn assemble(
    template: &BankTemplate,
    pattern_fields: &FieldMap,
    fallback_fields: &FieldMap,
    fallback_status: FallbackStatus,
    raw_text: &str,
) -> StatementResult {
    let fields: Vec<ExtractionField> = FieldName::ALL
        .into_iter()
        .map(|name| merge_field(name, pattern_fields, fallback_fields))
        .collect();

    let extraction_method = if fields.iter().any(|f| f.source == FieldSource::Fallback) {
        ExtractionMethod::RegexWithAi
    } else {
        ExtractionMethod::Regex
    };

    StatementResult {
        status: StatementStatus::Success,
        bank_key: Some(template.bank_key().to_string()),
        bank_name: Some(template.name().to_string()),
        extraction_method: Some(extraction_method),
        fallback_status,
        fields,
        raw_text: raw_text.to_string(),
        reason: None,
    }
}

fn merge_field(name: FieldName, pattern_fields: &FieldMap, fallback_fields: &FieldMap) -> ExtractionField {
    let (value, source) = match (pattern_fields.get(name), fallback_fields.get(name)) {
        (found @ FieldValue::Found(_), _) => (found.clone(), FieldSource::Pattern),
        (FieldValue::NotFound, found @ FieldValue::Found(_)) => (found.clone(), FieldSource::Fallback),
        (FieldValue::NotFound, FieldValue::NotFound) => (FieldValue::NotFound, FieldSource::None),
    };

    ExtractionField { name, value, source }
}
