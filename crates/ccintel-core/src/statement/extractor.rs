//! Template-driven field extraction.

use regex::Regex;
use tracing::{debug, trace};

use super::normalize::normalize;
use crate::models::statement::{FieldMap, FieldName, FieldValue};
use crate::templates::BankTemplate;

/// Applies a bank template's field patterns to statement text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternFieldExtractor;

impl PatternFieldExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract every field the template defines. Undefined or unmatched
    /// fields are `NotFound`.
    pub fn extract_fields(&self, text: &str, template: &BankTemplate) -> FieldMap {
        let mut fields = FieldMap::not_found();

        for field in FieldName::ALL {
            let value = self.extract_field(text, template, field);
            if value.is_found() {
                debug!("{}: {} matched by pattern", template.bank_key(), field);
            }
            fields.set(field, value);
        }

        fields
    }

    /// First non-empty normalized capture across the field's patterns.
    pub fn extract_field(&self, text: &str, template: &BankTemplate, field: FieldName) -> FieldValue {
        template
            .field_patterns(field)
            .iter()
            .find_map(|pattern| first_capture(pattern, text, field))
            .unwrap_or(FieldValue::NotFound)
    }
}

fn first_capture(pattern: &Regex, text: &str, field: FieldName) -> Option<FieldValue> {
    // Patterns without a group yield the whole match.
    let group = if pattern.captures_len() > 1 { 1 } else { 0 };

    pattern.captures_iter(text).find_map(|caps| {
        let raw = caps.get(group)?.as_str();
        let value = normalize(field, raw);
        trace!("{} pattern {:?} captured {:?}", field, pattern.as_str(), raw);
        value.is_found().then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::{TemplateSpec, TemplateTable};
    use pretty_assertions::assert_eq;

    fn found(v: &str) -> FieldValue {
        FieldValue::Found(v.to_string())
    }

    fn extract_builtin(bank_key: &str, text: &str) -> FieldMap {
        let template = TemplateTable::builtin().get(bank_key).unwrap();
        PatternFieldExtractor::new().extract_fields(text, template)
    }

    #[test]
    fn test_extract_hdfc_statement() {
        let text = r#"
            HDFC Bank Credit Card Statement
            Statement Date : 15/03/2024
            Payment Due Date : 04/04/2024
            Card No: 4375 XXXX XXXX 1234
            Total Dues : ₹ 12,345.67
            Minimum Amount Due : ₹ 620.00
        "#;

        let fields = extract_builtin("hdfc", text);

        assert_eq!(fields.get(FieldName::StatementDate), &found("15/03/2024"));
        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("04/04/2024"));
        assert_eq!(fields.get(FieldName::CardLast4Digits), &found("1234"));
        assert_eq!(fields.get(FieldName::TotalDue), &found("12345.67"));
        assert_eq!(fields.get(FieldName::MinPayment), &found("620.00"));
    }

    #[test]
    fn test_extract_icici_statement() {
        let text = r#"
            ICICI Bank Credit Card
            Statement Date March 15, 2024
            Payment Due Date April 2, 2024
            Card Number 4315XXXXXXXX5678
            Total Amount due ₹34,500.00
            Minimum Amount due ₹1,725.00
        "#;

        let fields = extract_builtin("icici", text);

        assert_eq!(fields.get(FieldName::StatementDate), &found("March 15, 2024"));
        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("April 2, 2024"));
        assert_eq!(fields.get(FieldName::CardLast4Digits), &found("5678"));
        assert_eq!(fields.get(FieldName::TotalDue), &found("34500.00"));
        assert_eq!(fields.get(FieldName::MinPayment), &found("1725.00"));
    }

    #[test]
    fn test_extract_sbi_statement() {
        let text = r#"
            SBI Card Monthly Statement
            Statement Date: 10 Mar 2024
            Payment Due Date: 30 Mar 2024
            Credit Card Number XXXX XXXX XXXX 9012
            Total Amount Due (₹) 8,250.00
            Minimum Amount Due (₹) 412.50
        "#;

        let fields = extract_builtin("sbi", text);

        assert_eq!(fields.get(FieldName::StatementDate), &found("10 Mar 2024"));
        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("30 Mar 2024"));
        assert_eq!(fields.get(FieldName::CardLast4Digits), &found("9012"));
        assert_eq!(fields.get(FieldName::TotalDue), &found("8250.00"));
        assert_eq!(fields.get(FieldName::MinPayment), &found("412.50"));
    }

    #[test]
    fn test_extract_axis_statement() {
        let text = r#"
            Axis Bank
            Statement Generation Date 12/03/2024
            Payment Due Date 01/04/2024
            Card No. 5123 45** **** 3456
            Total Payment Due 15,670.25 Dr
            Minimum Payment Due 783.50 Dr
        "#;

        let fields = extract_builtin("axis", text);

        assert_eq!(fields.get(FieldName::StatementDate), &found("12/03/2024"));
        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("01/04/2024"));
        assert_eq!(fields.get(FieldName::CardLast4Digits), &found("3456"));
        assert_eq!(fields.get(FieldName::TotalDue), &found("15670.25"));
        assert_eq!(fields.get(FieldName::MinPayment), &found("783.50"));
    }

    #[test]
    fn test_extract_kotak_statement() {
        let text = r#"
            Kotak Mahindra Bank Credit Card Statement
            Statement Date 18-Mar-2024
            Remember to Pay By 07-Apr-2024
            Primary Card Number 4147XXXXXXXX7890
            Total Amount Due Rs. 22,110.00
            Minimum Amount Due Rs. 1,105.50
        "#;

        let fields = extract_builtin("kotak", text);

        assert_eq!(fields.get(FieldName::StatementDate), &found("18-Mar-2024"));
        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("07-Apr-2024"));
        assert_eq!(fields.get(FieldName::CardLast4Digits), &found("7890"));
        assert_eq!(fields.get(FieldName::TotalDue), &found("22110.00"));
        assert_eq!(fields.get(FieldName::MinPayment), &found("1105.50"));
    }

    #[test]
    fn test_missing_field_is_independent() {
        let text = "HDFC Bank\nPayment Due Date : 04/04/2024\n";
        let fields = extract_builtin("hdfc", text);

        assert_eq!(fields.get(FieldName::PaymentDueDate), &found("04/04/2024"));
        assert_eq!(fields.get(FieldName::TotalDue), &FieldValue::NotFound);
        assert_eq!(fields.get(FieldName::StatementDate), &FieldValue::NotFound);
    }

    #[test]
    fn test_pattern_order_within_field() {
        let table = TemplateTable::from_specs([TemplateSpec::new("acme", ["Acme"])
            .with_identifiers(["Acme"])
            .with_field(
                FieldName::StatementDate,
                [r"Statement\s+Date\s+(\d{4}-\d{2}-\d{2})", r"Date\s+(\S+)"],
            )])
        .unwrap();
        let template = table.get("acme").unwrap();
        let extractor = PatternFieldExtractor::new();

        let precise = extractor.extract_field(
            "Date 01/02/2024 Statement Date 2024-03-15",
            template,
            FieldName::StatementDate,
        );
        assert_eq!(precise, found("2024-03-15"));

        let loose = extractor.extract_field("Date 01/02/2024", template, FieldName::StatementDate);
        assert_eq!(loose, found("01/02/2024"));
    }

    #[test]
    fn test_pattern_without_group_uses_whole_match() {
        let table = TemplateTable::from_specs([TemplateSpec::new("acme", ["Acme"])
            .with_identifiers(["Acme"])
            .with_field(FieldName::CardLast4Digits, [r"\b\d{4}\b"])])
        .unwrap();
        let template = table.get("acme").unwrap();

        let value = PatternFieldExtractor::new().extract_field(
            "card ending 4321",
            template,
            FieldName::CardLast4Digits,
        );
        assert_eq!(value, found("4321"));
    }

    #[test]
    fn test_empty_capture_falls_through() {
        let table = TemplateTable::from_specs([TemplateSpec::new("acme", ["Acme"])
            .with_identifiers(["Acme"])
            .with_field(
                FieldName::TotalDue,
                [r"Total\s+Due\s*:\s*(₹?)", r"Amount\s+Payable\s*:\s*([\d,.]+)"],
            )])
        .unwrap();
        let template = table.get("acme").unwrap();

        let value = PatternFieldExtractor::new().extract_field(
            "Total Due: ₹\nAmount Payable: 9,999.00",
            template,
            FieldName::TotalDue,
        );
        assert_eq!(value, found("9999.00"));
    }

    #[test]
    fn test_undefined_field_is_not_found() {
        let table = TemplateTable::from_specs([TemplateSpec::new("acme", ["Acme"])
            .with_identifiers(["Acme"])])
        .unwrap();
        let template = table.get("acme").unwrap();

        let fields = PatternFieldExtractor::new().extract_fields("Acme Total Due 10.00", template);
        assert_eq!(fields.found_count(), 0);
    }
}
