//! Built-in templates for supported issuers.
//!
//! More specific identifiers must be registered before generic ones.

use super::TemplateSpec;
use crate::models::statement::FieldName;

/// Specs for the built-in table, in identification order.
pub fn builtin_specs() -> Vec<TemplateSpec> {
    vec![hdfc(), icici(), sbi(), axis(), kotak()]
}

fn hdfc() -> TemplateSpec {
    TemplateSpec::new("hdfc", ["HDFC Bank", "HDFC Bank Credit Card"])
        .with_identifiers([r"HDFC\s+Bank", r"hdfcbank\.com"])
        .with_field(
            FieldName::StatementDate,
            [
                r"Statement\s+Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
                r"Statement\s+Date\s*:?\s*(\d{1,2}\s+[a-z]{3,9},?\s+\d{4})",
            ],
        )
        .with_field(
            FieldName::PaymentDueDate,
            [
                r"Payment\s+Due\s+Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
                r"Payment\s+Due\s+Date\s*:?\s*(\d{1,2}\s+[a-z]{3,9},?\s+\d{4})",
            ],
        )
        .with_field(
            FieldName::CardLast4Digits,
            [
                r"Card\s+No\.?\s*:?\s*\d{4}\s*X{4}\s*X{4}\s*(\d{4})",
                r"Card\s+No\.?\s*:?\s*[\dX*]{4}\s*[\dX*]{2}[X*]{2}\s*[X*]{4}\s*(\d{4})",
            ],
        )
        .with_field(
            FieldName::TotalDue,
            [r"Total\s+Dues\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
        .with_field(
            FieldName::MinPayment,
            [r"Minimum\s+Amount\s+Due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
}

fn icici() -> TemplateSpec {
    TemplateSpec::new("icici", ["ICICI Bank"])
        .with_identifiers([r"ICICI\s+Bank", r"icicibank\.com"])
        .with_field(
            FieldName::StatementDate,
            [
                r"Statement\s+Date\s*:?\s*([a-z]+\s+\d{1,2},\s*\d{4})",
                r"Statement\s+Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            ],
        )
        .with_field(
            FieldName::PaymentDueDate,
            [
                r"Payment\s+Due\s+Date\s*:?\s*([a-z]+\s+\d{1,2},\s*\d{4})",
                r"Payment\s+Due\s+Date\s*:?\s*(\d{2}/\d{2}/\d{4})",
            ],
        )
        .with_field(
            FieldName::CardLast4Digits,
            [r"Card\s+Number\s*:?\s*\d{4}\s*X{4}\s*X{4}\s*(\d{4})"],
        )
        .with_field(
            FieldName::TotalDue,
            [r"Total\s+Amount\s+due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
        .with_field(
            FieldName::MinPayment,
            [r"Minimum\s+Amount\s+due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
}

fn sbi() -> TemplateSpec {
    TemplateSpec::new("sbi", ["SBI Card", "SBI Cards and Payment Services"])
        .with_identifiers([r"SBI\s+Cards?\b", r"sbicard\.com"])
        .with_field(
            FieldName::StatementDate,
            [r"Statement\s+Date\s*:?\s*(\d{1,2}\s+[a-z]{3}\s+\d{4})"],
        )
        .with_field(
            FieldName::PaymentDueDate,
            [r"Payment\s+Due\s+Date\s*:?\s*(\d{1,2}\s+[a-z]{3}\s+\d{4})"],
        )
        .with_field(
            FieldName::CardLast4Digits,
            [r"Card\s+Number\s*:?\s*X{4}\s*X{4}\s*X{4}\s*(\d{4})"],
        )
        .with_field(
            FieldName::TotalDue,
            [r"Total\s+Amount\s+Due\s*(?:\((?:₹|Rs\.?|INR)\))?\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
        .with_field(
            FieldName::MinPayment,
            [r"Minimum\s+Amount\s+Due\s*(?:\((?:₹|Rs\.?|INR)\))?\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
}

fn axis() -> TemplateSpec {
    TemplateSpec::new("axis", ["Axis Bank"])
        .with_identifiers([r"Axis\s+Bank", r"axisbank\.com"])
        .with_field(
            FieldName::StatementDate,
            [r"Statement\s+(?:Generation\s+)?Date\s*:?\s*(\d{2}/\d{2}/\d{4})"],
        )
        .with_field(
            FieldName::PaymentDueDate,
            [r"Payment\s+Due\s+Date\s*:?\s*(\d{2}/\d{2}/\d{4})"],
        )
        .with_field(
            FieldName::CardLast4Digits,
            [r"Card\s+No\.?\s*:?\s*\d{4}\s*\d{2}\*{2}\s*\*{4}\s*(\d{4})"],
        )
        .with_field(
            FieldName::TotalDue,
            [r"Total\s+Payment\s+Due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
        .with_field(
            FieldName::MinPayment,
            [r"Minimum\s+Payment\s+Due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
}

fn kotak() -> TemplateSpec {
    TemplateSpec::new("kotak", ["Kotak Mahindra Bank", "Kotak Bank"])
        .with_identifiers([r"Kotak\s+Mahindra\s+Bank", r"Kotak\s+Bank", r"kotak\.com"])
        .with_field(
            FieldName::StatementDate,
            [r"Statement\s+Date\s*:?\s*(\d{2}-[a-z]{3}-\d{4})"],
        )
        .with_field(
            FieldName::PaymentDueDate,
            [r"(?:Remember\s+to\s+Pay\s+By|Payment\s+Due\s+Date)\s*:?\s*(\d{2}-[a-z]{3}-\d{4})"],
        )
        .with_field(
            FieldName::CardLast4Digits,
            [r"Card\s+Number\s*:?\s*\d{4}X{8}(\d{4})"],
        )
        .with_field(
            FieldName::TotalDue,
            [r"Total\s+Amount\s+Due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
        .with_field(
            FieldName::MinPayment,
            [r"Minimum\s+Amount\s+Due\s*:?\s*((?:₹|Rs\.?|INR)?\s*[\d,]+(?:\.\d{2})?)"],
        )
}
