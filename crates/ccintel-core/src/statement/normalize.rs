//! Value normalization for extracted fields.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::statement::{FieldName, FieldValue};

lazy_static! {
    // Currency markers seen on statements: ₹ 1,234.00 / Rs. 1,234.00 / INR 1,234.00
    static ref CURRENCY: Regex = Regex::new(r"(?i)₹|\bRs\.?|\bINR|\bUSD|US\$|\$|€|£").unwrap();
}

/// Normalize a raw capture for the given field.
///
/// Amounts lose currency markers and thousands separators; everything else
/// is only trimmed.
pub fn normalize(field: FieldName, raw: &str) -> FieldValue {
    if field.is_amount() {
        FieldValue::from_raw(&normalize_amount(raw))
    } else {
        FieldValue::from_raw(raw)
    }
}

/// Strip currency markers, separators and whitespace from an amount.
pub fn normalize_amount(raw: &str) -> String {
    CURRENCY
        .replace_all(raw, "")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect()
}
