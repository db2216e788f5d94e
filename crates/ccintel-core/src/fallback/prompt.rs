//! Prompt construction for the fallback model.

use crate::models::statement::{FieldName, NOT_FOUND};

fn describe(field: FieldName) -> &'static str {
    match field {
        FieldName::StatementDate => "the date the statement was generated, exactly as printed",
        FieldName::PaymentDueDate => "the date by which payment must be made, exactly as printed",
        FieldName::CardLast4Digits => "the last four digits of the card number, digits only",
        FieldName::TotalDue => "the total amount due, as a plain number without currency symbols",
        FieldName::MinPayment => "the minimum amount due, as a plain number without currency symbols",
    }
}

/// Build the extraction prompt for the requested fields.
///
/// Statement text longer than `max_chars` characters is cut off.
pub fn build_prompt(text: &str, fields: &[FieldName], max_chars: usize) -> String {
    let mut prompt = String::from(
        "You are reading the text of a credit card statement. \
         Extract the following fields and answer with a single JSON object \
         whose keys are exactly the field names below.\n\n",
    );

    for field in fields {
        prompt.push_str(&format!("- {}: {}\n", field.as_str(), describe(*field)));
    }

    prompt.push_str(&format!(
        "\nIf a field is not present in the text, use the value \"{}\". \
         Do not add any other keys or commentary.\n\nStatement text:\n",
        NOT_FOUND
    ));

    if text.chars().count() > max_chars {
        prompt.extend(text.chars().take(max_chars));
    } else {
        prompt.push_str(text);
    }

    prompt
}

/// Remove a Markdown code fence around a model answer.
pub fn strip_code_fences(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
