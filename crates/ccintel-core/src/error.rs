//! Error types for the ccintel-core library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for the ccintel library.
///
/// Note that statement parsing itself never fails with this type: missing
/// fields and fallback problems are reported inside
/// [`StatementResult`](crate::StatementResult). These errors cover loading
/// templates, reading PDFs and talking to the fallback service.
#[derive(Error, Debug)]
pub enum CcintelError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Template table error.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Fallback capability error.
    #[error("fallback error: {0}")]
    Fallback(#[from] FallbackError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised while validating a template table.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The table contains no templates.
    #[error("template table is empty")]
    EmptyTable,

    /// A template has an empty bank key.
    #[error("template at position {0} has an empty bank_key")]
    EmptyKey(usize),

    /// Two templates share a bank key.
    #[error("duplicate bank_key: {0}")]
    DuplicateKey(String),

    /// A template has no display name.
    #[error("template {0} has no display_name")]
    MissingDisplayName(String),

    /// A template has no identifier patterns.
    #[error("template {0} has no identifier_patterns")]
    MissingIdentifiers(String),

    /// A field key is not one of the supported statement fields.
    #[error("template {bank_key} declares unknown field: {field}")]
    UnknownField { bank_key: String, field: String },

    /// A declared field has an empty pattern list.
    #[error("template {bank_key} declares field {field} with no patterns")]
    EmptyFieldPatterns { bank_key: String, field: String },

    /// A pattern failed to compile.
    #[error("template {bank_key} has invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        bank_key: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The template file could not be decoded.
    #[error("failed to decode template table: {0}")]
    Decode(#[from] serde_json::Error),

    /// The template file could not be read.
    #[error("failed to read template table: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a fallback capability call.
///
/// Every variant collapses to `FallbackStatus::Failed` in the pipeline.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// Transport-level failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service refused to answer (blocked prompt, no candidates).
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The response could not be interpreted as a field mapping.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call exceeded its time budget.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The capability could not be constructed.
    #[error("invalid fallback configuration: {0}")]
    Config(String),
}

/// Result type for the ccintel library.
pub type Result<T> = std::result::Result<T, CcintelError>;
