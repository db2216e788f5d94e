//! Core library for credit-card statement parsing.
//!
//! This crate provides:
//! - A validated, ordered table of bank templates
//! - Bank identification and template-driven field extraction
//! - A language-model fallback for fields the templates miss
//! - PDF text extraction for statement files

pub mod error;
pub mod fallback;
pub mod models;
pub mod pdf;
pub mod statement;
pub mod templates;

pub use error::{CcintelError, FallbackError, PdfError, Result, TemplateError};
pub use fallback::{
    FallbackCapability, FallbackExtractor, FallbackRequest, FallbackResponse, GeminiClient,
};
pub use models::config::CcintelConfig;
pub use models::statement::{
    ExtractionField, ExtractionMethod, FailureReason, FallbackStatus, FieldMap, FieldName,
    FieldSource, FieldValue, FlatStatementResult, StatementResult, StatementStatus, NOT_FOUND,
};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use statement::{parse_statement, BankIdentifier, PatternFieldExtractor, StatementParser};
pub use templates::{BankTemplate, TemplateSpec, TemplateTable};
