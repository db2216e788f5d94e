//! Statement parsing pipeline.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::assembler::assemble;
use super::extractor::PatternFieldExtractor;
use super::identifier::BankIdentifier;
use crate::fallback::{usable_credential, FallbackCapability, FallbackExtractor, GeminiClient};
use crate::models::statement::{FailureReason, StatementResult};
use crate::templates::TemplateTable;

/// Identification, pattern extraction, fallback and assembly for one
/// statement at a time.
///
/// The parser holds no per-request state; one instance can serve
/// concurrent parses.
#[derive(Clone)]
pub struct StatementParser<'t> {
    table: &'t TemplateTable,
    extractor: PatternFieldExtractor,
    fallback: FallbackExtractor,
}

impl<'t> StatementParser<'t> {
    /// Create a parser over a template table, without fallback.
    pub fn new(table: &'t TemplateTable) -> Self {
        Self {
            table,
            extractor: PatternFieldExtractor::new(),
            fallback: FallbackExtractor::new(),
        }
    }

    /// Use a fallback capability for missing fields.
    pub fn with_fallback(mut self, capability: Arc<dyn FallbackCapability>) -> Self {
        self.fallback = self.fallback.with_capability(capability);
        self
    }

    /// Bound the fallback call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.fallback = self.fallback.with_timeout(timeout);
        self
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_available()
    }

    pub fn table(&self) -> &'t TemplateTable {
        self.table
    }

    /// Parse one statement's text.
    ///
    /// Never fails: problems are reported through the result's status,
    /// reason and fallback status.
    pub async fn parse(&self, text: &str) -> StatementResult {
        let start = Instant::now();

        info!("Parsing statement from {} characters of text", text.chars().count());

        if text.trim().is_empty() {
            info!("Statement text is empty");
            return StatementResult::failure(
                FailureReason::EmptyInput,
                text,
                self.fallback.idle_status(),
            );
        }

        let Some(template) = BankIdentifier::new(self.table).identify(text) else {
            info!("Bank not recognized");
            return StatementResult::failure(
                FailureReason::BankNotRecognized,
                text,
                self.fallback.idle_status(),
            );
        };

        let pattern_fields = self.extractor.extract_fields(text, template);
        let missing = pattern_fields.missing();
        debug!(
            "{}: {} fields matched by pattern, {} missing",
            template.bank_key(),
            pattern_fields.found_count(),
            missing.len()
        );

        let fallback = self.fallback.extract_missing(text, &missing).await;
        let result = assemble(template, &pattern_fields, &fallback.fields, fallback.status, text);

        info!(
            "Parsed {} statement in {:?}: method={}, llm_status={}, missing={}",
            template.name(),
            start.elapsed(),
            result
                .extraction_method
                .map(|m| m.to_string())
                .unwrap_or_default(),
            result.fallback_status,
            result.missing_fields().len()
        );

        result
    }

    /// Failure result for a document whose text could not be read.
    ///
    /// Front-ends call this instead of [`parse`](Self::parse) when text
    /// extraction fails, so the caller still gets a result.
    pub fn unreadable(&self, raw_text: &str) -> StatementResult {
        info!("Statement document is unreadable");
        StatementResult::failure(
            FailureReason::UnreadableDocument,
            raw_text,
            self.fallback.idle_status(),
        )
    }
}

impl StatementParser<'static> {
    /// Parser over the built-in template table.
    pub fn builtin() -> Self {
        Self::new(TemplateTable::builtin())
    }
}

/// Parse statement text with the built-in templates.
///
/// A usable `fallback_credential` enables the Gemini fallback with default
/// settings; blank or placeholder values are treated as absent.
pub async fn parse_statement(text: &str, fallback_credential: Option<&str>) -> StatementResult {
    let mut parser = StatementParser::builtin();
    if let Some(key) = usable_credential(fallback_credential) {
        match GeminiClient::new(key) {
            Ok(client) => parser = parser.with_fallback(Arc::new(client)),
            Err(e) => warn!("Fallback disabled: {}", e),
        }
    }
    parser.parse(text).await
}
