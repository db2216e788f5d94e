//! Language-model fallback for fields the templates missed.
//!
//! The capability is an opaque service behind [`FallbackCapability`]:
//! given the statement text and the missing field names it returns its best
//! guesses. [`FallbackExtractor`] bounds the call with a timeout and folds
//! every failure into [`FallbackStatus::Failed`].

mod gemini;
mod prompt;

pub use gemini::GeminiClient;
pub use prompt::{build_prompt, strip_code_fences};

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::FallbackError;
use crate::models::statement::{FallbackStatus, FieldMap, FieldName};
use crate::statement::normalize::normalize;

/// Placeholder shipped in sample environment files.
pub const PLACEHOLDER_API_KEY: &str = "YOUR_GEMINI_API_KEY";

/// Default upper bound for one capability call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Return the credential if it is usable, treating blank and placeholder
/// values as absent.
pub fn usable_credential(credential: Option<&str>) -> Option<&str> {
    credential
        .map(str::trim)
        .filter(|c| !c.is_empty() && *c != PLACEHOLDER_API_KEY)
}

/// A request for the missing fields of one statement.
#[derive(Debug, Clone, Copy)]
pub struct FallbackRequest<'a> {
    pub text: &'a str,
    pub missing_fields: &'a [FieldName],
}

/// Raw values returned by a capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackResponse {
    pub values: BTreeMap<FieldName, String>,
}

impl FallbackResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, field: FieldName, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Interpret a JSON object keyed by field name.
    ///
    /// Unknown keys and null values are skipped; numbers are kept as text.
    pub fn from_json(value: &Value) -> Result<Self, FallbackError> {
        let object = value.as_object().ok_or_else(|| {
            FallbackError::MalformedResponse(format!("expected a JSON object, got {}", value))
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let Ok(field) = FieldName::from_str(key) else {
                debug!("Ignoring unknown fallback key: {}", key);
                continue;
            };
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Null => continue,
                other => {
                    return Err(FallbackError::MalformedResponse(format!(
                        "unexpected value for {}: {}",
                        field, other
                    )));
                }
            };
            values.insert(field, text);
        }

        Ok(Self { values })
    }
}

/// External text-understanding service used for missing fields.
#[async_trait]
pub trait FallbackCapability: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Best-effort values for the requested fields.
    async fn attempt(&self, request: &FallbackRequest<'_>) -> Result<FallbackResponse, FallbackError>;
}

/// Outcome of the fallback stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOutcome {
    /// Values for the requested fields; everything else is `NotFound`.
    pub fields: FieldMap,
    pub status: FallbackStatus,
}

impl FallbackOutcome {
    fn empty(status: FallbackStatus) -> Self {
        Self {
            fields: FieldMap::not_found(),
            status,
        }
    }
}

/// Runs the capability for missing fields, at most once per statement.
#[derive(Clone)]
pub struct FallbackExtractor {
    capability: Option<Arc<dyn FallbackCapability>>,
    timeout: Duration,
}

impl FallbackExtractor {
    /// An extractor with no capability configured.
    pub fn new() -> Self {
        Self {
            capability: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_capability(mut self, capability: Arc<dyn FallbackCapability>) -> Self {
        self.capability = Some(capability);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_available(&self) -> bool {
        self.capability.is_some()
    }

    /// Status reported when the stage is not reached.
    pub fn idle_status(&self) -> FallbackStatus {
        if self.is_available() {
            FallbackStatus::Skipped
        } else {
            FallbackStatus::NotAvailable
        }
    }

    /// Ask the capability for the missing fields.
    pub async fn extract_missing(&self, text: &str, missing: &[FieldName]) -> FallbackOutcome {
        let Some(capability) = &self.capability else {
            debug!("No fallback capability configured");
            return FallbackOutcome::empty(FallbackStatus::NotAvailable);
        };
        if missing.is_empty() {
            debug!("All fields matched, fallback skipped");
            return FallbackOutcome::empty(FallbackStatus::Skipped);
        }

        info!(
            "Requesting {} missing fields from {}",
            missing.len(),
            capability.name()
        );

        let request = FallbackRequest {
            text,
            missing_fields: missing,
        };
        let response = match tokio::time::timeout(self.timeout, capability.attempt(&request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Fallback {} failed: {}", capability.name(), e);
                return FallbackOutcome::empty(FallbackStatus::Failed);
            }
            Err(_) => {
                warn!(
                    "Fallback {} failed: {}",
                    capability.name(),
                    FallbackError::Timeout(self.timeout)
                );
                return FallbackOutcome::empty(FallbackStatus::Failed);
            }
        };

        let mut fields = FieldMap::not_found();
        for field in missing {
            if let Some(raw) = response.values.get(field) {
                fields.set(*field, normalize(*field, raw));
            }
        }

        debug!(
            "Fallback recovered {} of {} fields",
            fields.found_count(),
            missing.len()
        );

        FallbackOutcome {
            fields,
            status: FallbackStatus::Success,
        }
    }
}

impl Default for FallbackExtractor {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubCapability;
    use super::*;
    use crate::models::statement::FieldValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_usable_credential() {
        assert_eq!(usable_credential(Some("abc123")), Some("abc123"));
        assert_eq!(usable_credential(Some("  abc123 ")), Some("abc123"));
        assert_eq!(usable_credential(Some("")), None);
        assert_eq!(usable_credential(Some("   ")), None);
        assert_eq!(usable_credential(Some(PLACEHOLDER_API_KEY)), None);
        assert_eq!(usable_credential(None), None);
    }

    #[test]
    fn test_response_from_json() {
        let value = json!({
            "total_due": "₹ 5,000.00",
            "min_payment": 250,
            "statement_date": null,
            "reward_points": "1200"
        });

        let response = FallbackResponse::from_json(&value).unwrap();

        assert_eq!(
            response,
            FallbackResponse::new()
                .with_value(FieldName::TotalDue, "₹ 5,000.00")
                .with_value(FieldName::MinPayment, "250")
        );
    }

    #[test]
    fn test_response_from_json_rejects_non_object() {
        let err = FallbackResponse::from_json(&json!(["total_due"])).unwrap_err();
        assert!(matches!(err, FallbackError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_not_available_without_capability() {
        let extractor = FallbackExtractor::new();
        let outcome = extractor.extract_missing("text", &[FieldName::TotalDue]).await;

        assert_eq!(outcome.status, FallbackStatus::NotAvailable);
        assert_eq!(outcome.fields.found_count(), 0);
    }

    #[tokio::test]
    async fn test_skipped_when_nothing_missing() {
        let stub = Arc::new(StubCapability::answering(FallbackResponse::new()));
        let extractor = FallbackExtractor::new().with_capability(stub.clone());

        let outcome = extractor.extract_missing("text", &[]).await;

        assert_eq!(outcome.status, FallbackStatus::Skipped);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_only_requested_fields_are_kept() {
        let stub = Arc::new(StubCapability::answering(
            FallbackResponse::new()
                .with_value(FieldName::TotalDue, "₹ 5,000.00")
                .with_value(FieldName::StatementDate, "01/03/2024"),
        ));
        let extractor = FallbackExtractor::new().with_capability(stub.clone());

        let outcome = extractor
            .extract_missing("text", &[FieldName::TotalDue, FieldName::MinPayment])
            .await;

        assert_eq!(outcome.status, FallbackStatus::Success);
        assert_eq!(
            outcome.fields.get(FieldName::TotalDue),
            &FieldValue::Found("5000.00".to_string())
        );
        assert_eq!(outcome.fields.get(FieldName::MinPayment), &FieldValue::NotFound);
        assert_eq!(outcome.fields.get(FieldName::StatementDate), &FieldValue::NotFound);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_sentinel_values_are_not_found() {
        let stub = Arc::new(StubCapability::answering(
            FallbackResponse::new().with_value(FieldName::TotalDue, "NOT_FOUND"),
        ));
        let extractor = FallbackExtractor::new().with_capability(stub);

        let outcome = extractor.extract_missing("text", &[FieldName::TotalDue]).await;

        assert_eq!(outcome.status, FallbackStatus::Success);
        assert_eq!(outcome.fields.get(FieldName::TotalDue), &FieldValue::NotFound);
    }

    #[tokio::test]
    async fn test_capability_error_is_failed() {
        let stub = Arc::new(StubCapability::failing("quota exceeded"));
        let extractor = FallbackExtractor::new().with_capability(stub.clone());

        let outcome = extractor.extract_missing("text", &[FieldName::TotalDue]).await;

        assert_eq!(outcome.status, FallbackStatus::Failed);
        assert_eq!(outcome.fields.found_count(), 0);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_failed_without_retry() {
        let stub = Arc::new(
            StubCapability::answering(FallbackResponse::new().with_value(FieldName::TotalDue, "1.00"))
                .with_delay(Duration::from_secs(10)),
        );
        let extractor = FallbackExtractor::new()
            .with_capability(stub.clone())
            .with_timeout(Duration::from_millis(20));

        let outcome = extractor.extract_missing("text", &[FieldName::TotalDue]).await;

        assert_eq!(outcome.status, FallbackStatus::Failed);
        assert_eq!(outcome.fields.get(FieldName::TotalDue), &FieldValue::NotFound);
        assert_eq!(stub.call_count(), 1);
    }
}
