use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Why a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    Required,
    Format,
    FieldTypeMismatch,
    HiddenAnswer,
    SignatureMissing,
    SignatureMismatch,
    SignatureExpired,
}

impl ValidationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::Required => "required",
            ValidationKind::Format => "format",
            ValidationKind::FieldTypeMismatch => "field_type_mismatch",
            ValidationKind::HiddenAnswer => "hidden_answer",
            ValidationKind::SignatureMissing => "signature_missing",
            ValidationKind::SignatureMismatch => "signature_mismatch",
            ValidationKind::SignatureExpired => "signature_expired",
        }
    }

    /// Signature failures imply a tampered payload rather than a user mistake.
    pub fn is_tampering(self) -> bool {
        matches!(
            self,
            ValidationKind::SignatureMissing
                | ValidationKind::SignatureMismatch
                | ValidationKind::SignatureExpired
        )
    }
}

/// First failing field of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("field {field_id} failed {} validation: {reason}", .kind.as_str())]
pub struct ValidationFailure {
    pub field_id: String,
    pub kind: ValidationKind,
    pub reason: String,
}

impl ValidationFailure {
    pub fn new(field_id: impl Into<String>, kind: ValidationKind, reason: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Failures that indicate a broken form or deployment, not respondent error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("form {form_id} has no field list")]
    MalformedForm { form_id: String },
    #[error("visibility did not converge after {passes} passes")]
    VisibilityDidNotConverge { passes: usize },
    #[error("field {field_id} is verifiable but no verification key is configured")]
    VerificationKeyMissing { field_id: String },
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}

/// Terminal rejection of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("some form fields are missing: {}", missing.join(", "))]
    FieldMismatch { missing: Vec<String> },
    #[error("response {field_id} does not match exactly one form field")]
    Processing { field_id: String },
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error("submission blocked by rule {rule_id}: {message}")]
    SubmissionBlocked { rule_id: String, message: String },
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
}

impl EngineError {
    /// Stable machine-readable code for callers.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::FieldMismatch { .. } => "field_mismatch",
            EngineError::Processing { .. } => "processing_error",
            EngineError::Validation(_) => "validation_failure",
            EngineError::SubmissionBlocked { .. } => "submission_blocked",
            EngineError::Internal(_) => "internal_error",
        }
    }

    /// Internal errors should be logged and alerted on, not shown to respondents.
    pub fn is_internal(&self) -> bool {
        matches!(self, EngineError::Internal(_))
    }

    /// JSON report used by the CLI and HTTP handlers.
    pub fn to_report(&self) -> Value {
        let mut report = json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        match self {
            EngineError::FieldMismatch { missing } => {
                report["missing"] = json!(missing);
            }
            EngineError::Processing { field_id } => {
                report["field_id"] = json!(field_id);
            }
            EngineError::Validation(failure) => {
                report["field_id"] = json!(failure.field_id);
                report["kind"] = json!(failure.kind.as_str());
                report["reason"] = json!(failure.reason);
            }
            EngineError::SubmissionBlocked { rule_id, message } => {
                report["rule_id"] = json!(rule_id);
                report["message"] = json!(message);
            }
            EngineError::Internal(_) => {}
        }
        report
    }
}
