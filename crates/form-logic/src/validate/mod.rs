//! Per-field answer validation.
//!
//! Every reconciled response goes through the same sequence: lookup,
//! visibility, required-ness, format and finally signature verification. The
//! first failing field aborts the submission.

mod attachment;
mod choice;
mod contact;
mod date;
mod identity;
mod numeric;
mod table;
mod text;

use chrono::{DateTime, NaiveDate, Utc};

use crate::catalog::FieldCatalog;
use crate::config::HiddenAnswerPolicy;
use crate::error::{EngineError, InternalError, ValidationFailure, ValidationKind};
use crate::response::{ReconciledResponse, SignatureMap};
use crate::spec::field::{FieldDefinition, FieldKind};
use crate::verification::SignatureVerifier;

/// Facts about the submission that format checks depend on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormatContext {
    pub today: NaiveDate,
}

/// Validates reconciled responses against their field definitions.
#[derive(Debug)]
pub struct Validator<'a, 'f> {
    pub form_id: &'a str,
    pub catalog: &'a FieldCatalog<'f>,
    pub signatures: &'a SignatureMap,
    pub verifier: Option<&'a SignatureVerifier>,
    pub hidden_answer_policy: HiddenAnswerPolicy,
    pub submitted_at: DateTime<Utc>,
    /// Submission date in the form's timezone.
    pub today: NaiveDate,
}

impl Validator<'_, '_> {
    /// Validates every response in order, stopping at the first failure.
    pub fn validate_all(&self, responses: &mut [ReconciledResponse]) -> Result<(), EngineError> {
        for response in responses.iter_mut() {
            self.validate(response)?;
        }
        Ok(())
    }

    /// Validates one response and records whether its answer was verified.
    pub fn validate(&self, response: &mut ReconciledResponse) -> Result<(), EngineError> {
        response.is_user_verified = false;

        let field = self
            .catalog
            .get(&response.id)
            .filter(|field| field.kind.is_data() && !self.catalog.is_ambiguous(&field.id))
            .ok_or_else(|| EngineError::Processing {
                field_id: response.id.clone(),
            })?;

        if let Some(declared) = response.declared_type
            && declared != field.kind
        {
            return Err(failure(
                field,
                ValidationKind::FieldTypeMismatch,
                format!(
                    "response declared {} but field is {}",
                    declared.as_str(),
                    field.kind.as_str()
                ),
            ));
        }

        let has_answer = response.has_answer();
        if !response.is_visible {
            if has_answer && self.hidden_answer_policy == HiddenAnswerPolicy::Reject {
                return Err(failure(
                    field,
                    ValidationKind::HiddenAnswer,
                    "answer submitted for a hidden field",
                ));
            }
            return Ok(());
        }

        if !has_answer {
            if field.required {
                return Err(failure(field, ValidationKind::Required, "answer is required"));
            }
            return Ok(());
        }

        let ctx = FormatContext { today: self.today };
        check_format(field, response, &ctx)
            .map_err(|reason| failure(field, ValidationKind::Format, reason))?;

        if field.is_verifiable {
            self.verify(field, response)?;
            response.is_user_verified = true;
        }

        Ok(())
    }

    fn verify(&self, field: &FieldDefinition, response: &ReconciledResponse) -> Result<(), EngineError> {
        let verifier = self
            .verifier
            .ok_or_else(|| InternalError::VerificationKeyMissing {
                field_id: field.id.clone(),
            })?;
        let Some(signature) = self.signatures.get(&field.id) else {
            tracing::warn!(form_id = %self.form_id, field_id = %field.id, "verified field has no signature");
            return Err(failure(
                field,
                ValidationKind::SignatureMissing,
                "field requires verification but no signature was found",
            ));
        };

        let answer = response
            .answer
            .as_ref()
            .map(|answer| answer.to_display())
            .unwrap_or_default();
        verifier
            .verify(self.form_id, &field.id, &answer, signature, self.submitted_at)
            .map_err(|err| {
                tracing::warn!(
                    form_id = %self.form_id,
                    field_id = %field.id,
                    error = %err,
                    "verification signature rejected"
                );
                failure(field, err.kind(), err.to_string())
            })
    }
}

/// Structural check for a non-empty answer, one branch per field kind.
pub(crate) fn check_format(
    field: &FieldDefinition,
    response: &ReconciledResponse,
    ctx: &FormatContext,
) -> Result<(), String> {
    let answer = response.answer.as_ref().ok_or("answer is missing")?;
    match field.kind {
        FieldKind::ShortText | FieldKind::LongText => text::validate_text(field, answer),
        FieldKind::Number => numeric::validate_number(field, answer),
        FieldKind::Decimal => numeric::validate_decimal(field, answer),
        FieldKind::Rating => numeric::validate_rating(field, answer),
        FieldKind::Dropdown => choice::validate_dropdown(field, answer),
        FieldKind::Radio => choice::validate_radio(field, answer),
        FieldKind::Checkbox => choice::validate_checkbox(field, answer),
        FieldKind::YesNo => choice::validate_yes_no(answer),
        FieldKind::Table => table::validate_table(field, answer),
        FieldKind::Date => date::validate_date(field, answer, ctx.today),
        FieldKind::Nric => identity::validate_nric(answer),
        FieldKind::Uen => identity::validate_uen(answer, ctx.today),
        FieldKind::Email => contact::validate_email(field, answer),
        FieldKind::Mobile => contact::validate_mobile(field, answer),
        FieldKind::HomeNumber => contact::validate_home_number(field, answer),
        FieldKind::Attachment => {
            attachment::validate_attachment(field, answer, response.attachment.as_ref())
        }
        FieldKind::Section | FieldKind::Statement | FieldKind::Image => {
            Err(format!("{} fields do not accept answers", field.kind.as_str()))
        }
    }
}

/// Text of a scalar answer, or a format error naming the expected shape.
pub(crate) fn expect_text(answer: &crate::response::Answer) -> Result<&str, String> {
    answer
        .as_text()
        .ok_or_else(|| "answer must be a single value".to_string())
}

fn failure(field: &FieldDefinition, kind: ValidationKind, reason: impl Into<String>) -> EngineError {
    EngineError::Validation(ValidationFailure::new(field.id.clone(), kind, reason))
}
