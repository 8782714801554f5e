use chrono::FixedOffset;
use serde::Serialize;

use crate::catalog::FieldCatalog;
use crate::condition::VisibleFields;
use crate::config::{EngineConfig, ProcessingContext};
use crate::error::{EngineError, InternalError};
use crate::prevent_submit::{check_prevent_submit, prevent_submit_message};
use crate::reconcile::reconcile;
use crate::response::{RawResponse, ReconciledResponse, SignatureMap};
use crate::spec::form::FormDefinition;
use crate::validate::Validator;
use crate::verification::SignatureVerifier;
use crate::visibility::{apply_visibility, compute_visibility};

/// Stages a submission moves through. Any stage may end in `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Reconciled,
    VisibilityComputed,
    SubmitAllowed,
    Validated,
    Done,
    Rejected,
}

impl Stage {
    /// Successor on the success path.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::Reconciled),
            Stage::Reconciled => Some(Stage::VisibilityComputed),
            Stage::VisibilityComputed => Some(Stage::SubmitAllowed),
            Stage::SubmitAllowed => Some(Stage::Validated),
            Stage::Validated => Some(Stage::Done),
            Stage::Done | Stage::Rejected => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Done | Stage::Rejected)
    }
}

/// Annotated responses of an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedSubmission {
    pub form_id: String,
    pub responses: Vec<ReconciledResponse>,
    pub visible: VisibleFields,
}

/// Tracks the stage of one submission and logs every transition.
#[derive(Debug)]
struct Run<'a> {
    form_id: &'a str,
    stage: Stage,
}

impl<'a> Run<'a> {
    fn new(form_id: &'a str) -> Self {
        Self {
            form_id,
            stage: Stage::Start,
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            tracing::debug!(form_id = self.form_id, from = ?self.stage, to = ?next, "submission stage");
            self.stage = next;
        }
    }

    fn reject(&mut self, error: EngineError) -> EngineError {
        if error.is_internal() {
            tracing::error!(form_id = self.form_id, stage = ?self.stage, %error, "submission rejected");
        } else {
            tracing::info!(
                form_id = self.form_id,
                stage = ?self.stage,
                code = error.code(),
                %error,
                "submission rejected"
            );
        }
        self.stage = Stage::Rejected;
        error
    }
}

/// Entry point for processing submissions. Immutable and shareable.
#[derive(Debug, Clone)]
pub struct SubmissionProcessor {
    config: EngineConfig,
    verifier: Option<SignatureVerifier>,
    timezone: FixedOffset,
}

impl SubmissionProcessor {
    pub fn new(config: EngineConfig) -> Result<Self, InternalError> {
        let verifier = config
            .verification_public_key
            .as_deref()
            .map(|key| SignatureVerifier::from_base64(key, config.verification_expiry_secs))
            .transpose()?;
        let timezone = config.timezone()?;
        Ok(Self {
            config,
            verifier,
            timezone,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconciles, evaluates logic and validates one submission.
    ///
    /// Either every response comes back annotated with visibility and
    /// verification, or the first failure is returned and nothing else.
    #[tracing::instrument(skip_all, fields(form_id = %form.id))]
    pub fn process(
        &self,
        form: &FormDefinition,
        responses: Vec<RawResponse>,
        signatures: Option<&SignatureMap>,
        ctx: ProcessingContext,
    ) -> Result<ProcessedSubmission, EngineError> {
        let mut run = Run::new(&form.id);
        self.run_stages(&mut run, form, responses, signatures, ctx)
            .map_err(|error| run.reject(error))
    }

    fn run_stages(
        &self,
        run: &mut Run<'_>,
        form: &FormDefinition,
        responses: Vec<RawResponse>,
        signatures: Option<&SignatureMap>,
        ctx: ProcessingContext,
    ) -> Result<ProcessedSubmission, EngineError> {
        let catalog = FieldCatalog::build(form)?;
        let mut reconciled = reconcile(&catalog, responses)?;
        run.advance();

        let visible = compute_visibility(form, &reconciled)?;
        apply_visibility(&mut reconciled, &visible);
        run.advance();

        if let Some(rule) = check_prevent_submit(form, &reconciled, &visible) {
            return Err(EngineError::SubmissionBlocked {
                rule_id: rule.id.clone(),
                message: prevent_submit_message(rule, &self.config.prevent_submit_default_message),
            });
        }
        run.advance();

        let no_signatures = SignatureMap::new();
        let validator = Validator {
            form_id: &form.id,
            catalog: &catalog,
            signatures: signatures.unwrap_or(&no_signatures),
            verifier: self.verifier.as_ref(),
            hidden_answer_policy: self.config.hidden_answer_policy,
            submitted_at: ctx.submitted_at,
            today: ctx.local_date(self.timezone),
        };
        validator.validate_all(&mut reconciled)?;
        run.advance();

        let submission = ProcessedSubmission {
            form_id: form.id.clone(),
            responses: reconciled,
            visible,
        };
        run.advance();
        Ok(submission)
    }

    /// Reconciles and computes visibility without validating.
    pub fn visibility(
        &self,
        form: &FormDefinition,
        responses: Vec<RawResponse>,
    ) -> Result<VisibleFields, EngineError> {
        let catalog = FieldCatalog::build(form)?;
        let reconciled = reconcile(&catalog, responses)?;
        Ok(compute_visibility(form, &reconciled)?)
    }
}

/// One-shot helper around [`SubmissionProcessor`].
pub fn process_submission(
    form: &FormDefinition,
    responses: Vec<RawResponse>,
    signatures: Option<&SignatureMap>,
    config: EngineConfig,
    ctx: ProcessingContext,
) -> Result<ProcessedSubmission, EngineError> {
    SubmissionProcessor::new(config)?.process(form, responses, signatures, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{FieldDefinition, FieldKind};

    #[test]
    fn stages_follow_the_success_path() {
        let mut stage = Stage::Start;
        let mut path = vec![stage];
        while let Some(next) = stage.next() {
            path.push(next);
            stage = next;
        }
        assert_eq!(
            path,
            vec![
                Stage::Start,
                Stage::Reconciled,
                Stage::VisibilityComputed,
                Stage::SubmitAllowed,
                Stage::Validated,
                Stage::Done,
            ]
        );
        assert!(Stage::Rejected.is_terminal());
        assert!(Stage::Rejected.next().is_none());
    }

    #[test]
    fn run_ends_in_done_or_rejected() {
        let mut run = Run::new("form");
        for _ in 0..5 {
            run.advance();
        }
        assert_eq!(run.stage, Stage::Done);

        let mut run = Run::new("form");
        run.advance();
        let error = run.reject(EngineError::FieldMismatch { missing: vec![] });
        assert_eq!(run.stage, Stage::Rejected);
        assert_eq!(error.code(), "field_mismatch");
    }

    #[test]
    fn invalid_key_fails_construction() {
        let config = EngineConfig {
            verification_public_key: Some("%%%".into()),
            ..EngineConfig::default()
        };
        assert!(matches!(
            SubmissionProcessor::new(config),
            Err(InternalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn duplicated_field_id_is_processing_error() {
        let form = FormDefinition::new(
            "form",
            vec![
                FieldDefinition::new("q", "Text", FieldKind::ShortText),
                FieldDefinition::new("q", "Number", FieldKind::Number),
            ],
            vec![],
        );
        let err = process_submission(
            &form,
            vec![RawResponse::text("q", "hello")],
            None,
            EngineConfig::default(),
            ProcessingContext::now(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            EngineError::Processing {
                field_id: "q".into()
            }
        );
        assert_eq!(err.code(), "processing_error");
    }

    #[test]
    fn processor_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SubmissionProcessor>();
    }

    #[test]
    fn malformed_form_is_internal() {
        let form = FormDefinition {
            id: "broken".into(),
            title: None,
            fields: None,
            logic: vec![],
        };
        let err = process_submission(
            &form,
            vec![],
            None,
            EngineConfig::default(),
            ProcessingContext::now(),
        )
        .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn visibility_helper_reconciles_first() {
        let form = FormDefinition::new(
            "form",
            vec![FieldDefinition::new("name", "Name", FieldKind::ShortText)],
            vec![],
        );
        let processor = SubmissionProcessor::new(EngineConfig::default()).expect("processor");
        let err = processor.visibility(&form, vec![]).unwrap_err();
        assert!(matches!(err, EngineError::FieldMismatch { .. }));
    }
}
