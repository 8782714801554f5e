#![allow(missing_docs)]

pub mod catalog;
pub mod condition;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prevent_submit;
pub mod reconcile;
pub mod response;
pub mod spec;
pub mod validate;
pub mod verification;
pub mod visibility;

pub use catalog::FieldCatalog;
pub use condition::{LogicContext, ValueType, VisibleFields, evaluate_condition};
pub use config::{EngineConfig, HiddenAnswerPolicy, ProcessingContext, VERIFICATION_KEY_ENV};
pub use error::{EngineError, InternalError, ValidationFailure, ValidationKind};
pub use pipeline::{ProcessedSubmission, Stage, SubmissionProcessor, process_submission};
pub use prevent_submit::check_prevent_submit;
pub use reconcile::reconcile;
pub use response::{Answer, AttachmentPayload, RawResponse, ReconciledResponse, SignatureMap};
pub use spec::{
    Condition, ConditionState, ConditionValue, FieldDefinition, FieldKind, FormDefinition,
    LogicKind, LogicRule,
};
pub use validate::Validator;
pub use verification::{SignatureVerifier, VerificationError, signed_message};
pub use visibility::{VisibilityOutcome, apply_visibility, compute_visibility, evaluate_visibility};
