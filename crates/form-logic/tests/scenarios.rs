use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{TimeZone, Utc};
use ed25519_dalek::{Signer, SigningKey};

use form_logic::{
    EngineConfig, EngineError, FormDefinition, HiddenAnswerPolicy, ProcessedSubmission,
    ProcessingContext, RawResponse, SignatureMap, SubmissionProcessor, ValidationKind,
    signed_message,
};

fn fixture(name: &str) -> FormDefinition {
    let raw = match name {
        "yes_no_reveal" => include_str!("fixtures/yes_no_reveal.json"),
        "chained_logic" => include_str!("fixtures/chained_logic.json"),
        "prevent_submit" => include_str!("fixtures/prevent_submit.json"),
        "verified_field" => include_str!("fixtures/verified_field.json"),
        _ => panic!("unknown fixture {}", name),
    };
    serde_json::from_str(raw).expect("deserialize form")
}

fn ctx() -> ProcessingContext {
    ProcessingContext::at(Utc.with_ymd_and_hms(2024, 6, 14, 2, 0, 0).unwrap())
}

fn process(
    form: &FormDefinition,
    responses: Vec<RawResponse>,
) -> Result<ProcessedSubmission, EngineError> {
    SubmissionProcessor::new(EngineConfig::default())
        .expect("processor")
        .process(form, responses, None, ctx())
}

fn visibility_of(submission: &ProcessedSubmission, id: &str) -> bool {
    submission
        .responses
        .iter()
        .find(|response| response.id == id)
        .map(|response| response.is_visible)
        .expect("response present")
}

fn failure_kind(result: Result<ProcessedSubmission, EngineError>) -> (String, ValidationKind) {
    match result {
        Err(EngineError::Validation(failure)) => (failure.field_id, failure.kind),
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn yes_no_answer_no_hides_details_and_waives_required() {
    let form = fixture("yes_no_reveal");
    let submission = process(
        &form,
        vec![
            RawResponse::text("had_issue", "No"),
            RawResponse::empty("issue_details"),
        ],
    )
    .expect("accepted");
    assert!(!visibility_of(&submission, "issue_details"));
    assert!(visibility_of(&submission, "had_issue"));
    assert_eq!(submission.responses.len(), 2);
}

#[test]
fn yes_no_answer_yes_reveals_details() {
    let form = fixture("yes_no_reveal");
    let submission = process(
        &form,
        vec![
            RawResponse::text("had_issue", "Yes"),
            RawResponse::text("issue_details", "Broken link on page 2"),
        ],
    )
    .expect("accepted");
    assert!(visibility_of(&submission, "issue_details"));

    let missing = process(
        &form,
        vec![
            RawResponse::text("had_issue", "Yes"),
            RawResponse::empty("issue_details"),
        ],
    );
    assert_eq!(
        failure_kind(missing),
        ("issue_details".to_string(), ValidationKind::Required)
    );
}

#[test]
fn chained_logic_reveals_date_through_radio_others() {
    let form = fixture("chained_logic");
    let submission = process(
        &form,
        vec![
            RawResponse::text("rating", "2"),
            RawResponse::text("produce", "Others: peas"),
            RawResponse::text("delivery_date", "20 Jun 2024"),
        ],
    )
    .expect("accepted");
    assert!(visibility_of(&submission, "produce"));
    assert!(visibility_of(&submission, "delivery_date"));
}

#[test]
fn chained_logic_low_rating_hides_whole_chain() {
    let form = fixture("chained_logic");
    let submission = process(
        &form,
        vec![
            RawResponse::text("rating", "1"),
            RawResponse::text("produce", "Others: peas"),
            RawResponse::empty("delivery_date"),
        ],
    )
    .expect("accepted");
    assert!(!visibility_of(&submission, "produce"));
    assert!(!visibility_of(&submission, "delivery_date"));
    assert_eq!(submission.visible.len(), 1);
}

#[test]
fn chained_logic_validates_revealed_date() {
    let form = fixture("chained_logic");
    let result = process(
        &form,
        vec![
            RawResponse::text("rating", "4"),
            RawResponse::text("produce", "Others: peas"),
            RawResponse::text("delivery_date", "01 Jan 2020"),
        ],
    );
    assert_eq!(
        failure_kind(result),
        ("delivery_date".to_string(), ValidationKind::Format)
    );
}

#[test]
fn prevent_submit_blocks_small_amounts() {
    let form = fixture("prevent_submit");
    let blocked = process(
        &form,
        vec![RawResponse::text("amount", "9"), RawResponse::empty("purpose")],
    );
    assert_eq!(
        blocked,
        Err(EngineError::SubmissionBlocked {
            rule_id: "minimum-amount".into(),
            message: "too small".into(),
        })
    );

    let allowed = process(
        &form,
        vec![RawResponse::text("amount", "11"), RawResponse::empty("purpose")],
    );
    assert!(allowed.is_ok());
}

#[test]
fn stray_response_is_dropped_without_error() {
    let form = fixture("chained_logic");
    let submission = process(
        &form,
        vec![
            RawResponse::text("rating", "3"),
            RawResponse::text("not_a_field", "whatever"),
            RawResponse::text("produce", "Apple"),
            RawResponse::empty("delivery_date"),
        ],
    )
    .expect("accepted");
    assert_eq!(submission.responses.len(), 3);
    assert!(submission.responses.iter().all(|r| r.id != "not_a_field"));
}

#[test]
fn missing_form_field_is_field_mismatch() {
    let form = fixture("chained_logic");
    let result = process(
        &form,
        vec![
            RawResponse::text("rating", "3"),
            RawResponse::text("produce", "Apple"),
        ],
    );
    assert_eq!(
        result,
        Err(EngineError::FieldMismatch {
            missing: vec!["delivery_date".into()]
        })
    );
}

#[test]
fn hidden_answers_can_be_rejected_by_config() {
    let form = fixture("yes_no_reveal");
    let config = EngineConfig {
        hidden_answer_policy: HiddenAnswerPolicy::Reject,
        ..EngineConfig::default()
    };
    let result = SubmissionProcessor::new(config).expect("processor").process(
        &form,
        vec![
            RawResponse::text("had_issue", "No"),
            RawResponse::text("issue_details", "sneaky"),
        ],
        None,
        ctx(),
    );
    assert_eq!(
        failure_kind(result),
        ("issue_details".to_string(), ValidationKind::HiddenAnswer)
    );
}

mod verified {
    use super::*;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[42u8; 32])
    }

    fn processor() -> SubmissionProcessor {
        let config = EngineConfig {
            verification_public_key: Some(STANDARD.encode(signing_key().verifying_key().to_bytes())),
            ..EngineConfig::default()
        };
        SubmissionProcessor::new(config).expect("processor")
    }

    fn signatures_for(answer: &str) -> SignatureMap {
        let signed_at = ctx().submitted_at.timestamp_millis() - 5 * 60 * 1000;
        let message = signed_message("txn-42", "identity-form", "id_number", answer, signed_at);
        let signature = signing_key().sign(message.as_bytes());
        SignatureMap::from([(
            "id_number".to_string(),
            format!(
                "f=identity-form,v=txn-42,t={signed_at},s={}",
                STANDARD.encode(signature.to_bytes())
            ),
        )])
    }

    fn responses(answer: &str) -> Vec<RawResponse> {
        let mut id_number = RawResponse::text("id_number", answer);
        id_number.is_user_verified = true;
        vec![RawResponse::text("full_name", "Ada Lim"), id_number]
    }

    #[test]
    fn signed_answer_passes_and_is_marked_verified() {
        let form = fixture("verified_field");
        let signatures = signatures_for("S1234567A");
        let submission = processor()
            .process(&form, responses("S1234567A"), Some(&signatures), ctx())
            .expect("accepted");
        let id_number = submission
            .responses
            .iter()
            .find(|response| response.id == "id_number")
            .expect("id_number");
        assert!(id_number.is_user_verified);
        let full_name = &submission.responses[0];
        assert!(!full_name.is_user_verified);
    }

    #[test]
    fn tampered_answer_is_signature_mismatch() {
        let form = fixture("verified_field");
        let signatures = signatures_for("S1234567A");
        let result = processor().process(&form, responses("S7654321A"), Some(&signatures), ctx());
        let (field_id, kind) = failure_kind(result);
        assert_eq!(field_id, "id_number");
        assert_eq!(kind, ValidationKind::SignatureMismatch);
        assert!(kind.is_tampering());
    }

    #[test]
    fn malformed_answer_is_format_not_signature() {
        let form = fixture("verified_field");
        let signatures = signatures_for("S1234567A");
        let result = processor().process(&form, responses("S123"), Some(&signatures), ctx());
        let (_, kind) = failure_kind(result);
        assert_eq!(kind, ValidationKind::Format);
        assert!(!kind.is_tampering());
    }

    #[test]
    fn missing_signature_is_reported() {
        let form = fixture("verified_field");
        let result = processor().process(&form, responses("S1234567A"), None, ctx());
        let (_, kind) = failure_kind(result);
        assert_eq!(kind, ValidationKind::SignatureMissing);
    }
}
