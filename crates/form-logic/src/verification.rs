//! Checks of signatures issued when a respondent completes an OTP challenge.
//!
//! A signature string has the shape
//! `f=<form_id>,v=<transaction_id>,t=<signed_at_ms>,s=<base64 signature>` and
//! signs `<transaction_id>.<form_id>.<field_id>.<answer>.<signed_at_ms>` with
//! Ed25519. The engine only verifies; issuing happens in the OTP service.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

use crate::error::{InternalError, ValidationKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("signature is malformed")]
    Malformed,
    #[error("signature was issued for form {0}")]
    FormMismatch(String),
    #[error("signature has expired")]
    Expired,
    #[error("signature does not match the submitted answer")]
    Invalid,
}

impl VerificationError {
    pub fn kind(&self) -> ValidationKind {
        match self {
            VerificationError::Expired => ValidationKind::SignatureExpired,
            _ => ValidationKind::SignatureMismatch,
        }
    }
}

/// Parsed components of a signature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureParts {
    pub form_id: String,
    pub transaction_id: String,
    pub signed_at_ms: i64,
    pub signature: Vec<u8>,
}

impl SignatureParts {
    pub fn parse(raw: &str) -> Result<Self, VerificationError> {
        let mut form_id = None;
        let mut transaction_id = None;
        let mut signed_at_ms = None;
        let mut signature = None;

        for part in raw.split(',') {
            let (key, value) = part.split_once('=').ok_or(VerificationError::Malformed)?;
            match key.trim() {
                "f" => form_id = Some(value.to_string()),
                "v" => transaction_id = Some(value.to_string()),
                "t" => {
                    signed_at_ms = Some(
                        value
                            .parse::<i64>()
                            .map_err(|_| VerificationError::Malformed)?,
                    )
                }
                // base64 padding contains '=', so the value keeps everything after the key
                "s" => {
                    signature = Some(
                        STANDARD
                            .decode(value)
                            .map_err(|_| VerificationError::Malformed)?,
                    )
                }
                _ => return Err(VerificationError::Malformed),
            }
        }

        Ok(Self {
            form_id: form_id.ok_or(VerificationError::Malformed)?,
            transaction_id: transaction_id.ok_or(VerificationError::Malformed)?,
            signed_at_ms: signed_at_ms.ok_or(VerificationError::Malformed)?,
            signature: signature.ok_or(VerificationError::Malformed)?,
        })
    }
}

/// Message covered by a verification signature.
pub fn signed_message(
    transaction_id: &str,
    form_id: &str,
    field_id: &str,
    answer: &str,
    signed_at_ms: i64,
) -> String {
    format!("{transaction_id}.{form_id}.{field_id}.{answer}.{signed_at_ms}")
}

/// Verifies OTP signatures against the OTP service's public key.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    key: VerifyingKey,
    expiry_ms: i64,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey, expiry_secs: u64) -> Self {
        let expiry_ms = i64::try_from(expiry_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        Self { key, expiry_ms }
    }

    /// Builds a verifier from a base64 encoded 32-byte Ed25519 public key.
    pub fn from_base64(encoded: &str, expiry_secs: u64) -> Result<Self, InternalError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|err| {
            InternalError::InvalidConfig(format!("verification key is not base64: {err}"))
        })?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|_| {
            InternalError::InvalidConfig("verification key must be 32 bytes".to_string())
        })?;
        let key = VerifyingKey::from_bytes(&bytes).map_err(|err| {
            InternalError::InvalidConfig(format!("verification key is invalid: {err}"))
        })?;
        Ok(Self::new(key, expiry_secs))
    }

    pub fn verify(
        &self,
        form_id: &str,
        field_id: &str,
        answer: &str,
        raw_signature: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<(), VerificationError> {
        let parts = SignatureParts::parse(raw_signature)?;
        if parts.form_id != form_id {
            return Err(VerificationError::FormMismatch(parts.form_id));
        }

        let age_ms = submitted_at
            .timestamp_millis()
            .checked_sub(parts.signed_at_ms)
            .ok_or(VerificationError::Malformed)?;
        if age_ms < 0 || age_ms > self.expiry_ms {
            return Err(VerificationError::Expired);
        }

        let signature =
            Signature::from_slice(&parts.signature).map_err(|_| VerificationError::Malformed)?;
        let message = signed_message(
            &parts.transaction_id,
            form_id,
            field_id,
            answer,
            parts.signed_at_ms,
        );
        self.key
            .verify(message.as_bytes(), &signature)
            .map_err(|_| VerificationError::Invalid)
    }
}
