use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::InternalError;

/// Environment variable that overrides [`EngineConfig::verification_public_key`].
pub const VERIFICATION_KEY_ENV: &str = "FORM_LOGIC_VERIFICATION_PUBLIC_KEY";

pub const DEFAULT_PREVENT_SUBMIT_MESSAGE: &str = "Submission is disabled for this form.";

/// What to do with a non-empty answer on a field hidden by logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HiddenAnswerPolicy {
    #[default]
    Keep,
    Reject,
}

/// Engine settings shared by every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngineConfig {
    /// Base64 Ed25519 public key used to check OTP verification signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_public_key: Option<String>,
    #[serde(default = "default_expiry_secs")]
    pub verification_expiry_secs: u64,
    #[serde(default)]
    pub hidden_answer_policy: HiddenAnswerPolicy,
    /// Offset used to decide what "today" is for date rules.
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset_minutes: i32,
    #[serde(default = "default_prevent_submit_message")]
    pub prevent_submit_default_message: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            verification_public_key: None,
            verification_expiry_secs: default_expiry_secs(),
            hidden_answer_policy: HiddenAnswerPolicy::default(),
            timezone_offset_minutes: default_timezone_offset(),
            prevent_submit_default_message: default_prevent_submit_message(),
        }
    }
}

impl EngineConfig {
    /// Parses a JSON config. Blank input yields the defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, InternalError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(|err| InternalError::InvalidConfig(err.to_string()))
    }

    /// Applies [`VERIFICATION_KEY_ENV`] when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var(VERIFICATION_KEY_ENV)
            && !key.trim().is_empty()
        {
            self.verification_public_key = Some(key.trim().to_string());
        }
        self
    }

    pub fn timezone(&self) -> Result<FixedOffset, InternalError> {
        self.timezone_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                InternalError::InvalidConfig(format!(
                    "timezone offset {} minutes is out of range",
                    self.timezone_offset_minutes
                ))
            })
    }
}

/// Per-submission inputs that are not part of the form or the answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingContext {
    pub submitted_at: DateTime<Utc>,
}

impl ProcessingContext {
    pub fn at(submitted_at: DateTime<Utc>) -> Self {
        Self { submitted_at }
    }

    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Calendar date of the submission in the given offset.
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.submitted_at.with_timezone(&offset).date_naive()
    }
}

fn default_expiry_secs() -> u64 {
    4 * 60 * 60
}

fn default_timezone_offset() -> i32 {
    8 * 60
}

fn default_prevent_submit_message() -> String {
    DEFAULT_PREVENT_SUBMIT_MESSAGE.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn blank_config_uses_defaults() {
        let config = EngineConfig::from_json_str("  ").expect("config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.verification_expiry_secs, 14_400);
        assert_eq!(config.hidden_answer_policy, HiddenAnswerPolicy::Keep);
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let config =
            EngineConfig::from_json_str(r#"{"hidden_answer_policy": "reject"}"#).expect("config");
        assert_eq!(config.hidden_answer_policy, HiddenAnswerPolicy::Reject);
        assert_eq!(config.timezone_offset_minutes, 480);
    }

    #[test]
    fn malformed_config_is_internal_error() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, InternalError::InvalidConfig(_)));
    }

    #[test]
    fn out_of_range_offset_is_invalid_config() {
        for minutes in [i32::MAX, i32::MIN, 24 * 60] {
            let config = EngineConfig {
                timezone_offset_minutes: minutes,
                ..EngineConfig::default()
            };
            assert!(matches!(config.timezone(), Err(InternalError::InvalidConfig(_))));
        }
    }

    #[test]
    fn local_date_follows_offset() {
        let ctx = ProcessingContext::at(Utc.with_ymd_and_hms(2024, 3, 1, 17, 30, 0).unwrap());
        let sgt = EngineConfig::default().timezone().expect("offset");
        assert_eq!(ctx.local_date(sgt), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }
}
