use std::sync::LazyLock;

use regex::Regex;

use crate::response::Answer;
use crate::spec::field::FieldDefinition;

use super::expect_text;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email regex")
});
static INTERNATIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").expect("e164 regex"));
static SG_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+65[89]\d{7}$").expect("sg mobile regex"));
static SG_HOME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+65[36]\d{7}$").expect("sg home regex"));

const SG_PREFIX: &str = "+65";

pub(crate) fn validate_email(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    if !EMAIL.is_match(text) {
        return Err("answer is not a valid email address".into());
    }
    if field.allowed_email_domains.is_empty() {
        return Ok(());
    }

    let domain = text
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .unwrap_or_default();
    let allowed = field.allowed_email_domains.iter().any(|allowed| {
        allowed.trim().trim_start_matches('@').to_ascii_lowercase() == domain
    });
    if allowed {
        Ok(())
    } else {
        Err(format!("email domain {domain} is not allowed"))
    }
}

pub(crate) fn validate_mobile(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    validate_phone(field, answer, &SG_MOBILE, "mobile")
}

pub(crate) fn validate_home_number(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    validate_phone(field, answer, &SG_HOME, "home")
}

/// Local numbers must match the local pattern; foreign ones need the field to
/// allow international numbers.
fn validate_phone(
    field: &FieldDefinition,
    answer: &Answer,
    local: &Regex,
    label: &str,
) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    if text.starts_with(SG_PREFIX) {
        return if local.is_match(text) {
            Ok(())
        } else {
            Err(format!("answer is not a valid {label} number"))
        };
    }
    if !field.allow_international {
        return Err(format!("only local {label} numbers are allowed"));
    }
    if INTERNATIONAL.is_match(text) {
        Ok(())
    } else {
        Err(format!("answer is not a valid {label} number"))
    }
}
