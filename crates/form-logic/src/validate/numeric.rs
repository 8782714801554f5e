use std::sync::LazyLock;

use regex::Regex;

use crate::response::Answer;
use crate::spec::field::FieldDefinition;

use super::expect_text;
use super::text::check_length;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("digits regex"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("decimal regex"));

/// Non-negative whole numbers written with digits only.
pub(crate) fn validate_number(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    if !DIGITS.is_match(text) {
        return Err("answer must be a whole number".into());
    }

    let Some(rules) = &field.number_validation else {
        return Ok(());
    };
    if let Some(length) = &rules.length {
        check_length(length, text.len(), "digits")?;
    }
    // values too large for u64 are above any configurable maximum
    let value = text.parse::<u64>().ok();
    if let Some(min) = rules.range_min
        && value.is_some_and(|value| value < min)
    {
        return Err(format!("answer must be at least {min}"));
    }
    if let Some(max) = rules.range_max
        && value.is_none_or(|value| value > max)
    {
        return Err(format!("answer must be at most {max}"));
    }
    Ok(())
}

pub(crate) fn validate_decimal(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    if !DECIMAL.is_match(text) {
        return Err("answer must be a decimal number".into());
    }
    let value: f64 = text
        .parse()
        .map_err(|_| "answer must be a decimal number".to_string())?;

    if let Some(rules) = &field.decimal_validation {
        if let Some(min) = rules.min
            && value < min
        {
            return Err(format!("answer must be at least {min}"));
        }
        if let Some(max) = rules.max
            && value > max
        {
            return Err(format!("answer must be at most {max}"));
        }
    }
    Ok(())
}

pub(crate) fn validate_rating(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    let rating: u32 = text
        .parse()
        .map_err(|_| "rating must be a whole number".to_string())?;
    if rating == 0 || rating > field.rating_steps {
        return Err(format!("rating must be between 1 and {}", field.rating_steps));
    }
    Ok(())
}
