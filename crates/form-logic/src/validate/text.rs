use crate::response::Answer;
use crate::spec::field::{FieldDefinition, LengthRule, LengthRuleKind};

use super::expect_text;

pub(crate) fn validate_text(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?;
    if let Some(rule) = &field.text_length {
        check_length(rule, text.chars().count(), "characters")?;
    }
    Ok(())
}

/// Applies a length rule to a count of characters or digits.
pub(crate) fn check_length(rule: &LengthRule, count: usize, unit: &str) -> Result<(), String> {
    match rule.kind {
        LengthRuleKind::Exact => {
            if let Some(exact) = rule.min.or(rule.max)
                && count != exact
            {
                return Err(format!("answer must be exactly {exact} {unit}"));
            }
        }
        LengthRuleKind::Minimum => {
            if let Some(min) = rule.min
                && count < min
            {
                return Err(format!("answer must be at least {min} {unit}"));
            }
        }
        LengthRuleKind::Maximum => {
            if let Some(max) = rule.max
                && count > max
            {
                return Err(format!("answer must be at most {max} {unit}"));
            }
        }
        LengthRuleKind::Range => {
            let min = rule.min.unwrap_or(0);
            let max = rule.max.unwrap_or(usize::MAX);
            if count < min || count > max {
                return Err(format!("answer must be between {min} and {max} {unit}"));
            }
        }
    }
    Ok(())
}
