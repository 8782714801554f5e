use std::collections::HashSet;

use crate::response::{Answer, OTHERS_PREFIX};
use crate::spec::field::FieldDefinition;

use super::expect_text;

pub(crate) fn validate_dropdown(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?;
    if field.options.iter().any(|option| option == text) {
        Ok(())
    } else {
        Err("answer is not one of the options".into())
    }
}

pub(crate) fn validate_radio(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let text = expect_text(answer)?;
    if is_option(field, text) {
        Ok(())
    } else {
        Err("answer is not one of the options".into())
    }
}

pub(crate) fn validate_checkbox(field: &FieldDefinition, answer: &Answer) -> Result<(), String> {
    let Answer::List(selected) = answer else {
        return Err("checkbox answers must be a list".into());
    };

    let mut seen = HashSet::with_capacity(selected.len());
    for item in selected {
        if !is_option(field, item) {
            return Err(format!("'{item}' is not one of the options"));
        }
        if !seen.insert(item.as_str()) {
            return Err(format!("'{item}' was selected more than once"));
        }
    }

    if let Some(limits) = &field.selection_limits {
        if let Some(min) = limits.min
            && selected.len() < min
        {
            return Err(format!("select at least {min} options"));
        }
        if let Some(max) = limits.max
            && selected.len() > max
        {
            return Err(format!("select at most {max} options"));
        }
    }
    Ok(())
}

pub(crate) fn validate_yes_no(answer: &Answer) -> Result<(), String> {
    match expect_text(answer)? {
        "Yes" | "No" => Ok(()),
        _ => Err("answer must be Yes or No".into()),
    }
}

/// Declared option, or a non-empty "others" value when the field allows it.
fn is_option(field: &FieldDefinition, value: &str) -> bool {
    if field.options.iter().any(|option| option == value) {
        return true;
    }
    field.others_enabled
        && value
            .strip_prefix(OTHERS_PREFIX)
            .is_some_and(|rest| !rest.trim().is_empty())
}
