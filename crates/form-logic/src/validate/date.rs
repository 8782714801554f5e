use chrono::{Datelike, NaiveDate};

use crate::response::Answer;
use crate::spec::field::{DateRuleKind, FieldDefinition};

use super::expect_text;

/// Answer format produced by the date picker, e.g. `15 Jan 2021`.
pub(crate) const ANSWER_FORMAT: &str = "%d %b %Y";
/// Format of custom date bounds in the field definition.
pub(crate) const BOUND_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn validate_date(
    field: &FieldDefinition,
    answer: &Answer,
    today: NaiveDate,
) -> Result<(), String> {
    let text = expect_text(answer)?.trim();
    let date = NaiveDate::parse_from_str(text, ANSWER_FORMAT)
        .map_err(|_| "answer must be a date like 15 Jan 2021".to_string())?;

    if let Some(rules) = &field.date_validation {
        match rules.kind {
            DateRuleKind::None => {}
            DateRuleKind::DisallowPast => {
                if date < today {
                    return Err("past dates are not allowed".into());
                }
            }
            DateRuleKind::DisallowFuture => {
                if date > today {
                    return Err("future dates are not allowed".into());
                }
            }
            DateRuleKind::Custom => {
                if let Some(min) = parse_bound(field, rules.custom_min.as_deref())
                    && date < min
                {
                    return Err(format!("date must not be before {}", min.format(ANSWER_FORMAT)));
                }
                if let Some(max) = parse_bound(field, rules.custom_max.as_deref())
                    && date > max
                {
                    return Err(format!("date must not be after {}", max.format(ANSWER_FORMAT)));
                }
            }
        }
    }

    if field.invalid_days.contains(&date.weekday()) {
        return Err(format!("{} is not an allowed day", date.weekday()));
    }
    Ok(())
}

fn parse_bound(field: &FieldDefinition, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    match NaiveDate::parse_from_str(raw.trim(), BOUND_FORMAT) {
        Ok(date) => Some(date),
        Err(err) => {
            tracing::warn!(field_id = %field.id, bound = raw, error = %err, "ignoring malformed date bound");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{DateValidation, FieldKind};
    use chrono::Weekday;

    fn today() -> NaiveDate {
        // a Friday
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn text(value: &str) -> Answer {
        Answer::Text(value.into())
    }

    fn field_with(kind: DateRuleKind, min: Option<&str>, max: Option<&str>) -> FieldDefinition {
        let mut field = FieldDefinition::new("d", "Date", FieldKind::Date);
        field.date_validation = Some(DateValidation {
            kind,
            custom_min: min.map(str::to_string),
            custom_max: max.map(str::to_string),
        });
        field
    }

    #[test]
    fn parses_picker_format() {
        let field = FieldDefinition::new("d", "Date", FieldKind::Date);
        assert!(validate_date(&field, &text("15 Jan 2021"), today()).is_ok());
        assert!(validate_date(&field, &text("2021-01-15"), today()).is_err());
        assert!(validate_date(&field, &text("31 Feb 2021"), today()).is_err());
    }

    #[test]
    fn past_and_future_rules() {
        let no_past = field_with(DateRuleKind::DisallowPast, None, None);
        assert!(validate_date(&no_past, &text("13 Jun 2024"), today()).is_err());
        assert!(validate_date(&no_past, &text("14 Jun 2024"), today()).is_ok());
        let no_future = field_with(DateRuleKind::DisallowFuture, None, None);
        assert!(validate_date(&no_future, &text("15 Jun 2024"), today()).is_err());
        assert!(validate_date(&no_future, &text("14 Jun 2024"), today()).is_ok());
    }

    #[test]
    fn custom_range_is_inclusive() {
        let field = field_with(DateRuleKind::Custom, Some("2024-01-01"), Some("2024-01-31"));
        assert!(validate_date(&field, &text("01 Jan 2024"), today()).is_ok());
        assert!(validate_date(&field, &text("31 Jan 2024"), today()).is_ok());
        assert!(validate_date(&field, &text("01 Feb 2024"), today()).is_err());
        assert!(validate_date(&field, &text("31 Dec 2023"), today()).is_err());
    }

    #[test]
    fn malformed_bound_is_ignored() {
        let field = field_with(DateRuleKind::Custom, Some("not a date"), None);
        assert!(validate_date(&field, &text("01 Jan 1990"), today()).is_ok());
    }

    #[test]
    fn invalid_days_are_rejected() {
        let mut field = FieldDefinition::new("d", "Date", FieldKind::Date);
        field.invalid_days = vec![Weekday::Sat, Weekday::Sun];
        assert!(validate_date(&field, &text("15 Jun 2024"), today()).is_err());
        assert!(validate_date(&field, &text("14 Jun 2024"), today()).is_ok());
    }
}
