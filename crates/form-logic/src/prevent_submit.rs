use crate::condition::{LogicContext, VisibleFields};
use crate::response::ReconciledResponse;
use crate::spec::form::FormDefinition;
use crate::spec::logic::{LogicKind, LogicRule};

/// Returns the first prevent-submit rule whose conditions all hold.
pub fn check_prevent_submit<'f>(
    form: &'f FormDefinition,
    responses: &[ReconciledResponse],
    visible: &VisibleFields,
) -> Option<&'f LogicRule> {
    let ctx = LogicContext::new(responses);
    form.prevent_submit_rules()
        .filter(|rule| ctx.resolves(rule))
        .find(|rule| ctx.is_satisfied(rule, visible))
}

/// User-facing message of a prevent-submit rule.
pub fn prevent_submit_message(rule: &LogicRule, default_message: &str) -> String {
    match &rule.kind {
        LogicKind::PreventSubmit {
            message: Some(message),
        } if !message.trim().is_empty() => message.clone(),
        _ => default_message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::RawResponse;
    use crate::spec::field::{FieldDefinition, FieldKind};
    use crate::spec::logic::{Condition, ConditionState, ConditionValue};

    fn form(logic: Vec<LogicRule>) -> FormDefinition {
        FormDefinition::new(
            "form",
            vec![FieldDefinition::new("amount", "Amount", FieldKind::Number)],
            logic,
        )
    }

    fn responses(form: &FormDefinition, answer: &str) -> Vec<ReconciledResponse> {
        let field = &form.fields.as_ref().expect("fields")[0];
        vec![ReconciledResponse::from_raw(RawResponse::text("amount", answer), field)]
    }

    fn at_most(limit: f64) -> Condition {
        Condition::new(
            "amount",
            ConditionState::LessThanOrEqual,
            ConditionValue::Number(limit),
        )
    }

    fn all_visible() -> VisibleFields {
        ["amount".to_string()].into_iter().collect()
    }

    #[test]
    fn first_satisfied_rule_wins() {
        let form = form(vec![
            LogicRule::prevent_submit("small", vec![at_most(10.0)], Some("too small".into())),
            LogicRule::prevent_submit("tiny", vec![at_most(5.0)], Some("tiny".into())),
        ]);
        let responses = responses(&form, "3");
        let rule = check_prevent_submit(&form, &responses, &all_visible()).expect("blocked");
        assert_eq!(rule.id, "small");
    }

    #[test]
    fn unsatisfied_rules_allow_submission() {
        let form = form(vec![LogicRule::prevent_submit(
            "small",
            vec![at_most(10.0)],
            None,
        )]);
        let responses = responses(&form, "11");
        assert!(check_prevent_submit(&form, &responses, &all_visible()).is_none());
    }

    #[test]
    fn hidden_source_cannot_block() {
        let form = form(vec![LogicRule::prevent_submit(
            "small",
            vec![at_most(10.0)],
            None,
        )]);
        let responses = responses(&form, "1");
        assert!(check_prevent_submit(&form, &responses, &VisibleFields::new()).is_none());
    }

    #[test]
    fn empty_message_falls_back_to_default() {
        let rule = LogicRule::prevent_submit("r", vec![], Some("  ".into()));
        assert_eq!(prevent_submit_message(&rule, "closed"), "closed");
        let rule = LogicRule::prevent_submit("r", vec![], Some("too small".into()));
        assert_eq!(prevent_submit_message(&rule, "closed"), "too small");
    }
}
