//! Condition and rule evaluation shared by visibility and prevent-submit logic.

use std::collections::{BTreeSet, HashMap};

use crate::response::{Answer, OTHERS_OPTION, OTHERS_PREFIX, ReconciledResponse};
use crate::spec::field::FieldKind;
use crate::spec::logic::{Condition, ConditionState, ConditionValue, LogicRule};

/// Ids of the fields currently shown to the respondent.
pub type VisibleFields = BTreeSet<String>;

/// Value type a condition compares against, derived from the source field kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    SingleSelect,
    MultiSelect,
    Number,
}

impl ValueType {
    pub fn for_kind(kind: FieldKind) -> Option<Self> {
        match kind {
            FieldKind::Radio | FieldKind::Dropdown | FieldKind::YesNo => {
                Some(ValueType::SingleSelect)
            }
            FieldKind::Checkbox => Some(ValueType::MultiSelect),
            FieldKind::Number | FieldKind::Decimal | FieldKind::Rating => Some(ValueType::Number),
            _ => None,
        }
    }

    /// Whether a condition state makes sense for this value type.
    pub fn supports(self, state: ConditionState) -> bool {
        match self {
            ValueType::SingleSelect | ValueType::MultiSelect => !state.is_relational(),
            ValueType::Number => true,
        }
    }
}

/// Reconciled responses indexed by field id for condition lookups.
#[derive(Debug)]
pub struct LogicContext<'r> {
    responses: HashMap<&'r str, &'r ReconciledResponse>,
}

impl<'r> LogicContext<'r> {
    pub fn new(responses: &'r [ReconciledResponse]) -> Self {
        Self {
            responses: responses.iter().map(|r| (r.id.as_str(), r)).collect(),
        }
    }

    pub fn response(&self, field_id: &str) -> Option<&'r ReconciledResponse> {
        self.responses.get(field_id).copied()
    }

    /// A rule resolves when every condition source is present in the responses.
    pub fn resolves(&self, rule: &LogicRule) -> bool {
        rule.conditions
            .iter()
            .all(|condition| self.responses.contains_key(condition.field.as_str()))
    }

    /// Conjunction of the rule's conditions. A rule without conditions never
    /// holds, and a condition only holds while its source field is visible.
    pub fn is_satisfied(&self, rule: &LogicRule, visible: &VisibleFields) -> bool {
        if rule.conditions.is_empty() {
            return false;
        }
        rule.conditions.iter().all(|condition| {
            visible.contains(condition.field.as_str())
                && self
                    .response(&condition.field)
                    .is_some_and(|response| evaluate_condition(condition, response))
        })
    }
}

/// Evaluates one condition against the current answer of its source field.
pub fn evaluate_condition(condition: &Condition, response: &ReconciledResponse) -> bool {
    let Some(answer) = response.answer.as_ref().filter(|answer| !answer.is_empty()) else {
        return false;
    };
    let Some(value_type) = ValueType::for_kind(response.field_type) else {
        tracing::debug!(
            field_id = %response.id,
            kind = response.field_type.as_str(),
            "field kind cannot be used as a logic source"
        );
        return false;
    };
    if !value_type.supports(condition.state) {
        tracing::debug!(
            field_id = %response.id,
            state = ?condition.state,
            "condition state not applicable to source field"
        );
        return false;
    }

    match value_type {
        ValueType::SingleSelect => {
            let Some(selected) = single_selection(response.field_type, answer) else {
                return false;
            };
            compare_single(condition.state, &selected, &condition.value)
        }
        ValueType::MultiSelect => {
            let selected = multi_selection(answer);
            compare_multi(condition.state, &selected, &condition.value)
        }
        ValueType::Number => {
            let Some(number) = answer.as_text().and_then(|text| text.trim().parse::<f64>().ok())
            else {
                return false;
            };
            compare_number(condition.state, number, &condition.value)
        }
    }
}

fn single_selection(kind: FieldKind, answer: &Answer) -> Option<String> {
    let text = answer.as_text()?;
    if kind == FieldKind::Radio && text.starts_with(OTHERS_PREFIX) {
        return Some(OTHERS_OPTION.to_string());
    }
    Some(text.to_string())
}

fn multi_selection(answer: &Answer) -> BTreeSet<String> {
    let items: Vec<&str> = match answer {
        Answer::Text(text) => vec![text.as_str()],
        Answer::List(items) => items.iter().map(String::as_str).collect(),
        Answer::Table(_) => Vec::new(),
    };
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| {
            if item.starts_with(OTHERS_PREFIX) {
                OTHERS_OPTION.to_string()
            } else {
                item.to_string()
            }
        })
        .collect()
}

fn compare_single(state: ConditionState, selected: &str, value: &ConditionValue) -> bool {
    let options = value.as_options();
    match state {
        ConditionState::Equals => options.len() == 1 && options[0] == selected,
        ConditionState::NotEquals => options.len() == 1 && options[0] != selected,
        ConditionState::IsEither => options.iter().any(|option| option == selected),
        ConditionState::IsNotEither => !options.iter().any(|option| option == selected),
        _ => false,
    }
}

fn compare_multi(state: ConditionState, selected: &BTreeSet<String>, value: &ConditionValue) -> bool {
    let options: BTreeSet<String> = value.as_options().into_iter().collect();
    match state {
        ConditionState::IsEither => !selected.is_disjoint(&options),
        ConditionState::IsNotEither => selected.is_disjoint(&options),
        ConditionState::Equals => *selected == options,
        ConditionState::NotEquals => *selected != options,
        _ => false,
    }
}

fn compare_number(state: ConditionState, number: f64, value: &ConditionValue) -> bool {
    if state.is_membership() {
        let matches = value
            .as_options()
            .iter()
            .filter_map(|option| option.trim().parse::<f64>().ok())
            .any(|option| option == number);
        return (state == ConditionState::IsEither) == matches;
    }
    let Some(target) = value.as_number() else {
        return false;
    };
    match state {
        ConditionState::Equals => number == target,
        ConditionState::NotEquals => number != target,
        ConditionState::LessThan => number < target,
        ConditionState::MoreThan => number > target,
        ConditionState::LessThanOrEqual => number <= target,
        ConditionState::MoreThanOrEqual => number >= target,
        ConditionState::IsEither | ConditionState::IsNotEither => false,
    }
}
