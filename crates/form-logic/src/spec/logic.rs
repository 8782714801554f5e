use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Comparison applied by a single logic condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionState {
    Equals,
    NotEquals,
    IsEither,
    IsNotEither,
    LessThan,
    MoreThan,
    LessThanOrEqual,
    MoreThanOrEqual,
}

impl ConditionState {
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ConditionState::LessThan
                | ConditionState::MoreThan
                | ConditionState::LessThanOrEqual
                | ConditionState::MoreThanOrEqual
        )
    }

    pub fn is_membership(self) -> bool {
        matches!(self, ConditionState::IsEither | ConditionState::IsNotEither)
    }
}

/// Comparand of a condition. The expected shape depends on the source field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl ConditionValue {
    /// Reads the comparand as a number, parsing text if necessary.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ConditionValue::Number(value) => Some(*value),
            ConditionValue::Text(text) => text.trim().parse().ok(),
            ConditionValue::List(_) => None,
        }
    }

    /// Reads the comparand as a set of options. Scalars become a single entry.
    pub fn as_options(&self) -> Vec<String> {
        match self {
            ConditionValue::Number(value) => vec![value.to_string()],
            ConditionValue::Text(text) => vec![text.clone()],
            ConditionValue::List(items) => items.clone(),
        }
    }
}

/// One clause of a logic rule, referencing its source field by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub field: String,
    pub state: ConditionState,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, state: ConditionState, value: ConditionValue) -> Self {
        Self {
            field: field.into(),
            state,
            value,
        }
    }
}

/// What a logic rule does once all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogicKind {
    ShowFields {
        show: Vec<String>,
    },
    PreventSubmit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

/// Conditional rule attached to a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LogicRule {
    pub id: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub kind: LogicKind,
}

impl LogicRule {
    pub fn show_fields<I, S>(id: impl Into<String>, conditions: Vec<Condition>, show: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            conditions,
            kind: LogicKind::ShowFields {
                show: show.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn prevent_submit(
        id: impl Into<String>,
        conditions: Vec<Condition>,
        message: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            conditions,
            kind: LogicKind::PreventSubmit { message },
        }
    }

    /// Targets revealed by this rule, empty for prevent-submit rules.
    pub fn show_targets(&self) -> &[String] {
        match &self.kind {
            LogicKind::ShowFields { show } => show,
            LogicKind::PreventSubmit { .. } => &[],
        }
    }

    pub fn is_prevent_submit(&self) -> bool {
        matches!(self.kind, LogicKind::PreventSubmit { .. })
    }
}
