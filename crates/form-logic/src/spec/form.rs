use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::FieldDefinition;
use crate::spec::logic::LogicRule;

/// Resolved form definition handed over by the form store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `None` marks a malformed form rather than an empty one.
    #[serde(default)]
    pub fields: Option<Vec<FieldDefinition>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logic: Vec<LogicRule>,
}

impl FormDefinition {
    pub fn new(id: impl Into<String>, fields: Vec<FieldDefinition>, logic: Vec<LogicRule>) -> Self {
        Self {
            id: id.into(),
            title: None,
            fields: Some(fields),
            logic,
        }
    }

    /// Show-field rules in declaration order.
    pub fn show_rules(&self) -> impl Iterator<Item = &LogicRule> {
        self.logic.iter().filter(|rule| !rule.is_prevent_submit())
    }

    /// Prevent-submit rules in declaration order.
    pub fn prevent_submit_rules(&self) -> impl Iterator<Item = &LogicRule> {
        self.logic.iter().filter(|rule| rule.is_prevent_submit())
    }
}
