pub mod field;
pub mod form;
pub mod logic;

pub use field::{
    ColumnKind, DateRuleKind, DateValidation, DecimalValidation, FieldDefinition, FieldKind,
    LengthRule, LengthRuleKind, NumberValidation, SelectionLimits, TableColumn,
};
pub use form::FormDefinition;
pub use logic::{Condition, ConditionState, ConditionValue, LogicKind, LogicRule};
