use chrono::Weekday;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Field kinds supported by the form builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    ShortText,
    LongText,
    Number,
    Decimal,
    Dropdown,
    Radio,
    Checkbox,
    Table,
    Date,
    Rating,
    Attachment,
    Section,
    Statement,
    Image,
    Nric,
    Mobile,
    HomeNumber,
    Email,
    YesNo,
    Uen,
}

impl FieldKind {
    /// Section headers, statements and images never carry an answer.
    pub fn is_data(self) -> bool {
        !matches!(self, FieldKind::Section | FieldKind::Statement | FieldKind::Image)
    }

    /// Label used in logs and error reports.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::ShortText => "short_text",
            FieldKind::LongText => "long_text",
            FieldKind::Number => "number",
            FieldKind::Decimal => "decimal",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Radio => "radio",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Table => "table",
            FieldKind::Date => "date",
            FieldKind::Rating => "rating",
            FieldKind::Attachment => "attachment",
            FieldKind::Section => "section",
            FieldKind::Statement => "statement",
            FieldKind::Image => "image",
            FieldKind::Nric => "nric",
            FieldKind::Mobile => "mobile",
            FieldKind::HomeNumber => "home_number",
            FieldKind::Email => "email",
            FieldKind::YesNo => "yes_no",
            FieldKind::Uen => "uen",
        }
    }
}

/// How a length bound is applied to an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LengthRuleKind {
    Exact,
    Minimum,
    Maximum,
    Range,
}

/// Character or digit count constraint. `exact` and `minimum` read `min`,
/// `maximum` reads `max`, `range` reads both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LengthRule {
    pub kind: LengthRuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

/// Constraints for `number` fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct NumberValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<LengthRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_max: Option<u64>,
}

/// Inclusive bounds for `decimal` fields.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DecimalValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Inclusive bounds on the number of checkbox selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SelectionLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    ShortText,
    Dropdown,
}

/// Column schema for `table` fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableColumn {
    pub title: String,
    pub kind: ColumnKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DateRuleKind {
    #[default]
    None,
    DisallowPast,
    DisallowFuture,
    Custom,
}

/// Date restrictions. Custom bounds are `YYYY-MM-DD` and inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct DateValidation {
    #[serde(default)]
    pub kind: DateRuleKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_min: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_max: Option<String>,
}

/// A single form field as designed by the form admin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDefinition {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: FieldKind,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub is_verifiable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub myinfo_attr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_length: Option<LengthRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_validation: Option<NumberValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimal_validation: Option<DecimalValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub others_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_limits: Option<SelectionLimits>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<TableColumn>,
    #[serde(default = "default_minimum_rows")]
    pub minimum_rows: usize,
    #[serde(default)]
    pub add_more_rows: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_validation: Option<DateValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schemars(with = "Vec<String>")]
    pub invalid_days: Vec<Weekday>,
    #[serde(default = "default_rating_steps")]
    pub rating_steps: u32,
    #[serde(default = "default_attachment_size")]
    pub attachment_max_size_mb: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_email_domains: Vec<String>,
    #[serde(default)]
    pub allow_international: bool,
}

impl FieldDefinition {
    /// Creates a field with the given kind and default constraints.
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            kind,
            required: true,
            is_verifiable: false,
            myinfo_attr: None,
            text_length: None,
            number_validation: None,
            decimal_validation: None,
            options: Vec::new(),
            others_enabled: false,
            selection_limits: None,
            columns: Vec::new(),
            minimum_rows: default_minimum_rows(),
            add_more_rows: false,
            maximum_rows: None,
            date_validation: None,
            invalid_days: Vec::new(),
            rating_steps: default_rating_steps(),
            attachment_max_size_mb: default_attachment_size(),
            allowed_extensions: Vec::new(),
            allowed_email_domains: Vec::new(),
            allow_international: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn verifiable(mut self) -> Self {
        self.is_verifiable = true;
        self
    }
}

fn default_true() -> bool {
    true
}

fn default_minimum_rows() -> usize {
    1
}

fn default_rating_steps() -> u32 {
    5
}

fn default_attachment_size() -> u32 {
    7
}
