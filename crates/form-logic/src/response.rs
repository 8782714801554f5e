use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::field::{FieldDefinition, FieldKind};

/// Signatures issued by the OTP verification step, keyed by field id.
pub type SignatureMap = HashMap<String, String>;

/// Prefix used by radio and checkbox answers for the free-text "others" option.
pub const OTHERS_PREFIX: &str = "Others: ";
/// Option label that an "others" answer is compared as in logic conditions.
pub const OTHERS_OPTION: &str = "Others";

/// Submitted answer. Checkbox answers are lists, table answers are rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    List(Vec<String>),
    Table(Vec<Vec<String>>),
}

impl Answer {
    pub fn is_empty(&self) -> bool {
        match self {
            Answer::Text(text) => text.trim().is_empty(),
            Answer::List(items) => items.iter().all(|item| item.trim().is_empty()),
            Answer::Table(rows) => rows
                .iter()
                .all(|row| row.iter().all(|cell| cell.trim().is_empty())),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serialized form used when a table answer is compared as a string.
    pub fn to_display(&self) -> String {
        match self {
            Answer::Text(text) => text.clone(),
            Answer::List(items) => items.join(", "),
            Answer::Table(rows) => serde_json::to_string(rows).unwrap_or_default(),
        }
    }
}

/// Uploaded file accompanying an attachment answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttachmentPayload {
    pub filename: String,
    #[serde(with = "base64_bytes")]
    #[schemars(with = "String")]
    pub content: Vec<u8>,
}

/// Response as received from the respondent's client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentPayload>,
    /// Client-side claim only; the engine recomputes verification itself.
    #[serde(default)]
    pub is_user_verified: bool,
}

impl RawResponse {
    pub fn text(id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type: None,
            answer: Some(Answer::Text(answer.into())),
            attachment: None,
            is_user_verified: false,
        }
    }

    pub fn list<I, S>(id: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answer: Some(Answer::List(items.into_iter().map(Into::into).collect())),
            ..Self::text(id, "")
        }
    }

    pub fn table(id: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            answer: Some(Answer::Table(rows)),
            ..Self::text(id, "")
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            answer: None,
            ..Self::text(id, "")
        }
    }

    pub fn with_field_type(mut self, kind: FieldKind) -> Self {
        self.field_type = Some(kind);
        self
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, content: Vec<u8>) -> Self {
        self.attachment = Some(AttachmentPayload {
            filename: filename.into(),
            content,
        });
        self
    }
}

/// Response matched one-to-one against a data field of the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReconciledResponse {
    pub id: String,
    pub field_type: FieldKind,
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentPayload>,
    pub is_visible: bool,
    pub is_user_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub myinfo_attr: Option<String>,
    #[serde(skip)]
    pub declared_type: Option<FieldKind>,
}

impl ReconciledResponse {
    pub fn from_raw(raw: RawResponse, field: &FieldDefinition) -> Self {
        Self {
            id: raw.id,
            field_type: field.kind,
            question: field.title.clone(),
            answer: raw.answer,
            attachment: raw.attachment,
            is_visible: true,
            is_user_verified: false,
            myinfo_attr: field.myinfo_attr.clone(),
            declared_type: raw.field_type,
        }
    }

    pub fn has_answer(&self) -> bool {
        self.answer.as_ref().is_some_and(|answer| !answer.is_empty())
    }

    pub fn text(&self) -> Option<&str> {
        self.answer.as_ref().and_then(Answer::as_text)
    }
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
