use std::collections::{HashMap, HashSet};

use crate::error::InternalError;
use crate::spec::field::FieldDefinition;
use crate::spec::form::FormDefinition;

/// Id lookup over a form's fields, preserving form order for iteration.
#[derive(Debug, Clone)]
pub struct FieldCatalog<'a> {
    by_id: HashMap<&'a str, &'a FieldDefinition>,
    ordered: Vec<&'a FieldDefinition>,
    duplicates: HashSet<&'a str>,
}

impl<'a> FieldCatalog<'a> {
    /// Indexes the form's fields. The first definition of a repeated id wins
    /// for lookup; the id is also recorded as ambiguous.
    pub fn build(form: &'a FormDefinition) -> Result<Self, InternalError> {
        let fields = form
            .fields
            .as_ref()
            .ok_or_else(|| InternalError::MalformedForm {
                form_id: form.id.clone(),
            })?;

        let mut by_id = HashMap::with_capacity(fields.len());
        let mut ordered = Vec::with_capacity(fields.len());
        let mut duplicates = HashSet::new();
        for field in fields {
            if by_id.contains_key(field.id.as_str()) {
                tracing::warn!(form_id = %form.id, field_id = %field.id, "duplicate field id");
                duplicates.insert(field.id.as_str());
                continue;
            }
            by_id.insert(field.id.as_str(), field);
            ordered.push(field);
        }

        Ok(Self {
            by_id,
            ordered,
            duplicates,
        })
    }

    pub fn get(&self, id: &str) -> Option<&'a FieldDefinition> {
        self.by_id.get(id).copied()
    }

    /// Whether more than one field definition shares `id`.
    pub fn is_ambiguous(&self, id: &str) -> bool {
        self.duplicates.contains(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Whether `id` names a field that carries an answer.
    pub fn is_data_field(&self, id: &str) -> bool {
        self.get(id).is_some_and(|field| field.kind.is_data())
    }

    /// Answer-bearing fields in form order.
    pub fn data_fields(&self) -> impl Iterator<Item = &'a FieldDefinition> + '_ {
        self.ordered.iter().copied().filter(|field| field.kind.is_data())
    }

    pub fn data_field_count(&self) -> usize {
        self.data_fields().count()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
