use std::collections::HashSet;

use crate::catalog::FieldCatalog;
use crate::error::EngineError;
use crate::response::{RawResponse, ReconciledResponse};

/// Matches raw responses one-to-one against the data fields of the form.
///
/// Non-data kinds are dropped on both sides, repeated ids keep their first
/// occurrence and ids unknown to the form are ignored. Any data field left
/// without a response fails the whole submission.
pub fn reconcile(
    catalog: &FieldCatalog<'_>,
    responses: Vec<RawResponse>,
) -> Result<Vec<ReconciledResponse>, EngineError> {
    let mut seen = HashSet::with_capacity(responses.len());
    let mut reconciled = Vec::with_capacity(catalog.data_field_count());

    for response in responses {
        if response.field_type.is_some_and(|kind| !kind.is_data()) {
            continue;
        }
        if !seen.insert(response.id.clone()) {
            tracing::debug!(field_id = %response.id, "duplicate response dropped");
            continue;
        }
        match catalog.get(&response.id) {
            Some(field) if field.kind.is_data() => {
                reconciled.push(ReconciledResponse::from_raw(response, field));
            }
            Some(_) => {}
            None => {
                tracing::debug!(field_id = %response.id, "response for unknown field dropped");
            }
        }
    }

    if reconciled.len() < catalog.data_field_count() {
        let answered: HashSet<&str> = reconciled.iter().map(|r| r.id.as_str()).collect();
        let missing = catalog
            .data_fields()
            .filter(|field| !answered.contains(field.id.as_str()))
            .map(|field| field.id.clone())
            .collect();
        return Err(EngineError::FieldMismatch { missing });
    }

    Ok(reconciled)
}
