use std::collections::HashSet;

use crate::condition::{LogicContext, VisibleFields};
use crate::error::InternalError;
use crate::response::ReconciledResponse;
use crate::spec::form::FormDefinition;
use crate::spec::logic::LogicRule;

/// Result of the visibility fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityOutcome {
    pub visible: VisibleFields,
    /// Visible set before the first pass and after every pass.
    pub snapshots: Vec<VisibleFields>,
}

impl VisibilityOutcome {
    pub fn passes(&self) -> usize {
        self.snapshots.len().saturating_sub(1)
    }
}

/// Computes the visible fields of a submission.
pub fn compute_visibility(
    form: &FormDefinition,
    responses: &[ReconciledResponse],
) -> Result<VisibleFields, InternalError> {
    evaluate_visibility(form, responses).map(|outcome| outcome.visible)
}

/// Runs show-field rules to a fixed point.
///
/// Fields targeted by at least one usable rule start hidden, everything else
/// starts visible. Each pass reveals the targets of newly satisfied rules
/// until a pass reveals nothing. Rules whose conditions reference fields
/// missing from the responses are ignored entirely.
pub fn evaluate_visibility(
    form: &FormDefinition,
    responses: &[ReconciledResponse],
) -> Result<VisibilityOutcome, InternalError> {
    let ctx = LogicContext::new(responses);

    let rules: Vec<&LogicRule> = form
        .show_rules()
        .filter(|rule| {
            let resolves = ctx.resolves(rule);
            if !resolves {
                tracing::warn!(
                    form_id = %form.id,
                    rule_id = %rule.id,
                    "logic rule references a missing field and is ignored"
                );
            }
            resolves
        })
        .collect();

    let governed: HashSet<&str> = rules
        .iter()
        .flat_map(|rule| rule.show_targets())
        .map(String::as_str)
        .filter(|target| ctx.response(target).is_some())
        .collect();

    let mut visible: VisibleFields = responses
        .iter()
        .map(|response| response.id.as_str())
        .filter(|id| !governed.contains(id))
        .map(str::to_string)
        .collect();
    let mut snapshots = vec![visible.clone()];

    let mut pending: Vec<&LogicRule> = rules
        .iter()
        .copied()
        .filter(|rule| !rule.conditions.is_empty())
        .collect();
    let cap = rules.len() + 1;

    loop {
        if snapshots.len() > cap {
            tracing::error!(form_id = %form.id, passes = cap, "visibility did not converge");
            return Err(InternalError::VisibilityDidNotConverge { passes: cap });
        }

        let before = visible.clone();
        let mut changed = false;
        pending.retain(|rule| {
            if !ctx.is_satisfied(rule, &before) {
                return true;
            }
            for target in rule.show_targets() {
                if governed.contains(target.as_str()) {
                    changed |= visible.insert(target.clone());
                }
            }
            false
        });
        snapshots.push(visible.clone());

        if !changed {
            break;
        }
    }

    tracing::debug!(
        form_id = %form.id,
        visible = visible.len(),
        passes = snapshots.len() - 1,
        "visibility resolved"
    );
    Ok(VisibilityOutcome { visible, snapshots })
}

/// Copies the computed visibility onto each response.
pub fn apply_visibility(responses: &mut [ReconciledResponse], visible: &VisibleFields) {
    for response in responses {
        response.is_visible = visible.contains(response.id.as_str());
    }
}
