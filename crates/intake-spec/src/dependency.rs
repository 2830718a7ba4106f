use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::spec::form::FormSpec;

/// Which fields are currently visible and required for a value snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActiveFields {
    pub visible: BTreeSet<String>,
    pub required: BTreeSet<String>,
}

impl ActiveFields {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.required.contains(id)
    }
}

/// Re-evaluates visibility and requiredness for every top-level field.
///
/// A field without a dependency is always visible and keeps its declared
/// requiredness. A field with a dependency is visible exactly when its
/// predicate holds against the dependee's current value, and a triggered
/// dependency both reveals and requires the field. A hidden field is never
/// required. Each rule reads a single dependee, so one pass over the fields
/// suffices.
pub fn evaluate(form: &FormSpec, values: &Map<String, Value>) -> ActiveFields {
    let mut active = ActiveFields::default();

    for field in form.fields() {
        let (visible, required) = match &field.depends_on {
            None => (true, field.required),
            Some(rule) => {
                let triggered = rule.predicate.matches(values.get(&rule.field));
                (triggered, triggered)
            }
        };
        if visible {
            active.visible.insert(field.id.clone());
        }
        if required {
            active.required.insert(field.id.clone());
        }
    }

    active
}

/// Drops stored values for fields whose dependency no longer holds and
/// returns the cleaned map plus the ids that were cleared, so callers can
/// also discard any validation markers on them.
///
/// Clearing one value can deactivate further dependents (a count field
/// hidden by "has children = no" in turn empties its sub-record block), so
/// the pass iterates to a fixpoint.
pub fn clear_inactive(form: &FormSpec, values: &Map<String, Value>) -> (Map<String, Value>, Vec<String>) {
    let mut cleaned = values.clone();
    let mut cleared = Vec::new();

    loop {
        let active = evaluate(form, &cleaned);
        let stale: Vec<String> = form
            .fields()
            .filter(|field| !active.is_visible(&field.id) && cleaned.contains_key(&field.id))
            .map(|field| field.id.clone())
            .collect();
        if stale.is_empty() {
            break;
        }
        for id in stale {
            cleaned.remove(&id);
            cleared.push(id);
        }
    }

    (cleaned, cleared)
}
