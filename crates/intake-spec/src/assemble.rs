use std::collections::BTreeMap;

use serde_json::Map;
use thiserror::Error;

use crate::dependency;
use crate::record::SubmissionRecord;
use crate::spec::form::FormSpec;
use crate::state::StepState;
use crate::validate::{ValidationResult, validate_step};

/// Reasons assembly refuses to produce a record. A partial record is never
/// emitted.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("form '{form}' expects {expected} steps, got {got}")]
    StepCount {
        form: String,
        expected: usize,
        got: usize,
    },
    #[error("step '{step}' has unresolved validation errors")]
    StepInvalid {
        step: String,
        result: ValidationResult,
    },
}

/// Merges every step's values and live sub-record entries into one
/// submission record.
///
/// Each step is re-validated against the accumulated context first, so a
/// caller that skipped the wizard's final `advance` cannot smuggle an
/// incomplete step into a record.
pub fn assemble(form: &FormSpec, steps: &[StepState]) -> Result<SubmissionRecord, AssembleError> {
    if steps.len() != form.steps.len() {
        return Err(AssembleError::StepCount {
            form: form.id.clone(),
            expected: form.steps.len(),
            got: steps.len(),
        });
    }

    let mut accumulated = Map::new();
    for (spec, state) in form.steps.iter().zip(steps) {
        let result = validate_step(form, spec, state, &accumulated);
        if !result.valid {
            return Err(AssembleError::StepInvalid {
                step: spec.id.clone(),
                result,
            });
        }
        for (key, value) in &state.values {
            accumulated.insert(key.clone(), value.clone());
        }
    }

    // Values of fields whose dependency lapsed never reach the record.
    let (values, _) = dependency::clear_inactive(form, &accumulated);

    let mut sub_records = BTreeMap::new();
    for (spec, state) in form.steps.iter().zip(steps) {
        for schema in &spec.sub_records {
            let entries: Vec<Map<_, _>> = state
                .entries(&schema.id)
                .iter()
                .map(|entry| entry.values.clone())
                .collect();
            sub_records.insert(schema.id.clone(), entries);
        }
    }

    Ok(SubmissionRecord {
        id: None,
        created_at: None,
        form_id: form.id.clone(),
        form_version: form.version.clone(),
        values,
        sub_records,
    })
}
