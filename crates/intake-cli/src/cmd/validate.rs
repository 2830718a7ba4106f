use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde_json::{Map, Value};
use tracing::debug;

use intake_spec::{FormSpec, StepState, SubRecord, SubmissionRecord, ValidationResult, validate_step};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Built-in form name or path to a form definition JSON file
    #[arg(long = "form", value_name = "FORM")]
    pub form: String,
    /// Path to a submission record JSON file
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let form = super::load_form(&args.form)?;
    let raw = std::fs::read_to_string(&args.record)
        .with_context(|| format!("reading record {}", args.record.display()))?;
    let record: SubmissionRecord = serde_json::from_str(&raw)
        .with_context(|| format!("parsing record {}", args.record.display()))?;

    let mut report = Map::new();
    let mut all_valid = true;
    for (step_id, result) in validate_record(&form, &record) {
        all_valid &= result.valid;
        report.insert(step_id, serde_json::to_value(&result)?);
    }
    super::emit(&Value::Object(report), args.pretty)?;

    if !all_valid {
        bail!("record does not validate against form '{}'", form.id);
    }
    Ok(())
}

/// Replays a flat record through the per-step validator: each step gets the
/// slice of values and sub-record entries it owns, with earlier steps as
/// context.
fn validate_record(form: &FormSpec, record: &SubmissionRecord) -> Vec<(String, ValidationResult)> {
    let mut prior = Map::new();
    let mut results = Vec::new();

    for step in &form.steps {
        let mut state = StepState::default();
        for field in &step.fields {
            if let Some(value) = record.value(&field.id) {
                state.values.insert(field.id.clone(), value.clone());
            }
        }
        for schema in &step.sub_records {
            let entries: Vec<SubRecord> = record
                .sub_records
                .get(&schema.id)
                .map(|list| {
                    list.iter()
                        .enumerate()
                        .map(|(offset, values)| SubRecord {
                            index: offset + 1,
                            values: values.clone(),
                        })
                        .collect()
                })
                .unwrap_or_default();
            state.sub_records.insert(schema.id.clone(), entries);
        }

        let result = validate_step(form, step, &state, &prior);
        debug!(step = %step.id, valid = result.valid, "step validated");
        for (key, value) in &state.values {
            prior.insert(key.clone(), value.clone());
        }
        results.push((step.id.clone(), result));
    }

    results
}
