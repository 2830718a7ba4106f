use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use intake_analytics::{AggregationPlan, aggregate};
use intake_spec::SubmissionRecord;

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Built-in form name or form definition file; the dashboard plan is
    /// derived from it
    #[arg(long = "form", value_name = "FORM")]
    pub form: String,
    /// Path to a JSON array of submission records
    #[arg(value_name = "RECORDS")]
    pub records: PathBuf,
    /// Aggregation plan JSON file overriding the derived plan
    #[arg(long = "plan", value_name = "PLAN")]
    pub plan: Option<PathBuf>,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: AggregateArgs) -> Result<()> {
    let form = super::load_form(&args.form)?;
    let plan = match &args.plan {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading plan {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing plan {}", path.display()))?
        }
        None => AggregationPlan::from_form(&form),
    };

    let raw = std::fs::read_to_string(&args.records)
        .with_context(|| format!("reading records {}", args.records.display()))?;
    let records: Vec<SubmissionRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing records {}", args.records.display()))?;

    info!(form = %form.id, records = records.len(), "aggregating batch");
    let snapshot = aggregate(&plan, &records);
    super::emit(&serde_json::to_value(&snapshot)?, args.pretty)
}
