use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Built-in form name or path to a form definition JSON file
    #[arg(long = "form", value_name = "FORM")]
    pub form: String,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let form = super::load_form(&args.form)?;
    println!(
        "{} v{}: {} steps, {} fields, {} sub-record blocks, {} count rules",
        form.id,
        form.version,
        form.steps.len(),
        form.fields().count(),
        form.sub_record_schemas().count(),
        form.validations.len(),
    );
    Ok(())
}
