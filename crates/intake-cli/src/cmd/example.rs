use anyhow::Result;
use clap::Args;

use intake_spec::example_record;

#[derive(Args, Debug)]
pub struct ExampleArgs {
    /// Built-in form name or path to a form definition JSON file
    #[arg(long = "form", value_name = "FORM")]
    pub form: String,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ExampleArgs) -> Result<()> {
    let form = super::load_form(&args.form)?;
    let record = example_record(&form);
    super::emit(&serde_json::to_value(&record)?, args.pretty)
}
