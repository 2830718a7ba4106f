use anyhow::Result;
use clap::Args;

use intake_spec::record_schema;

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Built-in form name or path to a form definition JSON file
    #[arg(long = "form", value_name = "FORM")]
    pub form: String,
    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    let form = super::load_form(&args.form)?;
    super::emit(&record_schema(&form), args.pretty)
}
