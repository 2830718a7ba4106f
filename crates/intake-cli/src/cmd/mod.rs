pub mod aggregate;
pub mod check;
pub mod example;
pub mod schema;
pub mod validate;

use anyhow::{Context, Result};
use serde_json::Value;

use intake_spec::{FormSpec, forms};

/// Resolves a `--form` argument: the name of a built-in definition, or a
/// path to a form definition JSON file. The definition is compiled before
/// it is returned, so a malformed file fails here.
pub fn load_form(source: &str) -> Result<FormSpec> {
    let form = match source {
        "family-retreat" => forms::family_retreat(),
        "youth-conference" => forms::youth_conference(),
        path => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading form definition {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing form definition {path}"))?
        }
    };
    form.compile()?;
    Ok(form)
}

pub fn emit(value: &Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{value}");
    }
    Ok(())
}
