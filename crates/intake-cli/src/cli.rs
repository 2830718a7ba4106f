use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::cmd::{
    self, aggregate::AggregateArgs, check::CheckArgs, example::ExampleArgs, schema::SchemaArgs,
    validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "intake",
    about = "Toolkit for the event registration intake forms",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a form definition and report its shape
    Check(CheckArgs),
    /// Validate a submission record against its form
    Validate(ValidateArgs),
    /// Emit the record JSON schema for a form
    Schema(SchemaArgs),
    /// Emit a filled example record for a form
    Example(ExampleArgs),
    /// Aggregate a batch of records into a dashboard snapshot
    Aggregate(AggregateArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => cmd::check::run(args),
        Commands::Validate(args) => cmd::validate::run(args),
        Commands::Schema(args) => cmd::schema::run(args),
        Commands::Example(args) => cmd::example::run(args),
        Commands::Aggregate(args) => cmd::aggregate::run(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_check_command() {
        let cli = Cli::try_parse_from(["intake", "check", "--form", "family-retreat"])
            .expect("expected CLI to parse");
        match cli.command {
            Commands::Check(args) => assert_eq!(args.form, "family-retreat"),
            _ => panic!("expected check args"),
        }
    }

    #[test]
    fn parses_aggregate_command() {
        let cli = Cli::try_parse_from([
            "intake",
            "aggregate",
            "--form",
            "youth-conference",
            "--pretty",
            "records.json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Aggregate(args) => {
                assert_eq!(args.form, "youth-conference");
                assert!(args.pretty);
                assert_eq!(args.records, std::path::PathBuf::from("records.json"));
                assert!(args.plan.is_none());
            }
            _ => panic!("expected aggregate args"),
        }
    }

    #[test]
    fn parses_validate_command() {
        let cli = Cli::try_parse_from([
            "intake",
            "validate",
            "--form",
            "family-retreat",
            "record.json",
        ])
        .expect("expected CLI to parse");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.record, std::path::PathBuf::from("record.json"));
            }
            _ => panic!("expected validate args"),
        }
    }
}
