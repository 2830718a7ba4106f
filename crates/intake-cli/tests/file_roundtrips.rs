use std::fs;
use std::path::PathBuf;

use intake_cli::cmd::aggregate::{AggregateArgs, run as run_aggregate};
use intake_cli::cmd::check::{CheckArgs, run as run_check};
use intake_cli::cmd::validate::{ValidateArgs, run as run_validate};
use intake_cli::cmd::load_form;
use intake_spec::example_record;
use intake_spec::forms::{family_retreat, youth_conference};

fn write_json(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn check_accepts_the_built_in_forms() {
    run_check(CheckArgs {
        form: "family-retreat".into(),
    })
    .expect("family retreat checks");
    run_check(CheckArgs {
        form: "youth-conference".into(),
    })
    .expect("youth conference checks");
}

#[test]
fn load_form_rejects_a_missing_file() {
    assert!(load_form("no/such/definition.json").is_err());
}

#[test]
fn the_example_records_validate_against_their_own_forms() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    for (name, form) in [
        ("family-retreat", family_retreat()),
        ("youth-conference", youth_conference()),
    ] {
        let record = example_record(&form);
        let path = write_json(
            &dir,
            &format!("{name}.json"),
            &serde_json::to_string(&record).expect("encode record"),
        );

        run_validate(ValidateArgs {
            form: name.into(),
            record: path,
            pretty: false,
        })
        .unwrap_or_else(|error| panic!("{name} example should validate: {error}"));
    }
}

#[test]
fn a_record_with_a_bad_email_fails_validation() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let mut record = example_record(&family_retreat());
    record
        .values
        .insert("email".into(), serde_json::json!("not-an-address"));
    let path = write_json(
        &dir,
        "record.json",
        &serde_json::to_string(&record).expect("encode record"),
    );

    let error = run_validate(ValidateArgs {
        form: "family-retreat".into(),
        record: path,
        pretty: false,
    })
    .expect_err("bad email must fail");
    assert!(error.to_string().contains("does not validate"));
}

#[test]
fn aggregate_reads_a_record_batch_from_disk() {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let batch = vec![
        example_record(&family_retreat()),
        example_record(&family_retreat()),
    ];
    let path = write_json(
        &dir,
        "records.json",
        &serde_json::to_string(&batch).expect("encode batch"),
    );

    run_aggregate(AggregateArgs {
        form: "family-retreat".into(),
        records: path,
        plan: None,
        pretty: true,
    })
    .expect("aggregation runs");
}
