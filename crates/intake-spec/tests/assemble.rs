use serde_json::{Value, json};

use intake_spec::forms::family_retreat;
use intake_spec::{AssembleError, StepState, SubRecord, assemble};

fn state(entries: &[(&str, Value)]) -> StepState {
    let mut state = StepState::default();
    for (key, value) in entries {
        state = state.with_value(key, value.clone());
    }
    state
}

fn contact_step() -> StepState {
    state(&[
        ("full_name", json!("Jane Okafor")),
        ("email", json!("jane@example.org")),
        ("phone", json!("5550104455")),
        ("age", json!(34)),
        ("gender", json!("female")),
        ("country", json!("usa")),
    ])
}

fn logistics_step() -> StepState {
    state(&[
        ("needs_transportation", json!(true)),
        ("transportation_method", json!("church_bus")),
        ("payment_option", json!("online")),
        ("financial_aid", json!(false)),
        ("previously_attended", json!(true)),
        ("dietary_restrictions", json!(["vegetarian"])),
    ])
}

fn children_step() -> StepState {
    let mut step = state(&[
        ("has_children", json!(true)),
        ("total_children", json!(2)),
        ("num_nursery", json!(1)),
        ("num_vbs", json!(1)),
    ]);
    step.sub_records.insert(
        "nursery_children".into(),
        vec![SubRecord {
            index: 1,
            values: [
                ("name".to_string(), json!("Abigail")),
                ("age".to_string(), json!(2)),
            ]
            .into_iter()
            .collect(),
        }],
    );
    step.sub_records.insert(
        "vbs_children".into(),
        vec![SubRecord {
            index: 1,
            values: [
                ("name".to_string(), json!("Caleb")),
                ("age".to_string(), json!(7)),
                ("shirt_size".to_string(), json!("s")),
            ]
            .into_iter()
            .collect(),
        }],
    );
    step
}

#[test]
fn merges_all_steps_into_one_record() {
    let form = family_retreat();
    let record = assemble(&form, &[contact_step(), logistics_step(), children_step()])
        .expect("assembly should succeed");

    assert_eq!(record.form_id, "family-retreat");
    assert_eq!(record.form_version, form.version);
    assert!(record.id.is_none());
    assert!(record.created_at.is_none());
    assert_eq!(record.values["full_name"], json!("Jane Okafor"));
    assert_eq!(record.values["num_vbs"], json!(1));
    assert_eq!(record.sub_records["nursery_children"].len(), 1);
    assert_eq!(record.sub_records["vbs_children"][0]["name"], json!("Caleb"));
}

#[test]
fn lapsed_dependent_values_are_stripped_from_the_record() {
    let form = family_retreat();
    // Chaperone entered while age was provisional, then age raised to 34.
    let mut contact = contact_step();
    contact = contact.with_value("chaperone_name", json!("Uncle Dan"));

    let record = assemble(&form, &[contact, logistics_step(), children_step()])
        .expect("assembly should succeed");
    assert!(!record.values.contains_key("chaperone_name"));
}

#[test]
fn invalid_step_blocks_assembly() {
    let form = family_retreat();
    let mut broken = contact_step();
    broken.values.remove("email");

    let error = assemble(&form, &[broken, logistics_step(), children_step()])
        .expect_err("assembly must refuse a partial record");
    match error {
        AssembleError::StepInvalid { step, result } => {
            assert_eq!(step, "contact");
            assert!(result.has_error_on("email"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn step_count_mismatch_is_rejected() {
    let form = family_retreat();
    let error = assemble(&form, &[contact_step()]).expect_err("two steps are missing");
    match error {
        AssembleError::StepCount { expected, got, .. } => {
            assert_eq!(expected, 3);
            assert_eq!(got, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn record_round_trips_through_cbor_and_json() {
    let form = family_retreat();
    let record = assemble(&form, &[contact_step(), logistics_step(), children_step()])
        .expect("assembly should succeed");

    let bytes = record.to_cbor().expect("cbor encoding");
    assert!(!bytes.is_empty());

    let json = record.to_json_pretty().expect("json encoding");
    let parsed: intake_spec::SubmissionRecord = serde_json::from_str(&json).expect("json decoding");
    assert_eq!(parsed, record);
}
