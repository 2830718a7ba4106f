use serde_json::Value;

use intake_spec::forms::{family_retreat, youth_conference};
use intake_spec::{
    DependencyRule, FieldKind, FieldSpec, FormSpec, Predicate, SchemaError, StepSpec,
    SubRecordSchema, column_order, record_schema,
};

fn bare_field(id: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind,
        label: id.into(),
        required: false,
        depends_on: None,
        choices: None,
        constraint: None,
        default_value: None,
    }
}

fn single_step_form(fields: Vec<FieldSpec>, sub_records: Vec<SubRecordSchema>) -> FormSpec {
    FormSpec {
        id: "test".into(),
        title: "Test".into(),
        version: "1.0.0".into(),
        description: None,
        steps: vec![StepSpec {
            id: "only".into(),
            title: "Only".into(),
            fields,
            sub_records,
        }],
        validations: vec![],
    }
}

#[test]
fn reversed_count_bounds_are_fatal_at_construction() {
    let form = single_step_form(
        vec![bare_field("count", FieldKind::Number)],
        vec![SubRecordSchema {
            id: "entries".into(),
            count_field: "count".into(),
            min_count: 3,
            max_count: 1,
            fields: vec![bare_field("name", FieldKind::Text)],
        }],
    );

    let error = form.compile().expect_err("min above max must be rejected");
    assert!(matches!(error, SchemaError::CountBoundsReversed { .. }));
}

#[test]
fn unknown_dependee_is_fatal_at_construction() {
    let mut field = bare_field("dependent", FieldKind::Text);
    field.depends_on = Some(DependencyRule {
        field: "missing".into(),
        predicate: Predicate::IsSet,
    });

    let error = single_step_form(vec![field], vec![])
        .compile()
        .expect_err("unknown dependee must be rejected");
    assert!(matches!(error, SchemaError::UnknownDependee { .. }));
}

#[test]
fn enum_without_choices_is_fatal_at_construction() {
    let error = single_step_form(vec![bare_field("pick", FieldKind::Enum)], vec![])
        .compile()
        .expect_err("choiceless enum must be rejected");
    assert!(matches!(error, SchemaError::EnumWithoutChoices(_)));
}

#[test]
fn count_field_must_be_numeric() {
    let form = single_step_form(
        vec![bare_field("count", FieldKind::Text)],
        vec![SubRecordSchema {
            id: "entries".into(),
            count_field: "count".into(),
            min_count: 0,
            max_count: 2,
            fields: vec![bare_field("name", FieldKind::Text)],
        }],
    );

    let error = form.compile().expect_err("text count field must be rejected");
    assert!(matches!(error, SchemaError::CountFieldNotNumeric { .. }));
}

#[test]
fn duplicate_field_ids_are_fatal_at_construction() {
    let form = single_step_form(
        vec![
            bare_field("name", FieldKind::Text),
            bare_field("name", FieldKind::Text),
        ],
        vec![],
    );
    let error = form.compile().expect_err("duplicate id must be rejected");
    assert!(matches!(error, SchemaError::DuplicateField(_)));
}

#[test]
fn record_schema_documents_the_wire_format() {
    let form = family_retreat();
    let schema = record_schema(&form);

    let values = schema["properties"]["values"].as_object().expect("values schema");
    let props = values["properties"].as_object().expect("value properties");
    assert!(props.contains_key("full_name"));
    assert!(props.contains_key("chaperone_name"));
    assert_eq!(props["email"]["format"], Value::String("email".into()));
    assert_eq!(props["age"]["maximum"].as_f64(), Some(120.0));

    // Conditionally required fields never appear statically required.
    let required = values["required"].as_array().expect("required list");
    assert!(required.iter().any(|value| value == "full_name"));
    assert!(!required.iter().any(|value| value == "chaperone_name"));

    let nursery = &schema["properties"]["sub_records"]["properties"]["nursery_children"];
    assert_eq!(nursery["maxItems"].as_u64(), Some(6));
    assert!(nursery["items"]["properties"].as_object().expect("items").contains_key("age"));
}

#[test]
fn export_columns_are_stable_and_exhaustive() {
    let form = family_retreat();
    let columns = column_order(&form);

    assert_eq!(&columns[..2], &["id".to_string(), "created_at".to_string()]);
    let full_name = columns.iter().position(|c| c == "full_name").expect("full_name column");
    let email = columns.iter().position(|c| c == "email").expect("email column");
    assert!(full_name < email, "declaration order must be preserved");

    assert!(columns.contains(&"nursery_children.1.name".to_string()));
    assert!(columns.contains(&"nursery_children.6.age".to_string()));
    assert!(!columns.contains(&"nursery_children.7.name".to_string()));
}

#[test]
fn form_specs_serialize_round_trip() {
    for form in [family_retreat(), youth_conference()] {
        let encoded = serde_json::to_string(&form).expect("form encodes");
        let decoded: FormSpec = serde_json::from_str(&encoded).expect("form decodes");
        assert_eq!(decoded, form);
    }
}
