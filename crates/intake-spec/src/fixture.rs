use serde_json::{Map, Number, Value};

use crate::record::SubmissionRecord;
use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::form::FormSpec;

/// Produces a filled example record for a form.
///
/// Dependency-gated fields are left unanswered, so the example reflects the
/// default path through the wizard (no children, no chaperone). Numeric
/// defaults are picked outside every dependency trigger range, so the
/// gated fields really do stay inactive and the example validates against
/// its own form. Used by the CLI `example` command and as seed data in
/// tests.
pub fn generate(form: &FormSpec) -> SubmissionRecord {
    let mut values = Map::new();
    for field in form.fields() {
        if field.depends_on.is_some() {
            continue;
        }
        values.insert(field.id.clone(), example_for(form, field));
    }

    let sub_records = form
        .sub_record_schemas()
        .map(|schema| (schema.id.clone(), Vec::new()))
        .collect();

    SubmissionRecord {
        id: None,
        created_at: None,
        form_id: form.id.clone(),
        form_version: form.version.clone(),
        values,
        sub_records,
    }
}

fn example_for(form: &FormSpec, field: &FieldSpec) -> Value {
    if let Some(default_value) = &field.default_value {
        return default_value.clone();
    }

    match field.kind {
        FieldKind::Text => Value::String(format!("example-{}", field.id)),
        FieldKind::Email => Value::String(format!("{}@example.org", field.id)),
        FieldKind::Phone => Value::String("555-010-1234".into()),
        FieldKind::Number => example_number(form, field),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::Enum => first_choice(field),
        FieldKind::MultiEnum => Value::Array(vec![first_choice(field)]),
    }
}

/// An in-bounds number that does not activate any field depending on this
/// one. The bound minimum can sit inside a trigger range (an age minimum
/// of 0 would require a chaperone), so the midpoint and ceiling are tried
/// first.
fn example_number(form: &FormSpec, field: &FieldSpec) -> Value {
    let floor = field
        .constraint
        .as_ref()
        .and_then(|constraint| constraint.min)
        .unwrap_or(0.0);
    let ceiling = field
        .constraint
        .as_ref()
        .and_then(|constraint| constraint.max)
        .unwrap_or(floor);
    let midpoint = (floor + ceiling) / 2.0;

    let chosen = [midpoint, ceiling, floor]
        .into_iter()
        .find(|candidate| !activates_dependent(form, &field.id, *candidate))
        .unwrap_or(floor);
    Number::from_f64(chosen)
        .map(Value::Number)
        .unwrap_or_else(|| Value::Number(Number::from(0)))
}

fn activates_dependent(form: &FormSpec, dependee: &str, candidate: f64) -> bool {
    let Some(candidate) = Number::from_f64(candidate).map(Value::Number) else {
        return true;
    };
    form.fields().any(|field| {
        field.depends_on.as_ref().is_some_and(|rule| {
            rule.field == dependee && rule.predicate.matches(Some(&candidate))
        })
    })
}

fn first_choice(field: &FieldSpec) -> Value {
    field
        .choices
        .as_ref()
        .and_then(|choices| choices.first())
        .map(|choice| Value::String(choice.clone()))
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency;
    use crate::forms::{family_retreat, youth_conference};

    #[test]
    fn example_numbers_leave_gated_fields_inactive() {
        for form in [family_retreat(), youth_conference()] {
            let record = generate(&form);
            let active = dependency::evaluate(&form, &record.values);
            assert!(
                !active.is_required("chaperone_name"),
                "{}: example age must not mark the registrant a minor",
                form.id
            );
        }
    }

    #[test]
    fn example_age_stays_within_its_bounds() {
        let form = youth_conference();
        let record = generate(&form);
        let age = record.values["age"].as_f64().expect("numeric age");
        assert!((10.0..=25.0).contains(&age));
        assert!(age >= 18.0, "the chosen age must be an adult one");
    }
}
