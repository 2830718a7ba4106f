use serde_json::{Map, Value};

use crate::spec::field::{Constraint, FieldKind, FieldSpec};
use crate::spec::form::FormSpec;
use crate::spec::subrecord::SubRecordSchema;

/// Generates the JSON schema of the submission-record wire format for a
/// form. This is the contract document shared between the form side and
/// the aggregation side.
pub fn generate(form: &FormSpec) -> Value {
    let mut value_props = Map::new();
    let mut required = Vec::new();
    for field in form.fields() {
        value_props.insert(field.id.clone(), field_schema(field));
        // Dependency-gated fields are never statically required.
        if field.required && field.depends_on.is_none() {
            required.push(Value::String(field.id.clone()));
        }
    }

    let mut values_schema = Map::new();
    values_schema.insert("type".into(), Value::String("object".into()));
    values_schema.insert("properties".into(), Value::Object(value_props));
    if !required.is_empty() {
        values_schema.insert("required".into(), Value::Array(required));
    }

    let mut block_props = Map::new();
    for schema in form.sub_record_schemas() {
        block_props.insert(schema.id.clone(), block_schema(schema));
    }
    let mut blocks_schema = Map::new();
    blocks_schema.insert("type".into(), Value::String("object".into()));
    blocks_schema.insert("properties".into(), Value::Object(block_props));

    let mut properties = Map::new();
    properties.insert("id".into(), type_only("string"));
    let mut created_at = Map::new();
    created_at.insert("type".into(), Value::String("string".into()));
    created_at.insert("format".into(), Value::String("date-time".into()));
    properties.insert("created_at".into(), Value::Object(created_at));
    properties.insert("form_id".into(), type_only("string"));
    properties.insert("form_version".into(), type_only("string"));
    properties.insert("values".into(), Value::Object(values_schema));
    properties.insert("sub_records".into(), Value::Object(blocks_schema));

    let mut root = Map::new();
    root.insert("type".into(), Value::String("object".into()));
    root.insert("title".into(), Value::String(format!("{} submission", form.id)));
    root.insert("properties".into(), Value::Object(properties));
    root.insert(
        "required".into(),
        Value::Array(vec![
            Value::String("form_id".into()),
            Value::String("form_version".into()),
            Value::String("values".into()),
        ]),
    );
    Value::Object(root)
}

fn block_schema(schema: &SubRecordSchema) -> Value {
    let mut item_props = Map::new();
    let mut required_fields = Vec::new();
    for field in &schema.fields {
        item_props.insert(field.id.clone(), field_schema(field));
        if field.required {
            required_fields.push(Value::String(field.id.clone()));
        }
    }
    let mut item_schema = Map::new();
    item_schema.insert("type".into(), Value::String("object".into()));
    item_schema.insert("properties".into(), Value::Object(item_props));
    if !required_fields.is_empty() {
        item_schema.insert("required".into(), Value::Array(required_fields));
    }

    let mut out = Map::new();
    out.insert("type".into(), Value::String("array".into()));
    out.insert("maxItems".into(), Value::Number(schema.max_count.into()));
    out.insert("items".into(), Value::Object(item_schema));
    Value::Object(out)
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut schema = Map::new();
    match field.kind {
        FieldKind::Text | FieldKind::Phone => {
            schema.insert("type".into(), Value::String("string".into()));
        }
        FieldKind::Email => {
            schema.insert("type".into(), Value::String("string".into()));
            schema.insert("format".into(), Value::String("email".into()));
        }
        FieldKind::Number => {
            schema.insert("type".into(), Value::String("number".into()));
        }
        FieldKind::Boolean => {
            schema.insert("type".into(), Value::String("boolean".into()));
        }
        FieldKind::Enum => {
            schema.insert("type".into(), Value::String("string".into()));
            if let Some(choices) = &field.choices {
                schema.insert("enum".into(), choice_array(choices));
            }
        }
        FieldKind::MultiEnum => {
            schema.insert("type".into(), Value::String("array".into()));
            let mut items = Map::new();
            items.insert("type".into(), Value::String("string".into()));
            if let Some(choices) = &field.choices {
                items.insert("enum".into(), choice_array(choices));
            }
            schema.insert("items".into(), Value::Object(items));
        }
    }

    if let Some(Constraint {
        min,
        max,
        min_len,
        max_len,
        pattern,
    }) = &field.constraint
    {
        if let Some(min) = min
            && let Some(number) = number_from_f64(*min)
        {
            schema.insert("minimum".into(), number);
        }
        if let Some(max) = max
            && let Some(number) = number_from_f64(*max)
        {
            schema.insert("maximum".into(), number);
        }
        if let Some(min_len) = min_len {
            schema.insert("minLength".into(), Value::Number((*min_len).into()));
        }
        if let Some(max_len) = max_len {
            schema.insert("maxLength".into(), Value::Number((*max_len).into()));
        }
        if let Some(pattern) = pattern {
            schema.insert("pattern".into(), Value::String(pattern.clone()));
        }
    }

    if let Some(default_value) = &field.default_value {
        schema.insert("default".into(), default_value.clone());
    }

    Value::Object(schema)
}

fn choice_array(choices: &[String]) -> Value {
    Value::Array(
        choices
            .iter()
            .map(|choice| Value::String(choice.clone()))
            .collect(),
    )
}

fn type_only(kind: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String(kind.into()));
    Value::Object(schema)
}

fn number_from_f64(value: f64) -> Option<Value> {
    serde_json::Number::from_f64(value).map(Value::Number)
}
