use std::collections::BTreeMap;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dependency;
use crate::predicate::{as_number, truthiness};
use crate::spec::field::{Constraint, FieldKind, FieldSpec};
use crate::spec::form::FormSpec;
use crate::spec::step::StepSpec;
use crate::spec::validation::CountBoundRule;
use crate::state::StepState;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Per-field validation failure reported back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Result of validating one step. Expected failures are data, never errors:
/// the wizard inspects `valid` and surfaces the collected reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
}

impl ValidationResult {
    pub fn has_error_on(&self, field: &str) -> bool {
        self.missing_required.iter().any(|id| id == field)
            || self.errors.iter().any(|error| error.field == field)
    }

    /// Flattens missing-required entries and per-field errors into a
    /// field → reason map for highlighting every offending field at once.
    pub fn reasons(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for field in &self.missing_required {
            map.insert(field.clone(), "this field is required".to_string());
        }
        for error in &self.errors {
            map.entry(error.field.clone())
                .or_insert_with(|| error.message.clone());
        }
        map
    }
}

/// Validates one step's fields and sub-record entries against the currently
/// active requiredness set.
///
/// `prior_values` carries the values accumulated from earlier steps so that
/// dependencies and count rules crossing step boundaries resolve. Reporting
/// is exhaustive rather than fail-fast: every offending field is collected
/// before returning.
pub fn validate_step(
    form: &FormSpec,
    step: &StepSpec,
    state: &StepState,
    prior_values: &Map<String, Value>,
) -> ValidationResult {
    let mut context = prior_values.clone();
    for (key, value) in &state.values {
        context.insert(key.clone(), value.clone());
    }
    let active = dependency::evaluate(form, &context);

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    for field in &step.fields {
        if !active.is_visible(&field.id) {
            continue;
        }
        match state.value(&field.id) {
            None => {
                if active.is_required(&field.id) {
                    mark_unanswered(field, &field.id, &mut errors, &mut missing_required);
                }
            }
            Some(value) if is_blank(field.kind, value) => {
                if active.is_required(&field.id) {
                    mark_unanswered(field, &field.id, &mut errors, &mut missing_required);
                }
            }
            Some(value) => {
                if let Some(error) = check_value(field, value, &field.id) {
                    errors.push(error);
                }
            }
        }
    }

    for schema in &step.sub_records {
        if let Some(raw) = context.get(&schema.count_field)
            && let Some(count) = as_number(raw)
            && (count < schema.min_count as f64 || count > schema.max_count as f64)
        {
            errors.push(FieldError {
                field: schema.count_field.clone(),
                message: format!(
                    "expected between {} and {} entries, got {}",
                    schema.min_count, schema.max_count, count
                ),
                code: Some("count_bounds".into()),
            });
        }

        for entry in state.entries(&schema.id) {
            for field in &schema.fields {
                let path = format!("{}[{}].{}", schema.id, entry.index, field.id);
                match entry.values.get(&field.id) {
                    None => {
                        if field.required {
                            mark_unanswered(field, &path, &mut errors, &mut missing_required);
                        }
                    }
                    Some(value) if is_blank(field.kind, value) => {
                        if field.required {
                            mark_unanswered(field, &path, &mut errors, &mut missing_required);
                        }
                    }
                    Some(value) => {
                        if let Some(error) = check_value(field, value, &path) {
                            errors.push(error);
                        }
                    }
                }
            }
        }
    }

    for rule in &form.validations {
        if !rule_applies(step, rule) {
            continue;
        }
        if let Some(error) = check_count_rule(rule, &context) {
            errors.push(error);
        }
    }

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty(),
        errors,
        missing_required,
    }
}

/// A count rule fires on any step that declares one of its fields; parts
/// not yet answered count as zero and an unanswered total defers the check.
fn check_count_rule(rule: &CountBoundRule, context: &Map<String, Value>) -> Option<FieldError> {
    let total = context.get(&rule.total_field).and_then(as_number)?;
    let sum: f64 = rule
        .part_fields
        .iter()
        .filter_map(|id| context.get(id))
        .filter_map(as_number)
        .sum();
    if sum > total {
        return Some(FieldError {
            field: rule
                .id
                .clone()
                .unwrap_or_else(|| rule.total_field.clone()),
            message: rule.message.clone(),
            code: Some("count_exceeds_total".into()),
        });
    }
    None
}

fn rule_applies(step: &StepSpec, rule: &CountBoundRule) -> bool {
    step.fields.iter().any(|field| {
        field.id == rule.total_field || rule.part_fields.iter().any(|id| *id == field.id)
    })
}

/// Routes an unanswered required field to its report channel: multi-select
/// groups carry the "pick one or more" contract and get a coded error,
/// everything else lands in `missing_required`.
fn mark_unanswered(
    field: &FieldSpec,
    path: &str,
    errors: &mut Vec<FieldError>,
    missing_required: &mut Vec<String>,
) {
    if field.kind == FieldKind::MultiEnum {
        errors.push(field_error(path, "pick at least one option", "pick_at_least_one"));
    } else {
        missing_required.push(path.to_string());
    }
}

/// Kind-specific emptiness: whitespace-only text, unset or NaN numbers,
/// and empty multi-select lists all count as unanswered.
fn is_blank(kind: FieldKind, value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => {
            let trimmed = text.trim();
            trimmed.is_empty()
                || (kind == FieldKind::Number && trimmed.eq_ignore_ascii_case("nan"))
        }
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn check_value(field: &FieldSpec, value: &Value, path: &str) -> Option<FieldError> {
    let format_error = match field.kind {
        FieldKind::Text => {
            if !value.is_string() {
                Some(("value must be text", "type_mismatch"))
            } else {
                None
            }
        }
        FieldKind::Email => match value.as_str() {
            None => Some(("value must be text", "type_mismatch")),
            Some(text) if !is_email(text) => {
                Some(("value is not a valid email address", "email_format"))
            }
            Some(_) => None,
        },
        FieldKind::Phone => match value.as_str() {
            None => Some(("value must be text", "type_mismatch")),
            Some(text) if digit_count(text) < 10 => {
                Some(("phone number needs at least 10 digits", "phone_format"))
            }
            Some(_) => None,
        },
        FieldKind::Number => {
            if as_number(value).is_none() {
                Some(("value must be a number", "type_mismatch"))
            } else {
                None
            }
        }
        FieldKind::Boolean => {
            if truthiness(value).is_none() {
                Some(("value must be yes or no", "type_mismatch"))
            } else {
                None
            }
        }
        FieldKind::Enum => match value.as_str() {
            None => Some(("value must be text", "type_mismatch")),
            Some(text) if !choice_allowed(field, text) => {
                Some(("invalid option", "enum_mismatch"))
            }
            Some(_) => None,
        },
        FieldKind::MultiEnum => match value.as_array() {
            None => Some(("value must be a list of options", "type_mismatch")),
            Some(items) => {
                if items.iter().any(|item| {
                    item.as_str()
                        .is_none_or(|text| !choice_allowed(field, text))
                }) {
                    Some(("invalid option", "enum_mismatch"))
                } else {
                    None
                }
            }
        },
    };

    if let Some((message, code)) = format_error {
        return Some(field_error(path, message, code));
    }

    if let Some(constraint) = &field.constraint {
        return enforce_constraint(constraint, value, path);
    }

    None
}

fn enforce_constraint(constraint: &Constraint, value: &Value, path: &str) -> Option<FieldError> {
    if let Some(min) = constraint.min
        && let Some(number) = as_number(value)
        && number < min
    {
        return Some(field_error(path, "value below minimum", "min"));
    }

    if let Some(max) = constraint.max
        && let Some(number) = as_number(value)
        && number > max
    {
        return Some(field_error(path, "value above maximum", "max"));
    }

    if let Some(min_len) = constraint.min_len
        && let Some(text) = value.as_str()
        && text.trim().len() < min_len
    {
        return Some(field_error(path, "value shorter than minimum length", "min_length"));
    }

    if let Some(max_len) = constraint.max_len
        && let Some(text) = value.as_str()
        && text.trim().len() > max_len
    {
        return Some(field_error(path, "value longer than maximum length", "max_length"));
    }

    if let Some(pattern) = &constraint.pattern
        && let Some(text) = value.as_str()
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        return Some(field_error(path, "value does not match pattern", "pattern_mismatch"));
    }

    None
}

fn choice_allowed(field: &FieldSpec, text: &str) -> bool {
    field
        .choices
        .as_ref()
        .is_some_and(|choices| choices.iter().any(|choice| choice == text))
}

fn is_email(text: &str) -> bool {
    Regex::new(EMAIL_PATTERN)
        .map(|regex| regex.is_match(text))
        .unwrap_or(false)
}

fn digit_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_digit).count()
}

fn field_error(path: &str, message: &str, code: &str) -> FieldError {
    FieldError {
        field: path.to_string(),
        message: message.to_string(),
        code: Some(code.to_string()),
    }
}
