use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spec::field::{FieldKind, FieldSpec};
use crate::spec::step::StepSpec;
use crate::spec::subrecord::SubRecordSchema;
use crate::spec::validation::CountBoundRule;

/// Top-level definition of one registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<StepSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<CountBoundRule>,
}

/// Defects in a form definition. These are configuration mistakes, so they
/// are fatal at construction time rather than reported as user-facing
/// validation failures.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("form '{form}' declares no steps")]
    NoSteps { form: String },
    #[error("duplicate field id '{0}'")]
    DuplicateField(String),
    #[error("duplicate sub-record schema id '{0}'")]
    DuplicateSchema(String),
    #[error("field '{field}' depends on unknown field '{dependee}'")]
    UnknownDependee { field: String, dependee: String },
    #[error("field '{0}' cannot depend on itself")]
    SelfDependency(String),
    #[error("sub-record field '{field}' in schema '{schema}' cannot declare a dependency")]
    NestedDependency { schema: String, field: String },
    #[error("enum field '{0}' declares no choices")]
    EnumWithoutChoices(String),
    #[error("sub-record schema '{schema}' has min_count {min} greater than max_count {max}")]
    CountBoundsReversed {
        schema: String,
        min: usize,
        max: usize,
    },
    #[error("sub-record schema '{schema}' references unknown count field '{count_field}'")]
    UnknownCountField { schema: String, count_field: String },
    #[error("sub-record schema '{schema}' count field '{count_field}' is not a number field")]
    CountFieldNotNumeric { schema: String, count_field: String },
    #[error("count rule '{rule}' references unknown field '{field}'")]
    UnknownRuleField { rule: String, field: String },
    #[error("count rule '{rule}' field '{field}' is not a number field")]
    RuleFieldNotNumeric { rule: String, field: String },
    #[error("count rule '{0}' declares no part fields")]
    EmptyRule(String),
}

impl FormSpec {
    /// Iterates every top-level field across all steps, in step order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.steps.iter().flat_map(|step| step.fields.iter())
    }

    /// Iterates every sub-record schema across all steps, in step order.
    pub fn sub_record_schemas(&self) -> impl Iterator<Item = &SubRecordSchema> {
        self.steps.iter().flat_map(|step| step.sub_records.iter())
    }

    pub fn field(&self, id: &str) -> Option<&FieldSpec> {
        self.fields().find(|field| field.id == id)
    }

    pub fn schema(&self, id: &str) -> Option<&SubRecordSchema> {
        self.sub_record_schemas().find(|schema| schema.id == id)
    }

    pub fn step_of_field(&self, id: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.fields.iter().any(|field| field.id == id))
    }

    /// Checks the definition for structural defects. Runs once at wizard
    /// construction; a failure here is a programmer/config error, never a
    /// runtime user condition.
    pub fn compile(&self) -> Result<(), SchemaError> {
        if self.steps.is_empty() {
            return Err(SchemaError::NoSteps {
                form: self.id.clone(),
            });
        }

        let mut field_ids = BTreeSet::new();
        for field in self.fields() {
            if !field_ids.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateField(field.id.clone()));
            }
            check_choices(field)?;
        }

        for field in self.fields() {
            if let Some(rule) = &field.depends_on {
                if rule.field == field.id {
                    return Err(SchemaError::SelfDependency(field.id.clone()));
                }
                if !field_ids.contains(rule.field.as_str()) {
                    return Err(SchemaError::UnknownDependee {
                        field: field.id.clone(),
                        dependee: rule.field.clone(),
                    });
                }
            }
        }

        let mut schema_ids = BTreeSet::new();
        for schema in self.sub_record_schemas() {
            if !schema_ids.insert(schema.id.as_str()) {
                return Err(SchemaError::DuplicateSchema(schema.id.clone()));
            }
            if schema.min_count > schema.max_count {
                return Err(SchemaError::CountBoundsReversed {
                    schema: schema.id.clone(),
                    min: schema.min_count,
                    max: schema.max_count,
                });
            }
            match self.field(&schema.count_field) {
                None => {
                    return Err(SchemaError::UnknownCountField {
                        schema: schema.id.clone(),
                        count_field: schema.count_field.clone(),
                    });
                }
                Some(count_field) if count_field.kind != FieldKind::Number => {
                    return Err(SchemaError::CountFieldNotNumeric {
                        schema: schema.id.clone(),
                        count_field: schema.count_field.clone(),
                    });
                }
                Some(_) => {}
            }
            let mut entry_ids = BTreeSet::new();
            for field in &schema.fields {
                if !entry_ids.insert(field.id.as_str()) {
                    return Err(SchemaError::DuplicateField(format!(
                        "{}.{}",
                        schema.id, field.id
                    )));
                }
                if field.depends_on.is_some() {
                    return Err(SchemaError::NestedDependency {
                        schema: schema.id.clone(),
                        field: field.id.clone(),
                    });
                }
                check_choices(field)?;
            }
        }

        for rule in &self.validations {
            let rule_id = rule_label(rule);
            if rule.part_fields.is_empty() {
                return Err(SchemaError::EmptyRule(rule_id));
            }
            for field_id in std::iter::once(&rule.total_field).chain(rule.part_fields.iter()) {
                match self.field(field_id) {
                    None => {
                        return Err(SchemaError::UnknownRuleField {
                            rule: rule_id.clone(),
                            field: field_id.clone(),
                        });
                    }
                    Some(field) if field.kind != FieldKind::Number => {
                        return Err(SchemaError::RuleFieldNotNumeric {
                            rule: rule_id.clone(),
                            field: field_id.clone(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }
}

fn check_choices(field: &FieldSpec) -> Result<(), SchemaError> {
    if matches!(field.kind, FieldKind::Enum | FieldKind::MultiEnum)
        && field.choices.as_ref().is_none_or(Vec::is_empty)
    {
        return Err(SchemaError::EnumWithoutChoices(field.id.clone()));
    }
    Ok(())
}

fn rule_label(rule: &CountBoundRule) -> String {
    rule.id
        .clone()
        .unwrap_or_else(|| rule.total_field.clone())
}
