use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use intake_spec::{FieldKind, FormSpec, Predicate};

/// One categorical dimension of the dashboard. `multi` marks multi-select
/// fields, where each selected value counts once and bucket totals may
/// exceed the record count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DimensionSpec {
    pub name: String,
    pub field: String,
    #[serde(default)]
    pub multi: bool,
}

/// A derived boolean counter: how many records satisfy the predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlagSpec {
    pub name: String,
    pub field: String,
    pub predicate: Predicate,
}

/// Declares what the aggregation engine computes from a record batch.
///
/// The default plan is derived from the same [`FormSpec`] the form side
/// runs, so the dimension set and the record wire format are versioned
/// together and cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregationPlan {
    pub age_field: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<DimensionSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagSpec>,
    /// Values treated as "no answer" for distribution purposes, matched
    /// case-insensitively.
    #[serde(default = "default_none_tokens")]
    pub none_tokens: BTreeSet<String>,
}

impl Default for AggregationPlan {
    fn default() -> Self {
        Self {
            age_field: "age".into(),
            dimensions: Vec::new(),
            flags: Vec::new(),
            none_tokens: default_none_tokens(),
        }
    }
}

fn default_none_tokens() -> BTreeSet<String> {
    ["", "none", "n/a"].into_iter().map(String::from).collect()
}

impl AggregationPlan {
    /// Derives the dashboard plan from a form definition: every enum field
    /// becomes a dimension (multi-selects marked as such), the age field
    /// gets its own distribution, booleans become derived flags, and each
    /// dependency rule contributes a "requires ..." counter.
    pub fn from_form(form: &FormSpec) -> Self {
        let mut plan = Self::default();

        for field in form.fields() {
            match field.kind {
                FieldKind::Enum => plan.dimensions.push(DimensionSpec {
                    name: field.id.clone(),
                    field: field.id.clone(),
                    multi: false,
                }),
                FieldKind::MultiEnum => plan.dimensions.push(DimensionSpec {
                    name: field.id.clone(),
                    field: field.id.clone(),
                    multi: true,
                }),
                FieldKind::Boolean => plan.flags.push(FlagSpec {
                    name: field.id.clone(),
                    field: field.id.clone(),
                    predicate: Predicate::IsTrue,
                }),
                _ => {}
            }

            if let Some(rule) = &field.depends_on {
                plan.flags.push(FlagSpec {
                    name: format!("requires_{}", field.id),
                    field: rule.field.clone(),
                    predicate: rule.predicate.clone(),
                });
            }
        }

        if form.field(&plan.age_field).is_some() {
            plan.dimensions.push(DimensionSpec {
                name: plan.age_field.clone(),
                field: plan.age_field.clone(),
                multi: false,
            });
        }

        plan
    }

    pub fn is_none_token(&self, label: &str) -> bool {
        self.none_tokens.contains(&label.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_spec::forms::family_retreat;

    #[test]
    fn plan_derives_dimensions_and_flags_from_the_form() {
        let plan = AggregationPlan::from_form(&family_retreat());

        assert!(plan.dimensions.iter().any(|d| d.name == "country" && !d.multi));
        assert!(
            plan.dimensions
                .iter()
                .any(|d| d.name == "dietary_restrictions" && d.multi)
        );
        assert!(plan.dimensions.iter().any(|d| d.name == "age"));
        assert!(plan.flags.iter().any(|f| f.name == "financial_aid"));
        assert!(plan.flags.iter().any(|f| f.name == "requires_chaperone_name"));
    }

    #[test]
    fn none_tokens_match_case_insensitively() {
        let plan = AggregationPlan::default();
        assert!(plan.is_none_token(""));
        assert!(plan.is_none_token("  None "));
        assert!(plan.is_none_token("N/A"));
        assert!(!plan.is_none_token("carpool"));
    }
}
