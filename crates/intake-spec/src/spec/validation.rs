use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Cross-field count rule: the part counts summed together must not exceed
/// the total count. Violations surface as one combined error, not one per
/// field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CountBoundRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub total_field: String,
    pub part_fields: Vec<String>,
    pub message: String,
}
