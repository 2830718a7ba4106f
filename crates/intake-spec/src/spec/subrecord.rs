use crate::spec::field::FieldSpec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Template for a block of repeated child entries driven by a count field.
///
/// The numeric value of `count_field` determines how many entries exist at
/// any moment; the live entry list is kept in lockstep with it, clamped to
/// `[min_count, max_count]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubRecordSchema {
    pub id: String,
    pub count_field: String,
    pub min_count: usize,
    pub max_count: usize,
    pub fields: Vec<FieldSpec>,
}
