use crate::spec::field::FieldSpec;
use crate::spec::subrecord::SubRecordSchema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One screen of the wizard: a subset of the record's fields plus any
/// repeated sub-record blocks collected on that screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepSpec {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_records: Vec<SubRecordSchema>,
}
