use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::subrecords::SubRecord;

/// Field values and live sub-record entries for one wizard step.
///
/// Step state is treated as a value: transitions build a new `StepState`
/// rather than mutating a shared object, so a retreat-and-return restores
/// exactly what was saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct StepState {
    #[serde(default)]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_records: BTreeMap<String, Vec<SubRecord>>,
}

impl StepState {
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn entries(&self, schema_id: &str) -> &[SubRecord] {
        self.sub_records
            .get(schema_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns a copy with the given value set; a `null` clears the field.
    pub fn with_value(&self, id: &str, value: Value) -> Self {
        let mut next = self.clone();
        if value.is_null() {
            next.values.remove(id);
        } else {
            next.values.insert(id.to_string(), value);
        }
        next
    }
}
