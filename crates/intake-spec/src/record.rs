use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_cbor::{to_vec, value::to_value};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// The assembled, immutable output of one completed registration.
///
/// `id` and `created_at` are assigned by the persistence collaborator on
/// submission, never by this crate. The field layout here is the wire
/// format shared with the aggregation side; the two are versioned together
/// via `form_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<String>")]
    pub created_at: Option<OffsetDateTime>,
    pub form_id: String,
    pub form_version: String,
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_records: BTreeMap<String, Vec<Map<String, Value>>>,
}

impl SubmissionRecord {
    pub fn value(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    /// Serializes the record as canonical CBOR bytes, the hand-off encoding
    /// consumed by the persistence collaborator.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        let canonical = to_value(self)?;
        to_vec(&canonical)
    }

    /// Serializes the record as indented JSON for debugging.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
