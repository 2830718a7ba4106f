use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::predicate::as_number;
use crate::spec::subrecord::SubRecordSchema;

/// One materialized entry of a repeated sub-record block.
///
/// Indices are 1-based and stable for the life of the entry: shrinking a
/// block drops the trailing entries and never renumbers the survivors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubRecord {
    pub index: usize,
    #[serde(default)]
    pub values: Map<String, Value>,
}

impl SubRecord {
    fn fresh(index: usize) -> Self {
        Self {
            index,
            values: Map::new(),
        }
    }
}

/// Reads the effective entry count for a schema from the current values.
/// A cleared, unanswered, or non-numeric count means no entries.
pub fn count_value(values: &Map<String, Value>, schema: &SubRecordSchema) -> usize {
    values
        .get(&schema.count_field)
        .and_then(as_number)
        .filter(|n| *n >= 0.0)
        .map(|n| n as usize)
        .unwrap_or(0)
}

/// Reconciles the live entries of a block against a new count.
///
/// Growing appends fresh entries with all fields unset; shrinking drops the
/// trailing entries and their values are gone for good, with no undo. A
/// count of zero always empties the block; any other count is clamped to
/// the schema bounds here, while the out-of-bounds raw input itself is
/// rejected at the validation layer.
pub fn reconcile(
    schema: &SubRecordSchema,
    existing: &[SubRecord],
    new_count: usize,
) -> Vec<SubRecord> {
    let target = if new_count == 0 || schema.max_count == 0 {
        0
    } else {
        new_count.clamp(schema.min_count.max(1), schema.max_count)
    };

    let mut entries: Vec<SubRecord> = existing.iter().take(target).cloned().collect();
    for index in entries.len() + 1..=target {
        entries.push(SubRecord::fresh(index));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::field::{FieldKind, FieldSpec};
    use serde_json::json;

    fn schema() -> SubRecordSchema {
        SubRecordSchema {
            id: "nursery_children".into(),
            count_field: "num_nursery".into(),
            min_count: 0,
            max_count: 5,
            fields: vec![FieldSpec {
                id: "name".into(),
                kind: FieldKind::Text,
                label: "Name".into(),
                required: true,
                depends_on: None,
                choices: None,
                constraint: None,
                default_value: None,
            }],
        }
    }

    #[test]
    fn grow_appends_fresh_entries() {
        let entries = reconcile(&schema(), &[], 3);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].index, 1);
        assert_eq!(entries[2].index, 3);
        assert!(entries.iter().all(|entry| entry.values.is_empty()));
    }

    #[test]
    fn shrink_keeps_leading_entries_and_their_values() {
        let mut entries = reconcile(&schema(), &[], 3);
        entries[0].values.insert("name".into(), json!("Abigail"));
        entries[2].values.insert("name".into(), json!("Caleb"));

        let remaining = reconcile(&schema(), &entries, 1);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].index, 1);
        assert_eq!(remaining[0].values["name"], json!("Abigail"));
    }

    #[test]
    fn zero_count_empties_the_block() {
        let entries = reconcile(&schema(), &[], 3);
        assert!(reconcile(&schema(), &entries, 0).is_empty());
    }

    #[test]
    fn count_is_clamped_to_schema_bounds() {
        assert_eq!(reconcile(&schema(), &[], 12).len(), 5);
    }

    #[test]
    fn count_value_treats_missing_as_zero() {
        let mut values = Map::new();
        assert_eq!(count_value(&values, &schema()), 0);
        values.insert("num_nursery".into(), json!(2));
        assert_eq!(count_value(&values, &schema()), 2);
        values.insert("num_nursery".into(), json!("not a number"));
        assert_eq!(count_value(&values, &schema()), 0);
    }
}
