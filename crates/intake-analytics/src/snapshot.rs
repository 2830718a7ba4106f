use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Count of records created on one calendar day. `date` is the ISO
/// calendar date (`2026-01-02`); points are emitted sorted by the
/// underlying date value, not by the label text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TimelinePoint {
    pub date: String,
    pub count: u64,
}

/// Full aggregated analytics result for a point-in-time record batch.
/// This exact shape is what the visualization side consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsSnapshot {
    pub total_records: u64,
    pub average_age: f64,
    pub distributions: BTreeMap<String, BTreeMap<String, u64>>,
    pub timeline: Vec<TimelinePoint>,
    pub derived_flags: BTreeMap<String, u64>,
}

impl AnalyticsSnapshot {
    /// The explicit empty-batch snapshot: zero everywhere, every map
    /// present but empty. An empty batch is a normal input, not an error.
    pub fn empty() -> Self {
        Self {
            total_records: 0,
            average_age: 0.0,
            distributions: BTreeMap::new(),
            timeline: Vec::new(),
            derived_flags: BTreeMap::new(),
        }
    }
}
