use std::collections::BTreeMap;

use serde_json::Value;
use time::Date;

use intake_spec::SubmissionRecord;

use crate::plan::AggregationPlan;
use crate::snapshot::{AnalyticsSnapshot, TimelinePoint};

/// Reduces a record batch into the dashboard snapshot.
///
/// Pure and deterministic: the same batch always yields the same snapshot,
/// and record order never matters. Records missing a field are simply
/// excluded from that dimension; a partial historical record must never
/// take the dashboard down.
pub fn aggregate(plan: &AggregationPlan, records: &[SubmissionRecord]) -> AnalyticsSnapshot {
    let mut snapshot = AnalyticsSnapshot::empty();
    for dimension in &plan.dimensions {
        snapshot.distributions.entry(dimension.name.clone()).or_default();
    }
    for flag in &plan.flags {
        snapshot.derived_flags.insert(flag.name.clone(), 0);
    }

    snapshot.total_records = records.len() as u64;
    if records.is_empty() {
        return snapshot;
    }

    let ages: Vec<f64> = records
        .iter()
        .filter_map(|record| record.value(&plan.age_field))
        .filter_map(as_number)
        .collect();
    if !ages.is_empty() {
        let mean = ages.iter().sum::<f64>() / ages.len() as f64;
        snapshot.average_age = round_one_decimal(mean);
    }

    for record in records {
        for dimension in &plan.dimensions {
            let Some(value) = record.value(&dimension.field) else {
                continue;
            };
            let bucket = snapshot
                .distributions
                .entry(dimension.name.clone())
                .or_default();
            if dimension.multi {
                let items = value
                    .as_array()
                    .cloned()
                    .unwrap_or_else(|| vec![value.clone()]);
                for item in &items {
                    if let Some(label) = label_of(item)
                        && !plan.is_none_token(&label)
                    {
                        *bucket.entry(label).or_insert(0) += 1;
                    }
                }
            } else if let Some(label) = label_of(value)
                && !plan.is_none_token(&label)
            {
                *bucket.entry(label).or_insert(0) += 1;
            }
        }

        for flag in &plan.flags {
            if flag.predicate.matches(record.value(&flag.field)) {
                *snapshot.derived_flags.entry(flag.name.clone()).or_insert(0) += 1;
            }
        }
    }

    // Keyed by the date value, so "Jan 2" can never sort after "Jan 10".
    let mut by_day: BTreeMap<Date, u64> = BTreeMap::new();
    for record in records {
        if let Some(stamp) = record.created_at {
            *by_day.entry(stamp.date()).or_insert(0) += 1;
        }
    }
    snapshot.timeline = by_day
        .into_iter()
        .map(|(date, count)| TimelinePoint {
            date: date.to_string(),
            count,
        })
        .collect();

    snapshot
}

/// One decimal place, half away from zero.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Category label for a distribution bucket. Whole numbers drop the
/// fractional part so ages group as "16", not "16.0".
fn label_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => match number.as_i64() {
            Some(whole) => Some(whole.to_string()),
            None => Some(number.to_string()),
        },
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}
