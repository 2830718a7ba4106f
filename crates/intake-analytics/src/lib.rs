#![allow(missing_docs)]

pub mod aggregate;
pub mod plan;
pub mod snapshot;

pub use aggregate::aggregate;
pub use plan::{AggregationPlan, DimensionSpec, FlagSpec};
pub use snapshot::{AnalyticsSnapshot, TimelinePoint};
