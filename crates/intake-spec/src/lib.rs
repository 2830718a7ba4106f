#![allow(missing_docs)]

pub mod assemble;
pub mod dependency;
pub mod export;
pub mod fixture;
pub mod forms;
pub mod predicate;
pub mod record;
pub mod record_schema;
pub mod spec;
pub mod state;
pub mod subrecords;
pub mod validate;

pub use assemble::{AssembleError, assemble};
pub use dependency::{ActiveFields, clear_inactive, evaluate};
pub use export::column_order;
pub use fixture::generate as example_record;
pub use predicate::Predicate;
pub use record::SubmissionRecord;
pub use record_schema::generate as record_schema;
pub use spec::{
    Constraint, CountBoundRule, DependencyRule, FieldKind, FieldSpec, FormSpec, SchemaError,
    StepSpec, SubRecordSchema,
};
pub use state::StepState;
pub use subrecords::{SubRecord, count_value, reconcile};
pub use validate::{FieldError, ValidationResult, validate_step};
