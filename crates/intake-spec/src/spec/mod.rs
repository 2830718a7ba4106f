pub mod field;
pub mod form;
pub mod step;
pub mod subrecord;
pub mod validation;

pub use field::{Constraint, DependencyRule, FieldKind, FieldSpec};
pub use form::{FormSpec, SchemaError};
pub use step::StepSpec;
pub use subrecord::SubRecordSchema;
pub use validation::CountBoundRule;
