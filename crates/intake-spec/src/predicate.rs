use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pure boolean test over a single stored value.
///
/// Dependency rules and derived analytics flags both evaluate predicates, so
/// a form's conditional behavior and the dashboard counters stay defined in
/// one place. An unanswered value never satisfies a predicate, which keeps
/// dependent fields inactive until their dependee is filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Predicate {
    Equals { value: Value },
    NotEquals { value: Value },
    LessThan { value: f64 },
    AtMost { value: f64 },
    GreaterThan { value: f64 },
    AtLeast { value: f64 },
    IsTrue,
    IsFalse,
    IsSet,
}

impl Predicate {
    pub fn matches(&self, value: Option<&Value>) -> bool {
        let Some(value) = value else {
            return false;
        };
        if value.is_null() {
            return false;
        }

        match self {
            Predicate::Equals { value: expected } => value == expected,
            Predicate::NotEquals { value: expected } => value != expected,
            Predicate::LessThan { value: bound } => as_number(value).is_some_and(|n| n < *bound),
            Predicate::AtMost { value: bound } => as_number(value).is_some_and(|n| n <= *bound),
            Predicate::GreaterThan { value: bound } => as_number(value).is_some_and(|n| n > *bound),
            Predicate::AtLeast { value: bound } => as_number(value).is_some_and(|n| n >= *bound),
            Predicate::IsTrue => truthiness(value) == Some(true),
            Predicate::IsFalse => truthiness(value) == Some(false),
            Predicate::IsSet => true,
        }
    }
}

/// Reads a value as a number, accepting numeric strings the way browser
/// inputs deliver them.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Coerces a value into a boolean when possible.
pub(crate) fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(value) => Some(*value),
        Value::Number(number) => number.as_f64().map(|value| value != 0.0),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unanswered_value_never_matches() {
        assert!(!Predicate::IsSet.matches(None));
        assert!(!Predicate::IsFalse.matches(None));
        assert!(!Predicate::NotEquals { value: json!("x") }.matches(None));
    }

    #[test]
    fn numeric_comparisons_accept_string_input() {
        let lt = Predicate::LessThan { value: 18.0 };
        assert!(lt.matches(Some(&json!(17))));
        assert!(lt.matches(Some(&json!("17"))));
        assert!(!lt.matches(Some(&json!(18))));
        assert!(!lt.matches(Some(&json!("adult"))));
    }

    #[test]
    fn boolean_predicates_coerce_yes_no() {
        assert!(Predicate::IsTrue.matches(Some(&json!("yes"))));
        assert!(Predicate::IsFalse.matches(Some(&json!("no"))));
        assert!(!Predicate::IsTrue.matches(Some(&json!("maybe"))));
    }
}
