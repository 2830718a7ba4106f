//! The registration forms used by this family of event sites.
//!
//! Each constructor returns a complete [`FormSpec`]. The sites differ only
//! in these definitions; the engine crates are shared.

use serde_json::json;

use crate::predicate::Predicate;
use crate::spec::field::{Constraint, DependencyRule, FieldKind, FieldSpec};
use crate::spec::form::FormSpec;
use crate::spec::step::StepSpec;
use crate::spec::subrecord::SubRecordSchema;
use crate::spec::validation::CountBoundRule;

/// Family retreat registration: contact details, travel logistics, and the
/// children blocks (nursery ages 1-3, VBS ages 4-10) driven by count fields.
pub fn family_retreat() -> FormSpec {
    FormSpec {
        id: "family-retreat".into(),
        title: "Family Retreat Registration".into(),
        version: "2.4.0".into(),
        description: Some("Annual family retreat sign-up".into()),
        steps: vec![
            StepSpec {
                id: "contact".into(),
                title: "Contact".into(),
                fields: vec![
                    text_required("full_name", "Full name"),
                    email("email", "Email address"),
                    phone("phone", "Phone number"),
                    number_required("age", "Age", 0.0, 120.0),
                    choose(
                        "gender",
                        "Gender",
                        &["female", "male"],
                        false,
                    ),
                    choose(
                        "country",
                        "Country",
                        &["usa", "canada", "mexico", "other"],
                        true,
                    ),
                    minor_guard("chaperone_name", "Chaperone name", FieldKind::Text),
                ],
                sub_records: vec![],
            },
            StepSpec {
                id: "logistics".into(),
                title: "Travel & Meals".into(),
                fields: vec![
                    boolean("needs_transportation", "Do you need transportation?"),
                    FieldSpec {
                        id: "transportation_method".into(),
                        kind: FieldKind::Enum,
                        label: "Transportation method".into(),
                        required: false,
                        depends_on: Some(DependencyRule {
                            field: "needs_transportation".into(),
                            predicate: Predicate::IsTrue,
                        }),
                        choices: Some(string_choices(&["church_bus", "carpool", "own_vehicle"])),
                        constraint: None,
                        default_value: None,
                    },
                    choose(
                        "payment_option",
                        "Payment option",
                        &["online", "cash", "waiver"],
                        true,
                    ),
                    boolean("financial_aid", "Requesting financial aid?"),
                    boolean("previously_attended", "Attended a previous retreat?"),
                    multi(
                        "dietary_restrictions",
                        "Dietary restrictions",
                        &["vegetarian", "gluten_free", "dairy_free", "nut_allergy"],
                        false,
                    ),
                ],
                sub_records: vec![],
            },
            StepSpec {
                id: "children".into(),
                title: "Children".into(),
                fields: vec![
                    boolean("has_children", "Bringing children under 10?"),
                    child_count("total_children", "Children attending", 8.0),
                    child_count("num_nursery", "Children needing nursery (ages 1-3)", 6.0),
                    child_count("num_vbs", "Children joining VBS (ages 4-10)", 6.0),
                ],
                sub_records: vec![
                    SubRecordSchema {
                        id: "nursery_children".into(),
                        count_field: "num_nursery".into(),
                        min_count: 0,
                        max_count: 6,
                        fields: vec![
                            text_required("name", "Child's name"),
                            number_required("age", "Age", 1.0, 3.0),
                            text_optional("allergies", "Allergies"),
                        ],
                    },
                    SubRecordSchema {
                        id: "vbs_children".into(),
                        count_field: "num_vbs".into(),
                        min_count: 0,
                        max_count: 6,
                        fields: vec![
                            text_required("name", "Child's name"),
                            number_required("age", "Age", 4.0, 10.0),
                            choose(
                                "shirt_size",
                                "Shirt size",
                                &["xs", "s", "m", "l"],
                                false,
                            ),
                        ],
                    },
                ],
            },
        ],
        validations: vec![CountBoundRule {
            id: Some("children_total".into()),
            total_field: "total_children".into(),
            part_fields: vec!["num_nursery".into(), "num_vbs".into()],
            message: "Nursery and VBS placements cannot exceed the children attending".into(),
        }],
    }
}

/// Youth conference registration: single attendee, chaperone details for
/// minors, workshop selection. No repeated blocks.
pub fn youth_conference() -> FormSpec {
    FormSpec {
        id: "youth-conference".into(),
        title: "Youth Conference Registration".into(),
        version: "1.7.0".into(),
        description: Some("Summer youth conference sign-up".into()),
        steps: vec![
            StepSpec {
                id: "attendee".into(),
                title: "Attendee".into(),
                fields: vec![
                    text_required("full_name", "Full name"),
                    email("email", "Email address"),
                    phone("phone", "Phone number"),
                    number_required("age", "Age", 10.0, 25.0),
                    choose(
                        "gender",
                        "Gender",
                        &["female", "male"],
                        false,
                    ),
                    text_optional("home_congregation", "Home congregation"),
                    minor_guard("chaperone_name", "Chaperone name", FieldKind::Text),
                    minor_guard("chaperone_phone", "Chaperone phone", FieldKind::Phone),
                ],
                sub_records: vec![],
            },
            StepSpec {
                id: "logistics".into(),
                title: "Logistics".into(),
                fields: vec![
                    boolean("needs_transportation", "Do you need transportation?"),
                    FieldSpec {
                        id: "transportation_method".into(),
                        kind: FieldKind::Enum,
                        label: "Transportation method".into(),
                        required: false,
                        depends_on: Some(DependencyRule {
                            field: "needs_transportation".into(),
                            predicate: Predicate::IsTrue,
                        }),
                        choices: Some(string_choices(&["church_bus", "carpool", "own_vehicle"])),
                        constraint: None,
                        default_value: None,
                    },
                    multi(
                        "workshops",
                        "Workshops (pick one or more)",
                        &["worship", "missions", "apologetics", "service"],
                        true,
                    ),
                    multi(
                        "dietary_restrictions",
                        "Dietary restrictions",
                        &["vegetarian", "gluten_free", "dairy_free", "nut_allergy"],
                        false,
                    ),
                    choose(
                        "payment_option",
                        "Payment option",
                        &["online", "cash", "waiver"],
                        true,
                    ),
                    boolean("financial_aid", "Requesting financial aid?"),
                    boolean("previously_attended", "Attended before?"),
                ],
                sub_records: vec![],
            },
        ],
        validations: vec![],
    }
}

fn string_choices(choices: &[&str]) -> Vec<String> {
    choices.iter().map(|choice| choice.to_string()).collect()
}

fn text_required(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind: FieldKind::Text,
        label: label.into(),
        required: true,
        depends_on: None,
        choices: None,
        constraint: None,
        default_value: None,
    }
}

fn text_optional(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        required: false,
        ..text_required(id, label)
    }
}

fn email(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        kind: FieldKind::Email,
        ..text_required(id, label)
    }
}

fn phone(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        kind: FieldKind::Phone,
        ..text_required(id, label)
    }
}

fn boolean(id: &str, label: &str) -> FieldSpec {
    FieldSpec {
        kind: FieldKind::Boolean,
        ..text_required(id, label)
    }
}

fn number_required(id: &str, label: &str, min: f64, max: f64) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind: FieldKind::Number,
        label: label.into(),
        required: true,
        depends_on: None,
        choices: None,
        constraint: Some(Constraint {
            min: Some(min),
            max: Some(max),
            ..Constraint::default()
        }),
        default_value: None,
    }
}

fn choose(id: &str, label: &str, choices: &[&str], required: bool) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind: FieldKind::Enum,
        label: label.into(),
        required,
        depends_on: None,
        choices: Some(string_choices(choices)),
        constraint: None,
        default_value: None,
    }
}

fn multi(id: &str, label: &str, choices: &[&str], required: bool) -> FieldSpec {
    FieldSpec {
        kind: FieldKind::MultiEnum,
        ..choose(id, label, choices, required)
    }
}

/// A field that activates only while the attendee is a minor.
fn minor_guard(id: &str, label: &str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind,
        label: label.into(),
        required: false,
        depends_on: Some(DependencyRule {
            field: "age".into(),
            predicate: Predicate::LessThan { value: 18.0 },
        }),
        choices: None,
        constraint: None,
        default_value: None,
    }
}

/// A count field that appears once children are confirmed; a "no" answer
/// collapses it back to zero and empties its block.
fn child_count(id: &str, label: &str, max: f64) -> FieldSpec {
    FieldSpec {
        id: id.into(),
        kind: FieldKind::Number,
        label: label.into(),
        required: false,
        depends_on: Some(DependencyRule {
            field: "has_children".into(),
            predicate: Predicate::IsTrue,
        }),
        choices: None,
        constraint: Some(Constraint {
            min: Some(0.0),
            max: Some(max),
            ..Constraint::default()
        }),
        default_value: Some(json!(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_forms_compile() {
        family_retreat().compile().expect("family retreat");
        youth_conference().compile().expect("youth conference");
    }
}
