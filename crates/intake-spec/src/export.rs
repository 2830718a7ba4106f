use crate::spec::form::FormSpec;

/// Fixed column order handed to the export collaborator.
///
/// The order is a contract: record metadata first, then top-level fields in
/// declaration order, then one column per sub-record slot up to the schema
/// maximum (`block.index.field`, 1-based). Adding fields appends columns;
/// existing columns never move.
pub fn column_order(form: &FormSpec) -> Vec<String> {
    let mut columns = vec!["id".to_string(), "created_at".to_string()];

    for field in form.fields() {
        columns.push(field.id.clone());
    }

    for schema in form.sub_record_schemas() {
        for index in 1..=schema.max_count {
            for field in &schema.fields {
                columns.push(format!("{}.{}.{}", schema.id, index, field.id));
            }
        }
    }

    columns
}
