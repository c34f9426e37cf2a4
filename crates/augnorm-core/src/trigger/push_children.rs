//! PUSH-to-children step: propagate a FOLLOW column from a parent row down
//! to its children when the source column changes. SNAPSHOT columns never
//! reach this step — they are pulled once by the child and never chase
//! later parent edits, so [`super::gather_automations`] only ever builds a
//! [`super::PushChildStep`] out of FOLLOW directives.

use super::{Operation, PushChildStep};
use crate::trigger::change_detection;

/// Children can only ever observe a parent's *row already present*, so
/// this only fires on the parent's UPDATE.
pub fn emit(step: &PushChildStep, op: Operation) -> Vec<String> {
    if !matches!(op, Operation::Update) {
        return Vec::new();
    }

    let parent_cols: Vec<String> = step.copies.iter().map(|(p, _)| p.clone()).collect();
    let guard = change_detection::any_changed(&parent_cols);

    let set_clause = step
        .copies
        .iter()
        .map(|(parent_col, child_col)| format!("{child_col} = NEW.{parent_col}"))
        .collect::<Vec<_>>()
        .join(", ");
    let where_clause = step
        .child_fk_columns
        .iter()
        .zip(&step.parent_pk_columns)
        .map(|(fk, pk)| format!("{fk} = NEW.{pk}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    vec![
        format!("IF {guard} THEN"),
        format!(
            "  UPDATE {child} SET {set_clause} WHERE {where_clause};",
            child = step.child_table
        ),
        "END IF;".to_string(),
    ]
}
