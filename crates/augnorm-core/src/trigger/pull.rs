//! PULL step: copy parent column values onto a child row via its FK.
//! Declared by SNAPSHOT and FOLLOW automation, both of which pull on the
//! child's own INSERT/UPDATE — the asymmetry between the two directives is
//! entirely in [`super::push_children`].

use super::{Operation, PullStep};
use crate::trigger::change_detection;

pub fn emit(step: &PullStep, op: Operation) -> Vec<String> {
    let select_cols = step
        .copies
        .iter()
        .map(|(parent_col, _)| parent_col.clone())
        .collect::<Vec<_>>()
        .join(", ");
    let into_cols = step
        .copies
        .iter()
        .map(|(_, child_col)| format!("NEW.{child_col}"))
        .collect::<Vec<_>>()
        .join(", ");
    let where_clause = step
        .parent_pk_columns
        .iter()
        .zip(&step.local_fk_columns)
        .map(|(pk, fk)| format!("{pk} = NEW.{fk}"))
        .collect::<Vec<_>>()
        .join(" AND ");

    let select_stmt = format!(
        "SELECT {select_cols} INTO {into_cols} FROM {parent} WHERE {where_clause};",
        parent = step.parent_table
    );

    match op {
        Operation::Insert => vec![select_stmt],
        Operation::Update => {
            let guard = change_detection::any_changed(&step.local_fk_columns);
            vec![
                format!("IF {guard} THEN"),
                format!("  {select_stmt}"),
                "END IF;".to_string(),
            ]
        }
        Operation::Delete => Vec::new(),
    }
}
