//! Calculated-column step: evaluate every `calculated` expression in
//! topological order, qualifying bare column references with `NEW.`.

use crate::identifiers;
use crate::processor::ProcessedTable;

pub fn emit(table: &ProcessedTable, order: &[String]) -> Vec<String> {
    let all_columns = table.all_column_names();

    order
        .iter()
        .filter_map(|name| {
            let expr = table.column(name)?.calculated.as_ref()?;
            let rewritten = identifiers::qualify_with_new(expr, &all_columns);
            Some(format!("NEW.{name} := {rewritten};"))
        })
        .collect()
}
