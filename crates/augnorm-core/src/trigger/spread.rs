//! SPREAD step: expand one row of the declaring table into many rows of a
//! target table over a date range, tracked by `tracking_column` so a later
//! UPDATE/DELETE can find and regenerate the generated rows.
//!
//! The target's own date column that receives each loop iteration's value
//! has no name in the directive (only the three *source*-side date columns
//! are named) — by convention the generator writes it to `occurrence_date`
//! on the target table.

use super::sync::render_literal;
use super::{change_detection, Operation};
use crate::ast::SpreadDirective;

const GENERATED_DATE_COLUMN: &str = "occurrence_date";

pub fn emit(
    source_pk: Option<&str>,
    target_table: &str,
    directive: &SpreadDirective,
    op: Operation,
) -> Vec<String> {
    let Some(pk) = source_pk else {
        return Vec::new();
    };

    match op {
        Operation::Insert => generate_loop(pk, target_table, directive, "NEW"),
        Operation::Update => {
            let guard = change_detection::any_changed(&[
                directive.generate.start_date.clone(),
                directive.generate.end_date.clone(),
                directive.generate.interval.clone(),
            ]);
            let mut stmts = vec![format!("IF {guard} THEN")];
            stmts.push(format!(
                "  DELETE FROM {target_table} WHERE {tc} = OLD.{pk};",
                tc = directive.tracking_column
            ));
            stmts.extend(
                generate_loop(pk, target_table, directive, "NEW")
                    .into_iter()
                    .map(|line| format!("  {line}")),
            );
            stmts.push("END IF;".to_string());
            stmts
        }
        Operation::Delete => vec![format!(
            "DELETE FROM {target_table} WHERE {tc} = OLD.{pk};",
            tc = directive.tracking_column
        )],
    }
}

fn generate_loop(
    pk: &str,
    target_table: &str,
    directive: &SpreadDirective,
    prefix: &str,
) -> Vec<String> {
    let mut columns = vec![directive.tracking_column.clone(), GENERATED_DATE_COLUMN.to_string()];
    let mut values = vec![format!("{prefix}.{pk}"), "__spread_d".to_string()];

    for (source_col, target_col) in &directive.column_map {
        columns.push(target_col.clone());
        values.push(format!("{prefix}.{source_col}"));
    }
    for (target_col, literal) in &directive.literals {
        columns.push(target_col.clone());
        values.push(render_literal(literal));
    }

    vec![
        format!("__spread_d := {prefix}.{start};", start = directive.generate.start_date),
        format!("WHILE __spread_d <= {prefix}.{end} LOOP", end = directive.generate.end_date),
        format!(
            "  INSERT INTO {target_table}({cols}) VALUES({vals});",
            cols = columns.join(", "),
            vals = values.join(", "),
        ),
        format!("  __spread_d := __spread_d + {prefix}.{interval};", interval = directive.generate.interval),
        "END LOOP;".to_string(),
    ]
}
