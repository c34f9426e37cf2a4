//! PUSH-to-parents step: SUM/COUNT/MAX/MIN/LATEST aggregation maintenance,
//! running on the child table's own trigger.
//!
//! MAX/MIN/LATEST recovery (when the current extremum/most-recent row is
//! lowered, deleted, or edited away) is always a full rescan of the child
//! table via a correlated subquery — O(n) in the child, never a bare
//! "needs recompute" marker.

use super::{Operation, PushParentStep};
use crate::ast::AutomationType;
use crate::trigger::change_detection;

pub fn emit(step: &PushParentStep, op: Operation) -> Vec<String> {
    let mut stmts = Vec::new();
    for (parent_col, agg_type, child_col) in &step.aggregations {
        stmts.extend(emit_one(step, parent_col, *agg_type, child_col, op));
    }
    stmts
}

fn emit_one(
    step: &PushParentStep,
    parent_col: &str,
    agg_type: AutomationType,
    child_col: &str,
    op: Operation,
) -> Vec<String> {
    match (agg_type, op) {
        (AutomationType::Sum, Operation::Insert) => vec![format!(
            "UPDATE {parent} SET {pc} = {pc} + COALESCE(NEW.{cc}, 0) WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            cc = child_col,
            w = parent_filter(step, "NEW"),
        )],
        (AutomationType::Sum, Operation::Update) => {
            let guard = change_detection::column_changed(child_col);
            vec![
                format!("IF {guard} THEN"),
                format!(
                    "  UPDATE {parent} SET {pc} = {pc} + COALESCE(NEW.{cc}, 0) - COALESCE(OLD.{cc}, 0) WHERE {w};",
                    parent = step.parent_table,
                    pc = parent_col,
                    cc = child_col,
                    w = parent_filter(step, "NEW"),
                ),
                "END IF;".to_string(),
            ]
        }
        (AutomationType::Sum, Operation::Delete) => vec![format!(
            "UPDATE {parent} SET {pc} = {pc} - COALESCE(OLD.{cc}, 0) WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            cc = child_col,
            w = parent_filter(step, "OLD"),
        )],

        (AutomationType::Count, Operation::Insert) => vec![format!(
            "UPDATE {parent} SET {pc} = {pc} + 1 WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            w = parent_filter(step, "NEW"),
        )],
        // Unconditional no-op: a row edit never changes how many children
        // a parent has.
        (AutomationType::Count, Operation::Update) => Vec::new(),
        (AutomationType::Count, Operation::Delete) => vec![format!(
            "UPDATE {parent} SET {pc} = GREATEST({pc} - 1, 0) WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            w = parent_filter(step, "OLD"),
        )],

        (AutomationType::Max, Operation::Insert) => vec![format!(
            "UPDATE {parent} SET {pc} = GREATEST({pc}, COALESCE(NEW.{cc}, {pc})) WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            cc = child_col,
            w = parent_filter(step, "NEW"),
        )],
        (AutomationType::Max, Operation::Update) => {
            rescan(step, parent_col, child_col, "MAX", "NEW")
        }
        (AutomationType::Max, Operation::Delete) => {
            rescan(step, parent_col, child_col, "MAX", "OLD")
        }

        (AutomationType::Min, Operation::Insert) => vec![format!(
            "UPDATE {parent} SET {pc} = LEAST({pc}, COALESCE(NEW.{cc}, {pc})) WHERE {w};",
            parent = step.parent_table,
            pc = parent_col,
            cc = child_col,
            w = parent_filter(step, "NEW"),
        )],
        (AutomationType::Min, Operation::Update) => {
            rescan(step, parent_col, child_col, "MIN", "NEW")
        }
        (AutomationType::Min, Operation::Delete) => {
            rescan(step, parent_col, child_col, "MIN", "OLD")
        }

        (AutomationType::Latest, Operation::Insert) | (AutomationType::Latest, Operation::Update) => {
            vec![format!(
                "UPDATE {parent} SET {pc} = NEW.{cc} WHERE {w};",
                parent = step.parent_table,
                pc = parent_col,
                cc = child_col,
                w = parent_filter(step, "NEW"),
            )]
        }
        (AutomationType::Latest, Operation::Delete) => latest_rescan(step, parent_col, child_col),

        // Snapshot/Follow are cascades, never aggregations — gather_automations
        // never produces a PushParentStep entry for them.
        (AutomationType::Snapshot, _) | (AutomationType::Follow, _) => Vec::new(),
    }
}

fn parent_filter(step: &PushParentStep, prefix: &str) -> String {
    step.parent_pk_columns
        .iter()
        .zip(&step.local_fk_columns)
        .map(|(pk, fk)| format!("{pk} = {prefix}.{fk}"))
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// `prefix` is the correlation name of the row firing the trigger (`OLD` for
/// DELETE, `NEW` for UPDATE). These are BEFORE triggers, so a plain
/// FK-equality filter would still match that very row in its pre-write heap
/// state — excluding it by its own primary key is what makes the rescan see
/// the child table as it will look *after* this write commits.
fn child_filter(step: &PushParentStep, prefix: &str) -> String {
    let mut clauses: Vec<String> = step
        .local_fk_columns
        .iter()
        .map(|fk| format!("{fk} = {prefix}.{fk}"))
        .collect();
    if let Some(pk) = &step.order_by_column {
        clauses.push(format!("{pk} <> {prefix}.{pk}"));
    }
    clauses.join(" AND ")
}

fn rescan(
    step: &PushParentStep,
    parent_col: &str,
    child_col: &str,
    func: &str,
    prefix: &str,
) -> Vec<String> {
    let scan = format!(
        "(SELECT {func}({cc}) FROM {child} WHERE {cf})",
        func = func,
        cc = child_col,
        child = step.child_table,
        cf = child_filter(step, prefix),
    );
    // DELETE: the row is gone, the rescan over the rest is the whole story.
    // UPDATE: the row survives with its NEW value, which the self-excluding
    // rescan above can no longer see, so fold it back in here.
    let value = if prefix == "NEW" {
        let combine = if func == "MAX" { "GREATEST" } else { "LEAST" };
        format!("{combine}(COALESCE({scan}, NEW.{child_col}), NEW.{child_col})")
    } else {
        format!("COALESCE({scan}, 0)")
    };
    vec![format!(
        "UPDATE {parent} SET {pc} = {value} WHERE {pf};",
        parent = step.parent_table,
        pc = parent_col,
        pf = parent_filter(step, prefix),
    )]
}

fn latest_rescan(step: &PushParentStep, parent_col: &str, child_col: &str) -> Vec<String> {
    let order_by = step
        .order_by_column
        .clone()
        .unwrap_or_else(|| child_col.to_string());
    vec![format!(
        "UPDATE {parent} SET {pc} = (SELECT {cc} FROM {child} WHERE {cf} ORDER BY {ob} DESC LIMIT 1) WHERE {pf};",
        parent = step.parent_table,
        pc = parent_col,
        cc = child_col,
        child = step.child_table,
        cf = child_filter(step, "OLD"),
        ob = order_by,
        pf = parent_filter(step, "OLD"),
    )]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum_step() -> PushParentStep {
        PushParentStep {
            fk_name: "account".to_string(),
            parent_table: "accounts".to_string(),
            child_table: "transactions".to_string(),
            local_fk_columns: vec!["account_fk".to_string()],
            parent_pk_columns: vec!["account_id".to_string()],
            order_by_column: Some("transaction_id".to_string()),
            aggregations: vec![("balance".to_string(), AutomationType::Sum, "amount".to_string())],
        }
    }

    #[test]
    fn sum_insert_adds_coalesced_amount() {
        let lines = emit(&sum_step(), Operation::Insert);
        assert_eq!(
            lines,
            vec![
                "UPDATE accounts SET balance = balance + COALESCE(NEW.amount, 0) WHERE account_id = NEW.account_fk;"
                    .to_string()
            ]
        );
    }

    #[test]
    fn sum_update_applies_delta_guarded() {
        let lines = emit(&sum_step(), Operation::Update);
        assert_eq!(lines[0], "IF OLD.amount IS DISTINCT FROM NEW.amount THEN");
        assert!(lines[1].contains("balance + COALESCE(NEW.amount, 0) - COALESCE(OLD.amount, 0)"));
    }

    #[test]
    fn sum_delete_subtracts() {
        let lines = emit(&sum_step(), Operation::Delete);
        assert!(lines[0].contains("balance - COALESCE(OLD.amount, 0)"));
        assert!(lines[0].contains("WHERE account_id = OLD.account_fk"));
    }

    #[test]
    fn count_update_is_a_no_op() {
        let mut step = sum_step();
        step.aggregations = vec![("total".to_string(), AutomationType::Count, "amount".to_string())];
        assert!(emit(&step, Operation::Update).is_empty());
    }

    #[test]
    fn max_delete_rescans_child() {
        let mut step = sum_step();
        step.aggregations = vec![("highest".to_string(), AutomationType::Max, "amount".to_string())];
        let lines = emit(&step, Operation::Delete);
        assert!(lines[0].contains("SELECT MAX(amount) FROM transactions"));
        assert!(lines[0].contains("transaction_id <> OLD.transaction_id"));
    }

    #[test]
    fn max_update_rescan_excludes_self_and_folds_in_new_value() {
        let mut step = sum_step();
        step.aggregations = vec![("highest".to_string(), AutomationType::Max, "amount".to_string())];
        let lines = emit(&step, Operation::Update);
        assert!(lines[0].contains("transaction_id <> NEW.transaction_id"));
        assert!(lines[0].contains("GREATEST("));
        assert!(lines[0].contains("NEW.amount"));
    }

    #[test]
    fn min_delete_rescan_excludes_self() {
        let mut step = sum_step();
        step.aggregations = vec![("lowest".to_string(), AutomationType::Min, "amount".to_string())];
        let lines = emit(&step, Operation::Delete);
        assert!(lines[0].contains("SELECT MIN(amount) FROM transactions"));
        assert!(lines[0].contains("transaction_id <> OLD.transaction_id"));
    }

    #[test]
    fn latest_delete_rescan_excludes_self() {
        let mut step = sum_step();
        step.aggregations = vec![("newest".to_string(), AutomationType::Latest, "amount".to_string())];
        let lines = emit(&step, Operation::Delete);
        assert!(lines[0].contains("transaction_id <> OLD.transaction_id"));
        assert!(lines[0].contains("ORDER BY transaction_id DESC LIMIT 1"));
    }

    #[test]
    fn no_child_pk_omits_exclusion_clause() {
        let mut step = sum_step();
        step.order_by_column = None;
        step.aggregations = vec![("highest".to_string(), AutomationType::Max, "amount".to_string())];
        let lines = emit(&step, Operation::Delete);
        assert!(!lines[0].contains("<>"));
    }
}
