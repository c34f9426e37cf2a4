//! SYNC step: mirror row changes from the declaring table into a target
//! table. `match_columns` always travels (source value on write, target
//! value in the WHERE on update/delete); `column_map` is additional data
//! copied one-way; `literals` are constants written on INSERT only.

use crate::ast::{SyncDirection, SyncDirective, SyncOp};

use super::Operation;

pub fn emit(target_table: &str, directive: &SyncDirective, op: Operation) -> Vec<String> {
    if !matches!(directive.direction, SyncDirection::Push) {
        // `pull`/`bidirectional` fire on the target's own trigger, not here.
        return Vec::new();
    }
    if !directive.operations.contains(&sync_op(op)) {
        return Vec::new();
    }

    match op {
        Operation::Insert => vec![emit_insert(target_table, directive)],
        Operation::Update => vec![emit_update(target_table, directive)],
        Operation::Delete => vec![emit_delete(target_table, directive)],
    }
}

fn sync_op(op: Operation) -> SyncOp {
    match op {
        Operation::Insert => SyncOp::Insert,
        Operation::Update => SyncOp::Update,
        Operation::Delete => SyncOp::Delete,
    }
}

fn emit_insert(target_table: &str, directive: &SyncDirective) -> String {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (source_col, target_col) in &directive.match_columns {
        columns.push(target_col.clone());
        values.push(format!("NEW.{source_col}"));
    }
    for (source_col, target_col) in &directive.column_map {
        columns.push(target_col.clone());
        values.push(format!("NEW.{source_col}"));
    }
    for (target_col, literal) in &directive.literals {
        columns.push(target_col.clone());
        values.push(render_literal(literal));
    }

    format!(
        "INSERT INTO {target_table}({cols}) VALUES({vals});",
        cols = columns.join(", "),
        vals = values.join(", "),
    )
}

fn emit_update(target_table: &str, directive: &SyncDirective) -> String {
    let mut set_clauses: Vec<String> = directive
        .match_columns
        .iter()
        .map(|(source_col, target_col)| format!("{target_col} = NEW.{source_col}"))
        .collect();
    set_clauses.extend(
        directive
            .column_map
            .iter()
            .map(|(source_col, target_col)| format!("{target_col} = NEW.{source_col}")),
    );

    let where_clause = where_clause(directive, "OLD");

    format!(
        "UPDATE {target_table} SET {set} WHERE {where_clause};",
        set = set_clauses.join(", "),
    )
}

fn emit_delete(target_table: &str, directive: &SyncDirective) -> String {
    format!(
        "DELETE FROM {target_table} WHERE {where_clause};",
        where_clause = where_clause(directive, "OLD"),
    )
}

fn where_clause(directive: &SyncDirective, prefix: &str) -> String {
    let mut predicates: Vec<String> = directive
        .match_columns
        .iter()
        .map(|(source_col, target_col)| format!("{target_col} = {prefix}.{source_col}"))
        .collect();
    predicates.extend(directive.match_conditions.iter().cloned());
    predicates.join(" AND ")
}

pub(crate) fn render_literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn directive() -> SyncDirective {
        let mut match_columns = IndexMap::new();
        match_columns.insert("key_col".to_string(), "t_key".to_string());
        SyncDirective {
            direction: SyncDirection::Push,
            operations: vec![SyncOp::Insert, SyncOp::Update, SyncOp::Delete],
            match_columns,
            match_conditions: Vec::new(),
            column_map: IndexMap::new(),
            literals: IndexMap::new(),
        }
    }

    #[test]
    fn update_uses_old_for_where_and_new_for_set() {
        let lines = emit("target", &directive(), Operation::Update);
        assert_eq!(
            lines,
            vec!["UPDATE target SET t_key = NEW.key_col WHERE t_key = OLD.key_col;".to_string()]
        );
    }

    #[test]
    fn insert_builds_value_list_from_match_and_literals() {
        let mut d = directive();
        d.literals.insert("source".to_string(), serde_json::json!("import"));
        let lines = emit("target", &d, Operation::Insert);
        assert!(lines[0].starts_with("INSERT INTO target("));
        assert!(lines[0].contains("'import'"));
    }

    #[test]
    fn pull_direction_emits_nothing_here() {
        let mut d = directive();
        d.direction = SyncDirection::Pull;
        assert!(emit("target", &d, Operation::Insert).is_empty());
    }

    #[test]
    fn op_not_in_directive_list_is_skipped() {
        let mut d = directive();
        d.operations = vec![SyncOp::Insert];
        assert!(emit("target", &d, Operation::Delete).is_empty());
    }
}
