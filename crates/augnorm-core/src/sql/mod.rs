//! # SQL Emitter
//!
//! Turns a [`SchemaDiff`] into dialect-specific DDL strings, and a
//! [`ProcessedSchema`] plus its gathered [`TableAutomations`] into trigger
//! procedure/trigger DDL via [`crate::trigger`]. Column type mapping and
//! DEFAULT clauses are delegated to a [`SqlDialect`] so a second database
//! backend only needs to implement that trait.

pub mod types;

use crate::diff::SchemaDiff;
use crate::processor::ProcessedSchema;
use crate::trigger::{self, TableAutomations};
pub use types::{Postgres, SqlDialect};

/// Render every additive operation in `diff` as standalone DDL statements,
/// in dependency order: tables, then columns, then foreign keys, then
/// indexes. Does not include trigger DDL — see [`render_triggers`].
pub fn render_diff(diff: &SchemaDiff, processed: &ProcessedSchema, dialect: &dyn SqlDialect) -> Vec<String> {
    let mut stmts = Vec::new();

    for table_name in &diff.tables_to_create {
        if let Some(table) = processed.table(table_name) {
            stmts.push(render_create_table(table_name, table, dialect));
        }
    }

    for column in &diff.columns_to_add {
        let def = processed
            .table(&column.table)
            .and_then(|t| t.column(&column.column));
        let Some(def) = def else { continue };
        stmts.push(format!(
            "ALTER TABLE {table} ADD COLUMN {column} {ty};",
            table = column.table,
            column = column.column,
            ty = dialect.column_type(def),
        ));
    }

    for fk in &diff.foreign_keys_to_add {
        let on_delete = render_delete_policy(fk.on_delete);
        stmts.push(format!(
            "ALTER TABLE {table} ADD CONSTRAINT {name} FOREIGN KEY ({local}) REFERENCES {target}({target_cols}){on_delete};",
            table = fk.table,
            name = fk.constraint_name,
            local = fk.local_columns.join(", "),
            target = fk.target_table,
            target_cols = fk.target_columns.join(", "),
        ));
    }

    for idx in &diff.indexes_to_create {
        stmts.push(format!(
            "CREATE UNIQUE INDEX {name} ON {table}({column});",
            name = idx.index_name,
            table = idx.table,
            column = idx.column,
        ));
    }

    stmts
}

fn render_delete_policy(policy: crate::ast::DeletePolicy) -> String {
    use crate::ast::DeletePolicy;
    match policy {
        DeletePolicy::NoAction => String::new(),
        DeletePolicy::Cascade => " ON DELETE CASCADE".to_string(),
        DeletePolicy::Restrict => " ON DELETE RESTRICT".to_string(),
        DeletePolicy::SetNull => " ON DELETE SET NULL".to_string(),
    }
}

fn render_create_table(
    table_name: &str,
    table: &crate::processor::ProcessedTable,
    dialect: &dyn SqlDialect,
) -> String {
    let mut lines = Vec::new();
    let primary_keys = table.primary_key_columns();

    for (name, def) in table.columns.iter().chain(table.generated_columns.iter()) {
        let mut line = format!("  {name} {}", dialect.column_type(def));
        if let Some(automation) = &def.automation {
            if automation.automation_type.is_aggregation() {
                if let Some(default) = dialect.aggregation_default(def.sql_type) {
                    line.push_str(&format!(" DEFAULT {default}"));
                }
            }
        }
        if def.unique && !def.primary_key {
            line.push_str(" UNIQUE");
        }
        lines.push(line);
    }

    if !primary_keys.is_empty() {
        lines.push(format!("  PRIMARY KEY ({})", primary_keys.join(", ")));
    }

    format!("CREATE TABLE {table_name} (\n{}\n);", lines.join(",\n"))
}

/// Render the trigger DDL for every table in `processed`, gathering
/// automations once for the whole schema.
pub fn render_triggers(processed: &ProcessedSchema) -> crate::error::Result<Vec<String>> {
    let automations = trigger::gather_automations(processed)?;
    let empty = TableAutomations::default();

    Ok(processed
        .tables
        .iter()
        .flat_map(|(table_name, table)| {
            let table_automations = automations.get(table_name).unwrap_or(&empty);
            trigger::emit_table_triggers(table_name, table, table_automations)
        })
        .collect())
}

/// Drop every previously generated trigger function before recreating,
/// matching the executor's unconditional-drop contract (§4.7).
pub fn render_trigger_drops(tables: &[String]) -> Vec<String> {
    let ops = ["insert", "update", "delete"];
    tables
        .iter()
        .flat_map(|table| {
            ops.iter().map(move |op| {
                format!(
                    "DROP TRIGGER IF EXISTS {table}_before_{op}_genlogic ON {table}; \
DROP FUNCTION IF EXISTS {table}_before_{op}_genlogic();"
                )
            })
        })
        .collect()
}
