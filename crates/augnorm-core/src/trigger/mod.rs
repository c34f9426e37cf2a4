//! # Trigger Generator
//!
//! Groups every derivation touching a table into a [`TableAutomations`]
//! record ([`gather_automations`]), then emits the BEFORE-trigger procedure
//! bodies for that table's INSERT/UPDATE/DELETE operations, in the fixed
//! step order: PULL, PUSH-to-children, calculated columns, PUSH-to-parents,
//! SYNC, SPREAD.

pub mod calculated;
pub mod change_detection;
pub mod pull;
pub mod push_children;
pub mod push_parents;
pub mod spread;
pub mod sync;

use indexmap::IndexMap;

use crate::ast::{AutomationDirective, AutomationType, SpreadDirective, SyncDirective};
use crate::error::{CompileError, Result};
use crate::graph::calc_graph;
use crate::processor::{ProcessedSchema, ProcessedTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// A PULL step: this table copies parent column values onto itself via one
/// FK, on its own INSERT/UPDATE. `copies` is `(parent_column, child_column)`.
#[derive(Debug, Clone)]
pub struct PullStep {
    pub fk_name: String,
    pub parent_table: String,
    pub local_fk_columns: Vec<String>,
    pub parent_pk_columns: Vec<String>,
    pub copies: Vec<(String, String)>,
}

/// A PUSH-to-children step: this table (as parent) pushes a FOLLOW column
/// down to a child on its own UPDATE. `copies` is `(parent_column,
/// child_column)`. Never built from SNAPSHOT directives — those only ever
/// produce a [`PullStep`] on the child.
#[derive(Debug, Clone)]
pub struct PushChildStep {
    pub fk_name: String,
    pub child_table: String,
    pub child_fk_columns: Vec<String>,
    pub parent_pk_columns: Vec<String>,
    pub copies: Vec<(String, String)>,
}

/// A PUSH-to-parents step: this table (as child) maintains an aggregation
/// on a parent. `aggregations` is `(parent_column, aggregation_type,
/// child_column)`. `order_by_column` is the child's own primary-key column,
/// used to pick the next-most-recent row when a LATEST rescan is needed.
#[derive(Debug, Clone)]
pub struct PushParentStep {
    pub fk_name: String,
    pub parent_table: String,
    pub child_table: String,
    pub local_fk_columns: Vec<String>,
    pub parent_pk_columns: Vec<String>,
    pub order_by_column: Option<String>,
    pub aggregations: Vec<(String, AutomationType, String)>,
}

/// Every derivation that touches one table, gathered regardless of which
/// side of each directive declared it.
#[derive(Debug, Clone, Default)]
pub struct TableAutomations {
    pub push_to_children: Vec<PushChildStep>,
    pub pull_from_parents: Vec<PullStep>,
    pub calculated_columns: Vec<String>,
    pub push_to_parents: Vec<PushParentStep>,
    pub sync_targets: IndexMap<String, SyncDirective>,
    pub spread_targets: IndexMap<String, SpreadDirective>,
}

impl TableAutomations {
    pub fn is_empty_for(&self, op: Operation) -> bool {
        match op {
            Operation::Insert => {
                self.pull_from_parents.is_empty()
                    && self.push_to_children.is_empty()
                    && self.calculated_columns.is_empty()
                    && self.push_to_parents.is_empty()
                    && self.sync_targets.is_empty()
                    && self.spread_targets.is_empty()
            }
            Operation::Update => {
                self.pull_from_parents.is_empty()
                    && self.push_to_children.is_empty()
                    && self.calculated_columns.is_empty()
                    && self.push_to_parents.is_empty()
                    && self.sync_targets.is_empty()
                    && self.spread_targets.is_empty()
            }
            Operation::Delete => {
                self.push_to_parents.is_empty()
                    && self.sync_targets.is_empty()
                    && self.spread_targets.is_empty()
            }
        }
    }
}

fn automation_directives(table: &ProcessedTable) -> Vec<(String, AutomationDirective)> {
    table
        .columns
        .iter()
        .chain(table.generated_columns.iter())
        .filter_map(|(name, def)| def.automation.clone().map(|a| (name.clone(), a)))
        .collect()
}

/// Group every automation directive in `schema` into a per-table record,
/// regardless of which table's column declared each directive.
pub fn gather_automations(schema: &ProcessedSchema) -> Result<IndexMap<String, TableAutomations>> {
    let mut automations: IndexMap<String, TableAutomations> = schema
        .tables
        .keys()
        .map(|name| (name.clone(), TableAutomations::default()))
        .collect();

    // Slots declared directly on the table itself.
    for (table_name, table) in &schema.tables {
        let order = calc_graph::calculated_column_order(table_name, table)?;

        let mut pulls_by_fk: IndexMap<String, Vec<(String, String)>> = IndexMap::new();
        for (column_name, automation) in automation_directives(table) {
            if automation.automation_type.is_cascade() {
                pulls_by_fk
                    .entry(automation.foreign_key.clone())
                    .or_default()
                    .push((automation.column.clone(), column_name));
            }
        }

        let mut pull_from_parents = Vec::new();
        for (fk_name, copies) in pulls_by_fk {
            let fk = table.foreign_keys.get(&fk_name).ok_or_else(|| {
                CompileError::Internal(format!(
                    "table '{table_name}': automation references undeclared foreign key '{fk_name}'"
                ))
            })?;
            pull_from_parents.push(PullStep {
                fk_name,
                parent_table: fk.target_table.clone(),
                local_fk_columns: fk.generated_column_names(),
                parent_pk_columns: fk.column_mapping.keys().cloned().collect(),
                copies,
            });
        }

        let entry = automations.get_mut(table_name).expect("seeded above");
        entry.calculated_columns = order;
        entry.pull_from_parents = pull_from_parents;
        entry.sync_targets = table.sync.clone();
        entry.spread_targets = table.spread.clone();
    }

    // Slots that belong to the *other* side of the directive: a FOLLOW
    // column declared on a child contributes a push_to_children entry on
    // its parent; an aggregation declared on a parent contributes a
    // push_to_parents entry on its child.
    for (declaring_table, table) in &schema.tables {
        let mut children_by_fk: IndexMap<(String, String), Vec<(String, String)>> = IndexMap::new();
        let mut parents_by_fk: IndexMap<(String, String), Vec<(String, AutomationType, String)>> =
            IndexMap::new();

        for (column_name, automation) in automation_directives(table) {
            match automation.automation_type {
                AutomationType::Follow => {
                    children_by_fk
                        .entry((automation.table.clone(), automation.foreign_key.clone()))
                        .or_default()
                        .push((automation.column.clone(), column_name));
                }
                AutomationType::Snapshot => {}
                other if other.is_aggregation() => {
                    parents_by_fk
                        .entry((automation.table.clone(), automation.foreign_key.clone()))
                        .or_default()
                        .push((column_name, other, automation.column.clone()));
                }
                _ => {}
            }
        }

        for ((parent_table, fk_name), copies) in children_by_fk {
            let fk = table.foreign_keys.get(&fk_name).ok_or_else(|| {
                CompileError::Internal(format!(
                    "table '{declaring_table}': automation references undeclared foreign key '{fk_name}'"
                ))
            })?;
            automations
                .get_mut(&parent_table)
                .ok_or_else(|| CompileError::Internal(format!(
                    "table '{declaring_table}': automation references unknown parent table '{parent_table}'"
                )))?
                .push_to_children
                .push(PushChildStep {
                    fk_name,
                    child_table: declaring_table.clone(),
                    child_fk_columns: fk.generated_column_names(),
                    parent_pk_columns: fk.column_mapping.keys().cloned().collect(),
                    copies,
                });
        }

        for ((child_table, fk_name), aggregations) in parents_by_fk {
            let child = schema.table(&child_table).ok_or_else(|| {
                CompileError::Internal(format!(
                    "table '{declaring_table}': aggregation references unknown table '{child_table}'"
                ))
            })?;
            let fk = child.foreign_keys.get(&fk_name).ok_or_else(|| {
                CompileError::Internal(format!(
                    "table '{child_table}': aggregation on '{declaring_table}' references undeclared foreign key '{fk_name}'"
                ))
            })?;
            let order_by_column = child.primary_key_columns().first().map(|s| s.to_string());
            automations
                .get_mut(&child_table)
                .expect("seeded above")
                .push_to_parents
                .push(PushParentStep {
                    fk_name,
                    parent_table: declaring_table.clone(),
                    child_table: child_table.clone(),
                    local_fk_columns: fk.generated_column_names(),
                    parent_pk_columns: fk.column_mapping.keys().cloned().collect(),
                    order_by_column,
                    aggregations,
                });
        }
    }

    Ok(automations)
}

/// Assemble the full `CREATE OR REPLACE FUNCTION` + `CREATE TRIGGER` pair
/// for one table and one operation, or `None` if every step is empty.
pub fn emit_procedure(
    table_name: &str,
    table: &ProcessedTable,
    automations: &TableAutomations,
    op: Operation,
) -> Option<String> {
    if automations.is_empty_for(op) {
        return None;
    }

    let mut body = Vec::new();

    if matches!(op, Operation::Insert | Operation::Update) {
        for step in &automations.pull_from_parents {
            body.extend(pull::emit(step, op));
        }
        for step in &automations.push_to_children {
            body.extend(push_children::emit(step, op));
        }
        if !automations.calculated_columns.is_empty() {
            body.extend(calculated::emit(table, &automations.calculated_columns));
        }
    }

    for step in &automations.push_to_parents {
        body.extend(push_parents::emit(step, op));
    }
    for (target_table, directive) in &automations.sync_targets {
        body.extend(sync::emit(target_table, directive, op));
    }
    let source_pk = table.primary_key_columns().first().map(|s| s.to_string());
    for (target_table, directive) in &automations.spread_targets {
        body.extend(spread::emit(source_pk.as_deref(), target_table, directive, op));
    }

    if body.is_empty() {
        return None;
    }

    let op_name = match op {
        Operation::Insert => "insert",
        Operation::Update => "update",
        Operation::Delete => "delete",
    };
    let return_value = if matches!(op, Operation::Delete) { "OLD" } else { "NEW" };
    let function_name = format!("{table_name}_before_{op_name}_genlogic");

    let mut stmt = String::new();
    stmt.push_str(&format!("CREATE OR REPLACE FUNCTION {function_name}() RETURNS TRIGGER AS $$\n"));
    if !automations.spread_targets.is_empty() {
        stmt.push_str("DECLARE\n  __spread_d DATE;\n");
    }
    stmt.push_str("BEGIN\n");
    for line in &body {
        stmt.push_str("  ");
        stmt.push_str(line);
        stmt.push('\n');
    }
    stmt.push_str(&format!("  RETURN {return_value};\nEND;\n$$ LANGUAGE plpgsql;\n"));
    stmt.push_str(&format!(
        "CREATE TRIGGER {function_name} BEFORE {op_upper} ON {table_name} FOR EACH ROW EXECUTE FUNCTION {function_name}();",
        op_upper = op_name.to_uppercase(),
    ));

    Some(stmt)
}

/// All non-empty trigger procedures for one table, in INSERT/UPDATE/DELETE
/// order.
pub fn emit_table_triggers(
    table_name: &str,
    table: &ProcessedTable,
    automations: &TableAutomations,
) -> Vec<String> {
    [Operation::Insert, Operation::Update, Operation::Delete]
        .into_iter()
        .filter_map(|op| emit_procedure(table_name, table, automations, op))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnDef, DeletePolicy, SqlType};
    use crate::processor::fk_synthesis::ResolvedForeignKey;

    fn numeric(automation: Option<AutomationDirective>) -> ColumnDef {
        ColumnDef {
            sql_type: SqlType::Numeric,
            size: Some(10),
            decimal: Some(2),
            primary_key: false,
            unique: false,
            sequence: false,
            automation,
            calculated: None,
        }
    }

    fn pk() -> ColumnDef {
        ColumnDef {
            sql_type: SqlType::Integer,
            size: None,
            decimal: None,
            primary_key: true,
            unique: false,
            sequence: true,
            automation: None,
            calculated: None,
        }
    }

    #[test]
    fn aggregation_declared_on_parent_produces_push_to_parents_on_child() {
        let mut customers_columns = IndexMap::new();
        customers_columns.insert("id".to_string(), pk());
        customers_columns.insert(
            "total".to_string(),
            numeric(Some(AutomationDirective {
                automation_type: AutomationType::Sum,
                table: "orders".to_string(),
                foreign_key: "customer".to_string(),
                column: "amount".to_string(),
            })),
        );

        let mut orders_columns = IndexMap::new();
        orders_columns.insert("id".to_string(), pk());
        orders_columns.insert("amount".to_string(), numeric(None));

        let mut orders_fks = IndexMap::new();
        let mut mapping = IndexMap::new();
        mapping.insert("id".to_string(), "customer".to_string());
        orders_fks.insert(
            "customer".to_string(),
            ResolvedForeignKey {
                target_table: "customers".to_string(),
                on_delete: DeletePolicy::NoAction,
                column_mapping: mapping,
            },
        );

        let mut schema = ProcessedSchema::default();
        schema.tables.insert(
            "customers".to_string(),
            ProcessedTable {
                columns: customers_columns,
                generated_columns: IndexMap::new(),
                foreign_keys: IndexMap::new(),
                ui_notes: Vec::new(),
                sync: IndexMap::new(),
                spread: IndexMap::new(),
                content: Vec::new(),
            },
        );
        schema.tables.insert(
            "orders".to_string(),
            ProcessedTable {
                columns: orders_columns,
                generated_columns: IndexMap::new(),
                foreign_keys: orders_fks,
                ui_notes: Vec::new(),
                sync: IndexMap::new(),
                spread: IndexMap::new(),
                content: Vec::new(),
            },
        );

        let automations = gather_automations(&schema).unwrap();
        assert!(automations["customers"].push_to_parents.is_empty());
        let step = &automations["orders"].push_to_parents[0];
        assert_eq!(step.parent_table, "customers");
        assert_eq!(step.aggregations[0].0, "total");
        assert_eq!(step.aggregations[0].2, "amount");
    }

    #[test]
    fn spread_target_emits_declare_block_for_loop_variable() {
        use crate::ast::{SpreadDirective, SpreadGenerate};

        let mut plans_columns = IndexMap::new();
        plans_columns.insert("id".to_string(), pk());
        plans_columns.insert("start_date".to_string(), numeric(None));
        plans_columns.insert("end_date".to_string(), numeric(None));
        plans_columns.insert("interval".to_string(), numeric(None));

        let mut spread = IndexMap::new();
        spread.insert(
            "occurrences".to_string(),
            SpreadDirective {
                generate: SpreadGenerate {
                    start_date: "start_date".to_string(),
                    end_date: "end_date".to_string(),
                    interval: "interval".to_string(),
                },
                column_map: IndexMap::new(),
                literals: IndexMap::new(),
                tracking_column: "plan_fk".to_string(),
            },
        );

        let table = ProcessedTable {
            columns: plans_columns,
            generated_columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            ui_notes: Vec::new(),
            sync: IndexMap::new(),
            spread,
            content: Vec::new(),
        };

        let mut schema = ProcessedSchema::default();
        schema.tables.insert("plans".to_string(), table.clone());

        let automations = gather_automations(&schema).unwrap();
        let stmt = emit_procedure(
            "plans",
            &table,
            &automations["plans"],
            Operation::Insert,
        )
        .expect("spread target produces a non-empty insert trigger");

        assert!(stmt.contains("DECLARE\n  __spread_d DATE;\n"));
        let declare_pos = stmt.find("DECLARE").unwrap();
        let begin_pos = stmt.find("BEGIN").unwrap();
        assert!(declare_pos < begin_pos);
    }
}
