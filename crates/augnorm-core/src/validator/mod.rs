//! # Validator
//!
//! Rejects malformed or semantically unsafe schemas before any downstream
//! stage runs. Checks cross-references (§4.1): column-inheritance targets
//! resolve, automation `table`/`foreign_key`/`column` triples resolve,
//! foreign-key targets exist, `automation`/`calculated` are mutually
//! exclusive, and `sync` targets exist. Errors accumulate — a single call
//! reports as much as possible instead of stopping at the first problem.

use indexmap::IndexMap;

use crate::ast::{AutomationDirective, ColumnDef, SchemaDocument};
use crate::error::{CompileError, ValidationResult};
use crate::processor::inheritance;

/// Cross-reference checks only (§4.1, checks 1–9). Does not repeat any
/// syntactic/document-shape validation that the external loader already
/// performed.
pub fn validate_cross_references(schema: &SchemaDocument) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (table_name, table_def) in &schema.tables {
        let (resolved_columns, inherit_errors) =
            inheritance::resolve_table_columns(table_name, table_def, &schema.columns);
        for err in inherit_errors {
            result.push(err);
        }

        for (column_name, column) in &resolved_columns {
            check_column(schema, table_name, column_name, column, &mut result);
        }

        for (fk_name, fk) in &table_def.foreign_keys {
            if !schema.tables.contains_key(&fk.table) {
                result.push(CompileError::UnknownTable {
                    referrer: format!("table '{}', foreign key '{}'", table_name, fk_name),
                    referenced: fk.table.clone(),
                });
            }
        }

        for sync_target in table_def.sync.keys() {
            if !schema.tables.contains_key(sync_target) {
                result.push(CompileError::UnknownTable {
                    referrer: format!("table '{}', sync target", table_name),
                    referenced: sync_target.clone(),
                });
            }
        }

        for spread_target in table_def.spread.keys() {
            if !schema.tables.contains_key(spread_target) {
                result.push(CompileError::UnknownTable {
                    referrer: format!("table '{}', spread target", table_name),
                    referenced: spread_target.clone(),
                });
            }
        }
    }

    result
}

/// Full validation: cross-reference checks (syntactic/document-shape
/// validation is the external loader's responsibility — see SPEC_FULL.md
/// §6 — and is composed in ahead of this call by the caller).
pub fn validate(schema: &SchemaDocument) -> ValidationResult {
    validate_cross_references(schema)
}

fn check_column(
    schema: &SchemaDocument,
    table_name: &str,
    column_name: &str,
    column: &ColumnDef,
    result: &mut ValidationResult,
) {
    if column.has_automation_and_calculated() {
        result.push(CompileError::MutualExclusion {
            table: table_name.to_string(),
            column: column_name.to_string(),
        });
    }

    if let Some(reason) = column_shape_violation(column) {
        result.push(CompileError::InvalidColumnShape {
            table: table_name.to_string(),
            column: column_name.to_string(),
            reason,
        });
    }

    if let Some(automation) = &column.automation {
        check_automation(schema, table_name, column_name, automation, result);
    }
}

fn column_shape_violation(column: &ColumnDef) -> Option<String> {
    use crate::ast::SizeRequirement;

    match column.sql_type.size_requirement() {
        SizeRequirement::Required if column.size.is_none() => Some(format!(
            "type '{:?}' requires a `size`",
            column.sql_type
        )),
        SizeRequirement::Prohibited if column.size.is_some() => Some(format!(
            "type '{:?}' does not accept a `size`",
            column.sql_type
        )),
        _ => {
            if column.decimal.is_some() && column.size.is_none() {
                Some("`decimal` requires `size`".to_string())
            } else {
                None
            }
        }
    }
}

fn check_automation(
    schema: &SchemaDocument,
    table_name: &str,
    column_name: &str,
    automation: &AutomationDirective,
    result: &mut ValidationResult,
) {
    let site = format!("table '{}', column '{}'", table_name, column_name);

    let Some(other_table) = schema.tables.get(&automation.table) else {
        result.push(CompileError::UnknownTable {
            referrer: site,
            referenced: automation.table.clone(),
        });
        return;
    };

    if automation.automation_type.is_aggregation() {
        // Declared on the parent (table_name); `table` is the child, whose
        // FKs must contain `foreign_key`.
        if !other_table.foreign_keys.contains_key(&automation.foreign_key) {
            result.push(CompileError::UnknownFK {
                referrer: site,
                fk_name: automation.foreign_key.clone(),
                stated_table: automation.table.clone(),
            });
        }
    } else {
        // Cascade: declared on the child (table_name); `foreign_key` must
        // be declared on *this* table, not on `automation.table`.
        let this_table_fks = table_foreign_keys(schema, table_name);
        if !this_table_fks.contains_key(&automation.foreign_key) {
            result.push(CompileError::UnknownFK {
                referrer: site,
                fk_name: automation.foreign_key.clone(),
                stated_table: table_name.to_string(),
            });
        }
    }
}

fn table_foreign_keys<'a>(
    schema: &'a SchemaDocument,
    table_name: &str,
) -> IndexMap<String, crate::ast::ForeignKeyDirective> {
    schema
        .tables
        .get(table_name)
        .map(|t| t.foreign_keys.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{
        AutomationType, ForeignKeyDirective, SqlType, TableColumnEntry, TableDef,
    };

    fn int_column() -> ColumnDef {
        ColumnDef {
            sql_type: SqlType::Integer,
            size: None,
            decimal: None,
            primary_key: false,
            unique: false,
            sequence: false,
            automation: None,
            calculated: None,
        }
    }

    #[test]
    fn missing_inherit_is_reported() {
        let mut schema = SchemaDocument::default();
        let mut table = TableDef::default();
        table.columns.insert("ghost".to_string(), None);
        schema.tables.insert("t".to_string(), table);

        let result = validate_cross_references(&schema);
        assert!(!result.is_ok());
        assert!(matches!(
            result.errors[0],
            CompileError::MissingInherit { .. }
        ));
    }

    #[test]
    fn mutual_exclusion_is_reported() {
        let mut schema = SchemaDocument::default();
        let mut col = int_column();
        col.calculated = Some("1 + 1".to_string());
        col.automation = Some(AutomationDirective {
            automation_type: AutomationType::Sum,
            table: "other".to_string(),
            foreign_key: "fk".to_string(),
            column: "amount".to_string(),
        });
        schema.columns.insert("bad".to_string(), col);

        let mut table = TableDef::default();
        table.columns.insert(
            "bad".to_string(),
            Some(TableColumnEntry::Inherit("bad".to_string())),
        );
        schema.tables.insert("t".to_string(), table);
        schema.tables.insert("other".to_string(), TableDef::default());

        let result = validate_cross_references(&schema);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, CompileError::MutualExclusion { .. })));
    }

    #[test]
    fn unknown_fk_target_table_is_reported() {
        let mut schema = SchemaDocument::default();
        let mut table = TableDef::default();
        table.foreign_keys.insert(
            "parent_fk".to_string(),
            ForeignKeyDirective {
                table: "ghost".to_string(),
                prefix: None,
                suffix: None,
                on_delete: Default::default(),
            },
        );
        schema.tables.insert("t".to_string(), table);

        let result = validate_cross_references(&schema);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, CompileError::UnknownTable { .. })));
    }

    #[test]
    fn cascade_requires_fk_on_declaring_table() {
        let mut schema = SchemaDocument::default();

        let mut child_col = int_column();
        child_col.automation = Some(AutomationDirective {
            automation_type: AutomationType::Snapshot,
            table: "parent".to_string(),
            foreign_key: "parent_fk".to_string(),
            column: "name".to_string(),
        });
        schema.columns.insert("snap".to_string(), child_col);

        let mut child = TableDef::default();
        child.columns.insert(
            "snap".to_string(),
            Some(TableColumnEntry::Inherit("snap".to_string())),
        );
        // Note: no `parent_fk` declared on `child` — this must be an error.
        schema.tables.insert("child".to_string(), child);
        schema.tables.insert("parent".to_string(), TableDef::default());

        let result = validate_cross_references(&schema);
        assert!(result
            .errors
            .iter()
            .any(|e| matches!(e, CompileError::UnknownFK { .. })));
    }
}
