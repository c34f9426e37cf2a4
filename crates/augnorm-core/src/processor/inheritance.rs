//! Pass 1 of the Schema Processor: column-inheritance resolution.
//!
//! Shared between the Validator (which needs the resolved shape to check
//! mutual exclusion and automation cross-references) and the Schema
//! Processor proper, so both walk the four inheritance variants exactly
//! the same way.

use indexmap::IndexMap;

use crate::ast::{ColumnDef, TableColumnEntry, TableDef};
use crate::error::CompileError;

/// Resolve a single table-column entry to a flat `ColumnDef`.
///
/// `entry == None` is the *null* variant: inherit the reusable column of
/// the same name as `column_key`.
pub fn resolve_column(
    table: &str,
    column_key: &str,
    entry: Option<&TableColumnEntry>,
    reusable_columns: &IndexMap<String, ColumnDef>,
) -> Result<ColumnDef, CompileError> {
    match entry {
        None => reusable_columns
            .get(column_key)
            .cloned()
            .ok_or_else(|| CompileError::MissingInherit {
                table: table.to_string(),
                column: column_key.to_string(),
                missing: column_key.to_string(),
            }),
        Some(TableColumnEntry::Inherit(source)) => reusable_columns
            .get(source)
            .cloned()
            .ok_or_else(|| CompileError::MissingInherit {
                table: table.to_string(),
                column: column_key.to_string(),
                missing: source.clone(),
            }),
        Some(TableColumnEntry::Ref(ref_entry)) => {
            let base = reusable_columns
                .get(&ref_entry.reference)
                .ok_or_else(|| CompileError::MissingRef {
                    table: table.to_string(),
                    column: column_key.to_string(),
                    reference: ref_entry.reference.clone(),
                })?;
            Ok(base.overlaid(&ref_entry.overrides))
        }
        Some(TableColumnEntry::Full(def)) => Ok(def.clone()),
    }
}

/// Resolve every column of one table, collecting errors instead of
/// short-circuiting on the first one.
pub fn resolve_table_columns(
    table: &str,
    table_def: &TableDef,
    reusable_columns: &IndexMap<String, ColumnDef>,
) -> (IndexMap<String, ColumnDef>, Vec<CompileError>) {
    let mut resolved = IndexMap::new();
    let mut errors = Vec::new();

    for (key, entry) in &table_def.columns {
        match resolve_column(table, key, entry.as_ref(), reusable_columns) {
            Ok(def) => {
                resolved.insert(key.clone(), def);
            }
            Err(e) => errors.push(e),
        }
    }

    (resolved, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ColumnOverride, RefColumnEntry, SqlType};

    fn reusable() -> IndexMap<String, ColumnDef> {
        let mut m = IndexMap::new();
        m.insert(
            "id".to_string(),
            ColumnDef {
                sql_type: SqlType::Integer,
                size: None,
                decimal: None,
                primary_key: true,
                unique: false,
                sequence: true,
                automation: None,
                calculated: None,
            },
        );
        m
    }

    #[test]
    fn null_entry_inherits_same_key() {
        let resolved = resolve_column("t", "id", None, &reusable()).unwrap();
        assert_eq!(resolved.sql_type, SqlType::Integer);
        assert!(resolved.primary_key);
    }

    #[test]
    fn null_entry_missing_reports_error() {
        let err = resolve_column("t", "missing", None, &reusable()).unwrap_err();
        assert!(matches!(err, CompileError::MissingInherit { .. }));
    }

    #[test]
    fn string_entry_renames() {
        let entry = TableColumnEntry::Inherit("id".to_string());
        let resolved = resolve_column("t", "account_id", Some(&entry), &reusable()).unwrap();
        assert_eq!(resolved.sql_type, SqlType::Integer);
    }

    #[test]
    fn ref_entry_overlays_fields() {
        let entry = TableColumnEntry::Ref(RefColumnEntry {
            reference: "id".to_string(),
            overrides: ColumnOverride {
                primary_key: Some(false),
                ..Default::default()
            },
        });
        let resolved = resolve_column("t", "other_id", Some(&entry), &reusable()).unwrap();
        assert!(!resolved.primary_key);
        assert_eq!(resolved.sql_type, SqlType::Integer);
    }

    #[test]
    fn ref_entry_missing_target_reports_error() {
        let entry = TableColumnEntry::Ref(RefColumnEntry {
            reference: "ghost".to_string(),
            overrides: ColumnOverride::default(),
        });
        let err = resolve_column("t", "x", Some(&entry), &reusable()).unwrap_err();
        assert!(matches!(err, CompileError::MissingRef { .. }));
    }
}
