//! Pass 2 of the Schema Processor: foreign-key column synthesis.
//!
//! A `foreign_keys` entry never declares its own column — the column (or
//! columns, for a composite primary key) is derived from the target
//! table's primary-key columns, named with the directive's `prefix`/
//! `suffix`, or by convention when neither is given. Synthesized columns
//! live in [`crate::processor::ProcessedTable::generated_columns`], kept
//! apart from the explicit `columns` map per the processed-schema
//! invariant that no name appears in both.

use indexmap::IndexMap;

use crate::ast::{ColumnDef, DeletePolicy, ForeignKeyDirective};
use crate::error::CompileError;

/// A foreign key after Pass 2: the local column(s) it was synthesized into,
/// keyed by the target table's primary-key column name, in declaration
/// order.
#[derive(Debug, Clone)]
pub struct ResolvedForeignKey {
    pub target_table: String,
    pub on_delete: DeletePolicy,
    pub column_mapping: IndexMap<String, String>,
}

impl ResolvedForeignKey {
    /// The synthesized column name, for the common single-column case.
    pub fn single_column(&self) -> Option<&str> {
        if self.column_mapping.len() == 1 {
            self.column_mapping.values().next().map(String::as_str)
        } else {
            None
        }
    }

    /// The ordered list of generated child column names, matching the
    /// target's primary-key order — `fkColumnMapping[fkName]` in §3.
    pub fn generated_column_names(&self) -> Vec<String> {
        self.column_mapping.values().cloned().collect()
    }
}

/// Synthesize the local columns for one foreign key, given the already
/// Pass-1-resolved explicit columns of its target table.
pub fn synthesize_fk(
    table: &str,
    fk_name: &str,
    fk: &ForeignKeyDirective,
    target_columns: &IndexMap<String, ColumnDef>,
) -> Result<(ResolvedForeignKey, IndexMap<String, ColumnDef>), CompileError> {
    let primary_keys: Vec<(&String, &ColumnDef)> = target_columns
        .iter()
        .filter(|(_, def)| def.primary_key)
        .collect();

    if primary_keys.is_empty() {
        return Err(CompileError::MissingPrimaryKey {
            table: table.to_string(),
            fk_name: fk_name.to_string(),
        });
    }

    let mut column_mapping = IndexMap::new();
    let mut generated = IndexMap::new();

    for (pk_name, pk_def) in &primary_keys {
        let column_name = synthesized_column_name(fk_name, fk, pk_name, primary_keys.len());

        let mut column_def = (*pk_def).clone();
        column_def.primary_key = false;
        column_def.sequence = false;
        column_def.unique = false;
        column_def.automation = None;
        column_def.calculated = None;

        column_mapping.insert((*pk_name).clone(), column_name.clone());
        generated.insert(column_name, column_def);
    }

    Ok((
        ResolvedForeignKey {
            target_table: fk.table.clone(),
            on_delete: fk.on_delete,
            column_mapping,
        },
        generated,
    ))
}

fn synthesized_column_name(
    fk_name: &str,
    fk: &ForeignKeyDirective,
    pk_name: &str,
    pk_count: usize,
) -> String {
    if let Some(prefix) = &fk.prefix {
        return format!("{prefix}{pk_name}");
    }
    if let Some(suffix) = &fk.suffix {
        return format!("{pk_name}{suffix}");
    }
    if pk_count == 1 {
        fk_name.to_string()
    } else {
        format!("{fk_name}_{pk_name}")
    }
}
