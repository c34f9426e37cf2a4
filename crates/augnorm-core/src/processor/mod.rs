//! # Schema Processor
//!
//! Turns a raw [`SchemaDocument`] into a [`ProcessedSchema`]: every table's
//! columns fully resolved (Pass 1, [`inheritance`]) and every foreign key's
//! local column(s) synthesized from its target's primary key (Pass 2,
//! [`fk_synthesis`]). Downstream stages (dependency graph, diff, trigger
//! generator) only ever see `ProcessedSchema` — they never walk the raw
//! inheritance/`$ref` structure themselves.
//!
//! Assumes the document already passed [`crate::validator::validate`]:
//! inheritance and cross-reference errors are treated as internal
//! invariant violations here, not user-facing ones, except
//! [`crate::error::CompileError::MissingPrimaryKey`], which the validator
//! does not check (it requires Pass-1 output to detect).

pub mod fk_synthesis;
pub mod inheritance;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::ast::{ColumnDef, SchemaDocument, SpreadDirective, SyncDirective, UiNote};
use crate::error::{CompileError, Result};
use fk_synthesis::ResolvedForeignKey;

/// One table after both processing passes. `columns` and
/// `generated_columns` never share a name (§3 invariant).
#[derive(Debug, Clone)]
pub struct ProcessedTable {
    pub columns: IndexMap<String, ColumnDef>,
    pub generated_columns: IndexMap<String, ColumnDef>,
    pub foreign_keys: IndexMap<String, ResolvedForeignKey>,
    pub ui_notes: Vec<UiNote>,
    pub sync: IndexMap<String, SyncDirective>,
    pub spread: IndexMap<String, SpreadDirective>,
    pub content: Vec<IndexMap<String, serde_json::Value>>,
}

impl ProcessedTable {
    /// Declared primary-key columns. Generated FK columns are never
    /// primary keys, so only `columns` needs checking.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, def)| def.primary_key)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.get(name).or_else(|| self.generated_columns.get(name))
    }

    /// Every column name, explicit and generated — what the calculated-
    /// column graph and `NEW.`-qualifier treat as in-scope identifiers.
    pub fn all_column_names(&self) -> HashSet<String> {
        self.columns
            .keys()
            .chain(self.generated_columns.keys())
            .cloned()
            .collect()
    }
}

/// A fully resolved schema, ready for the dependency graph and trigger
/// generator.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSchema {
    pub tables: IndexMap<String, ProcessedTable>,
}

impl ProcessedSchema {
    pub fn table(&self, name: &str) -> Option<&ProcessedTable> {
        self.tables.get(name)
    }
}

/// Run both passes over every table in `schema`.
pub fn process_schema(schema: &SchemaDocument) -> Result<ProcessedSchema> {
    // Pass 1: column inheritance, independent per table.
    let mut pass1 = IndexMap::new();
    for (table_name, table_def) in &schema.tables {
        let (resolved, errors) =
            inheritance::resolve_table_columns(table_name, table_def, &schema.columns);
        if let Some(first) = errors.into_iter().next() {
            return Err(first);
        }
        pass1.insert(table_name.clone(), resolved);
    }

    // Pass 2: FK column synthesis, reading other tables' Pass-1 columns.
    let mut tables = IndexMap::new();
    for (table_name, table_def) in &schema.tables {
        let columns = pass1
            .get(table_name)
            .cloned()
            .ok_or_else(|| CompileError::Internal(format!("table '{table_name}' missing from Pass 1")))?;

        let mut generated_columns = IndexMap::new();
        let mut foreign_keys = IndexMap::new();
        for (fk_name, fk) in &table_def.foreign_keys {
            let target_columns = pass1.get(&fk.table).ok_or_else(|| CompileError::Internal(
                format!("foreign key '{fk_name}' on '{table_name}' targets unresolved table '{}'", fk.table),
            ))?;

            let (resolved_fk, synthesized) =
                fk_synthesis::synthesize_fk(table_name, fk_name, fk, target_columns)?;

            generated_columns.extend(synthesized);
            foreign_keys.insert(fk_name.clone(), resolved_fk);
        }

        tables.insert(
            table_name.clone(),
            ProcessedTable {
                columns,
                generated_columns,
                foreign_keys,
                ui_notes: table_def.ui_notes.clone(),
                sync: table_def.sync.clone(),
                spread: table_def.spread.clone(),
                content: table_def.content.clone(),
            },
        );
    }

    Ok(ProcessedSchema { tables })
}
