//! # Diff Engine
//!
//! Compares a [`ProcessedSchema`] against a [`DatabaseSnapshot`] supplied by
//! the external introspector and produces an additive [`SchemaDiff`] — new
//! tables, new columns, new foreign keys, new unique indexes, and the set
//! of tables whose generated triggers must be recreated. Nothing is ever
//! marked for removal: the compiler is strictly additive (§1).

use indexmap::{IndexMap, IndexSet};

use crate::ast::{DeletePolicy, SqlType};
use crate::processor::ProcessedSchema;

/// The shape of one table as observed in the live database.
#[derive(Debug, Clone, Default)]
pub struct SnapshotTable {
    pub columns: IndexSet<String>,
    /// Constraint names, e.g. `fk_orders_customer`.
    pub foreign_keys: IndexSet<String>,
    /// Index names.
    pub indexes: IndexSet<String>,
    /// Trigger names.
    pub triggers: IndexSet<String>,
}

/// A point-in-time snapshot of the live database, as produced by the
/// external introspector (`augnorm-db::introspect`).
#[derive(Debug, Clone, Default)]
pub struct DatabaseSnapshot {
    pub tables: IndexMap<String, SnapshotTable>,
}

impl DatabaseSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct ColumnToAdd {
    pub table: String,
    pub column: String,
    pub sql_type: SqlType,
    pub size: Option<u32>,
    pub decimal: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct ForeignKeyToAdd {
    pub table: String,
    pub constraint_name: String,
    pub local_columns: Vec<String>,
    pub target_table: String,
    pub target_columns: Vec<String>,
    pub on_delete: DeletePolicy,
}

#[derive(Debug, Clone)]
pub struct IndexToCreate {
    pub table: String,
    pub index_name: String,
    pub column: String,
}

/// The additive set of DDL operations needed to bring the live database up
/// to date with the processed schema. Never carries a drop/remove slot.
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub tables_to_create: Vec<String>,
    pub columns_to_add: Vec<ColumnToAdd>,
    pub foreign_keys_to_add: Vec<ForeignKeyToAdd>,
    pub indexes_to_create: Vec<IndexToCreate>,
    /// Every processed table — the executor drops every `_genlogic`
    /// trigger unconditionally before recreating, so this list does not
    /// participate in `is_empty()`.
    pub triggers_to_recreate: Vec<String>,
}

impl SchemaDiff {
    /// Whether any actual DDL change is needed. Deliberately excludes
    /// `triggers_to_recreate`: trigger bodies are always regenerated, so a
    /// non-empty trigger list alone does not mean the schema drifted.
    pub fn is_empty(&self) -> bool {
        self.tables_to_create.is_empty()
            && self.columns_to_add.is_empty()
            && self.foreign_keys_to_add.is_empty()
            && self.indexes_to_create.is_empty()
    }

    /// Human-readable summary for `diff`/`compile --dry-run` output.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No schema drift detected.".to_string();
        }

        let mut lines = vec!["Schema drift detected:".to_string()];

        for t in &self.tables_to_create {
            lines.push(format!("  + table: {t}"));
        }
        for c in &self.columns_to_add {
            lines.push(format!("  + column: {}.{}", c.table, c.column));
        }
        for fk in &self.foreign_keys_to_add {
            lines.push(format!(
                "  + foreign key: {}.{} ({})",
                fk.table, fk.constraint_name, fk.target_table
            ));
        }
        for idx in &self.indexes_to_create {
            lines.push(format!("  + index: {}.{} ({})", idx.table, idx.index_name, idx.column));
        }

        lines.join("\n")
    }
}

fn constraint_name(table: &str, fk_name: &str) -> String {
    format!("fk_{table}_{fk_name}")
}

fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

/// Compute the additive diff between `processed` and `snapshot`.
pub fn diff_schema(processed: &ProcessedSchema, snapshot: &DatabaseSnapshot) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    for (table_name, table) in &processed.tables {
        let existing = snapshot.tables.get(table_name);

        if existing.is_none() {
            diff.tables_to_create.push(table_name.clone());
        }
        let existing_columns = existing.map(|t| &t.columns);
        let existing_fks = existing.map(|t| &t.foreign_keys);
        let existing_indexes = existing.map(|t| &t.indexes);

        for (column_name, def) in table.columns.iter().chain(table.generated_columns.iter()) {
            let already_present = existing_columns.is_some_and(|cols| cols.contains(column_name));
            if !already_present {
                diff.columns_to_add.push(ColumnToAdd {
                    table: table_name.clone(),
                    column: column_name.clone(),
                    sql_type: def.sql_type,
                    size: def.size,
                    decimal: def.decimal,
                });
            }
            if def.unique && !def.primary_key {
                let idx_name = index_name(table_name, column_name);
                let already_indexed = existing_indexes.is_some_and(|idxs| idxs.contains(&idx_name));
                if !already_indexed {
                    diff.indexes_to_create.push(IndexToCreate {
                        table: table_name.clone(),
                        index_name: idx_name,
                        column: column_name.clone(),
                    });
                }
            }
        }

        for (fk_name, fk) in &table.foreign_keys {
            let name = constraint_name(table_name, fk_name);
            let already_present = existing_fks.is_some_and(|fks| fks.contains(&name));
            if !already_present {
                diff.foreign_keys_to_add.push(ForeignKeyToAdd {
                    table: table_name.clone(),
                    constraint_name: name,
                    local_columns: fk.generated_column_names(),
                    target_table: fk.target_table.clone(),
                    target_columns: fk.column_mapping.keys().cloned().collect(),
                    on_delete: fk.on_delete,
                });
            }
        }

        diff.triggers_to_recreate.push(table_name.clone());
    }

    diff
}
