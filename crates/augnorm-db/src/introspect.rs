//! # Postgres Introspection
//!
//! Builds a [`DatabaseSnapshot`] from `information_schema`/`pg_catalog`,
//! with a per-concern query-then-merge shape: tables, then columns, then
//! constraints, each its own query grouped by table name. This introspector
//! only needs presence, not full column typing — the Diff Engine only asks
//! "does this name already exist", so each query collects a set of names
//! rather than a typed `Column`/`ForeignKey` record.

use indexmap::IndexMap;
use sqlx::postgres::PgPool;
use sqlx::Row;

use augnorm_core::diff::{DatabaseSnapshot, SnapshotTable};

use crate::error::{DbError, Result};

pub struct PostgresIntrospector {
    pool: PgPool,
    schema_name: String,
}

impl PostgresIntrospector {
    pub fn new(pool: PgPool) -> Self {
        Self::with_schema(pool, "public".to_string())
    }

    pub fn with_schema(pool: PgPool, schema_name: String) -> Self {
        Self { pool, schema_name }
    }

    pub async fn introspect(&self) -> Result<DatabaseSnapshot> {
        tracing::debug!(schema = %self.schema_name, "introspecting database schema");
        let mut tables = self.introspect_tables().await?;
        tracing::debug!(count = tables.len(), "found base tables");
        self.introspect_columns(&mut tables).await?;
        self.introspect_foreign_keys(&mut tables).await?;
        self.introspect_indexes(&mut tables).await?;
        self.introspect_triggers(&mut tables).await?;
        Ok(DatabaseSnapshot { tables })
    }

    async fn introspect_tables(&self) -> Result<IndexMap<String, SnapshotTable>> {
        let rows = sqlx::query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = $1 AND table_type = 'BASE TABLE' ORDER BY table_name",
        )
        .bind(&self.schema_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DbError::Introspection {
            query: "fetch tables".to_string(),
            source: e,
        })?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let name: String = row.get("table_name");
                (name, SnapshotTable::default())
            })
            .collect())
    }

    async fn introspect_columns(&self, tables: &mut IndexMap<String, SnapshotTable>) -> Result<()> {
        let rows = sqlx::query(
            "SELECT table_name, column_name FROM information_schema.columns \
             WHERE table_schema = $1 ORDER BY table_name, ordinal_position",
        )
        .bind(&self.schema_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DbError::Introspection {
            query: "fetch columns".to_string(),
            source: e,
        })?;

        for row in rows {
            let table_name: String = row.get("table_name");
            let column_name: String = row.get("column_name");
            if let Some(table) = tables.get_mut(&table_name) {
                table.columns.insert(column_name);
            } else {
                tracing::warn!(table = %table_name, "column belongs to a table missed by the base-table scan");
            }
        }
        Ok(())
    }

    async fn introspect_foreign_keys(&self, tables: &mut IndexMap<String, SnapshotTable>) -> Result<()> {
        let rows = sqlx::query(
            "SELECT tc.table_name, tc.constraint_name \
             FROM information_schema.table_constraints tc \
             WHERE tc.table_schema = $1 AND tc.constraint_type = 'FOREIGN KEY' \
             ORDER BY tc.table_name, tc.constraint_name",
        )
        .bind(&self.schema_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DbError::Introspection {
            query: "fetch foreign keys".to_string(),
            source: e,
        })?;

        for row in rows {
            let table_name: String = row.get("table_name");
            let constraint_name: String = row.get("constraint_name");
            if let Some(table) = tables.get_mut(&table_name) {
                table.foreign_keys.insert(constraint_name);
            }
        }
        Ok(())
    }

    async fn introspect_indexes(&self, tables: &mut IndexMap<String, SnapshotTable>) -> Result<()> {
        let rows = sqlx::query(
            "SELECT tablename, indexname FROM pg_indexes WHERE schemaname = $1 \
             ORDER BY tablename, indexname",
        )
        .bind(&self.schema_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DbError::Introspection {
            query: "fetch indexes".to_string(),
            source: e,
        })?;

        for row in rows {
            let table_name: String = row.get("tablename");
            let index_name: String = row.get("indexname");
            if let Some(table) = tables.get_mut(&table_name) {
                table.indexes.insert(index_name);
            }
        }
        Ok(())
    }

    async fn introspect_triggers(&self, tables: &mut IndexMap<String, SnapshotTable>) -> Result<()> {
        let rows = sqlx::query(
            "SELECT event_object_table AS table_name, trigger_name \
             FROM information_schema.triggers WHERE trigger_schema = $1 \
             ORDER BY event_object_table, trigger_name",
        )
        .bind(&self.schema_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DbError::Introspection {
            query: "fetch triggers".to_string(),
            source: e,
        })?;

        for row in rows {
            let table_name: String = row.get("table_name");
            let trigger_name: String = row.get("trigger_name");
            if let Some(table) = tables.get_mut(&table_name) {
                table.triggers.insert(trigger_name);
            }
        }
        Ok(())
    }
}
