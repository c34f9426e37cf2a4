//! # Statement Executor
//!
//! Applies the SQL strings the core crate renders, inside one transaction —
//! an all-or-nothing guarantee over DDL rather than batched row inserts.

use sqlx::postgres::PgPool;

use crate::error::{DbError, Result};

pub struct Executor {
    pool: PgPool,
}

impl Executor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run every statement in order inside a single transaction. Rolls back
    /// entirely on the first failure.
    pub async fn apply(&self, statements: &[String]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::Connect)?;
        let total = statements.len();
        tracing::debug!(total, "applying statements in a single transaction");

        for (index, statement) in statements.iter().enumerate() {
            sqlx::raw_sql(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::warn!(index, total, "statement failed, rolling back transaction");
                    DbError::Execution {
                        index,
                        total,
                        statement: statement.clone(),
                        source: e,
                    }
                })?;
        }

        tx.commit().await.map_err(DbError::Connect)?;
        tracing::debug!(total, "transaction committed");
        Ok(())
    }
}
