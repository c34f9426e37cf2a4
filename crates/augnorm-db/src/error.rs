//! Error type for the introspector and executor. Kept separate from
//! [`augnorm_core::CompileError`] — this crate is the only place that
//! touches a real connection, so its errors carry `sqlx::Error` directly.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("connecting to database: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("introspecting database ({query}): {source}")]
    Introspection {
        query: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("executing statement {index} of {total}: {source}\n  statement: {statement}")]
    Execution {
        index: usize,
        total: usize,
        statement: String,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;
