//! # Error Types
//!
//! Defines `CompileError`, the unified error enum for every failure mode in
//! the compiler pipeline (Validator, Schema Processor, Dependency Graph
//! Engine, Trigger Generator). Every variant carries enough context — table
//! name, column name, the offending path — for a user to locate the
//! directive that caused it without re-reading the whole schema.

use thiserror::Error;

/// All errors that can occur while compiling a schema document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Reserved for the external syntactic/document-shape validator; kept in
    /// this enum so the CLI can fold loader errors and core errors into one
    /// `Display` chain.
    #[error("{path}: {message}")]
    SyntaxError { path: String, message: String },

    #[error(
        "table '{table}', column '{column}': no reusable column named '{missing}' in `columns`"
    )]
    MissingInherit {
        table: String,
        column: String,
        missing: String,
    },

    #[error("table '{table}', column '{column}': $ref target '{reference}' is not in `columns`")]
    MissingRef {
        table: String,
        column: String,
        reference: String,
    },

    #[error("{referrer}: references unknown table '{referenced}'")]
    UnknownTable { referrer: String, referenced: String },

    #[error("{referrer}: foreign key '{fk_name}' is not declared on table '{stated_table}'")]
    UnknownFK {
        referrer: String,
        fk_name: String,
        stated_table: String,
    },

    #[error(
        "table '{table}', column '{column}': `automation` and `calculated` are mutually exclusive"
    )]
    MutualExclusion { table: String, column: String },

    #[error("table '{table}', column '{column}': {reason}")]
    InvalidColumnShape {
        table: String,
        column: String,
        reason: String,
    },

    #[error("circular foreign-key dependency: {cycle}")]
    FKCycle { cycle: String },

    #[error("table '{table}': circular calculated-column dependency: {cycle}")]
    CalcCycle { table: String, cycle: String },

    #[error("{site}: no foreign-key path from '{source}' to '{target}'")]
    UnreachablePath {
        site: String,
        source: String,
        target: String,
    },

    #[error("table '{table}', foreign key '{fk_name}': target table has no primary key")]
    MissingPrimaryKey { table: String, fk_name: String },

    #[error("internal compiler error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Accumulated validation outcome. Errors are collected, never short-circuited,
/// so a single `validate` call reports as much as possible in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<CompileError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: CompileError) {
        self.errors.push(error);
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
    }
}
