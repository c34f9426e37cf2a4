//! # augnorm-core
//!
//! The pure compiler pipeline for augmented-normalization schema documents:
//! Validator → Schema Processor → Dependency Graph Engine → Diff Engine →
//! Trigger Generator → SQL Emitter. No I/O happens in this crate — loading a
//! YAML document and talking to a database are both external concerns
//! (`augnorm-cli`, `augnorm-db`).

pub mod ast;
pub mod diff;
pub mod error;
pub mod graph;
pub mod identifiers;
pub mod processor;
pub mod sql;
pub mod trigger;
pub mod validator;

pub use error::{CompileError, Result, ValidationResult};

use ast::SchemaDocument;
use diff::{DatabaseSnapshot, SchemaDiff};
use processor::ProcessedSchema;

/// Everything produced by one compile: the fully resolved schema, the
/// additive DDL diff against the live database, and the rendered trigger
/// DDL. Carried as one value so the CLI's `compile`/`diff` subcommands can
/// pick whichever slice they need without recomputing upstream stages.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub processed: ProcessedSchema,
    pub diff: SchemaDiff,
    pub trigger_statements: Vec<String>,
}

/// Run the full pipeline against an already-loaded schema document and a
/// snapshot of the live database. Pure: no I/O, no shared state survives
/// the call.
pub fn compile(schema: &SchemaDocument, snapshot: &DatabaseSnapshot) -> Result<CompileOutput> {
    let validation = validator::validate(schema);
    if !validation.is_ok() {
        return Err(validation
            .errors
            .into_iter()
            .next()
            .expect("non-empty validation errors"));
    }

    let processed = processor::process_schema(schema)?;
    graph::build_fk_graph(&processed)?;

    for (table_name, table) in &processed.tables {
        graph::calculated_column_order(table_name, table)?;
    }

    let diff = diff::diff_schema(&processed, snapshot);
    let trigger_statements = sql::render_triggers(&processed)?;

    Ok(CompileOutput {
        processed,
        diff,
        trigger_statements,
    })
}
