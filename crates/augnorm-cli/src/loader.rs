//! # Schema Document Loader
//!
//! Reads a YAML schema document off disk into `augnorm_core::ast::SchemaDocument`.
//! Parse failures are folded into `CompileError::SyntaxError` so the rest of
//! the CLI only ever has to render one error chain, whether the failure came
//! from here or from the compiler itself.

use std::path::Path;

use augnorm_core::ast::SchemaDocument;
use augnorm_core::{CompileError, Result};

pub fn load(path: &Path) -> Result<SchemaDocument> {
    let content = std::fs::read_to_string(path).map_err(|e| CompileError::SyntaxError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| CompileError::SyntaxError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
