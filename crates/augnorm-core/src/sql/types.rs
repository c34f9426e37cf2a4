//! Dialect-neutral type mapping. A `SqlDialect` implementation only needs to
//! know how to render one [`ColumnDef`] (or its auto-increment form) as a
//! type string; everything else in [`super`] is dialect-agnostic DDL shape.

use crate::ast::{ColumnDef, SqlType};

/// Renders internal types and DEFAULT clauses into one database's SQL
/// dialect. A second implementation (e.g. MySQL) only needs to fill in
/// this trait; the diff/DDL shape in [`super::render_diff`] stays the same.
pub trait SqlDialect {
    /// The column type string, expanding `integer`/`sequence=true` to the
    /// dialect's auto-increment type.
    fn column_type(&self, column: &ColumnDef) -> String;

    /// A literal `DEFAULT <value>` clause, or `None` if the type carries no
    /// default (only aggregation target columns call this).
    fn aggregation_default(&self, sql_type: SqlType) -> Option<String>;

    fn quote_identifier(&self, name: &str) -> String;
}

pub struct Postgres;

impl SqlDialect for Postgres {
    fn column_type(&self, column: &ColumnDef) -> String {
        if column.sequence && column.sql_type == SqlType::Integer {
            return match column.size {
                Some(n) if n <= 4 => "SMALLSERIAL".to_string(),
                Some(n) if n >= 15 => "BIGSERIAL".to_string(),
                _ => "SERIAL".to_string(),
            };
        }

        match column.sql_type {
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::Varchar => format!("VARCHAR({})", column.size.unwrap_or(255)),
            SqlType::Char => format!("CHAR({})", column.size.unwrap_or(1)),
            SqlType::Bit => format!("BIT({})", column.size.unwrap_or(1)),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::Json => "JSONB".to_string(),
            SqlType::Numeric | SqlType::Decimal => match (column.size, column.decimal) {
                (Some(size), Some(decimal)) => format!("NUMERIC({size},{decimal})"),
                (Some(size), None) => format!("NUMERIC({size})"),
                (None, _) => "NUMERIC".to_string(),
            },
        }
    }

    fn aggregation_default(&self, sql_type: SqlType) -> Option<String> {
        if sql_type.is_numeric() {
            Some("0".to_string())
        } else if sql_type.is_string() {
            Some("''".to_string())
        } else if sql_type.is_boolean() {
            Some("FALSE".to_string())
        } else {
            None
        }
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }
}
