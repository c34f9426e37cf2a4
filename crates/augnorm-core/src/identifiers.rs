//! # Identifier Extraction
//!
//! Shared machinery for reading bare identifiers out of a `calculated`
//! expression string. Used by the calculated-column graph (to find
//! same-table dependencies) and by the trigger generator (to qualify bare
//! column references with `NEW.`).
//!
//! This is deliberately approximate: it does not parse SQL. See DESIGN.md
//! for the documented consequences (string-literal false positives,
//! unmodeled cross-table references).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// SQL keywords excluded from identifier extraction, per §4.3.
const SQL_KEYWORDS: &[&str] = &[
    "case", "when", "then", "else", "end", "and", "or", "not", "null", "true", "false", "select",
    "from", "where", "order", "by", "group", "having", "distinct", "as", "is", "in", "like",
    "between", "exists", "all", "any", "some", "union", "intersect", "except", "join", "inner",
    "outer", "left", "right", "full", "cross", "on", "using", "natural", "asc", "desc", "limit",
    "offset",
];

static KEYWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| SQL_KEYWORDS.iter().copied().collect());

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").unwrap());

pub fn is_sql_keyword(ident: &str) -> bool {
    KEYWORD_SET.contains(ident.to_lowercase().as_str())
}

/// Extract every maximal identifier match from `expr`, in order of
/// appearance, excluding SQL keywords. Does not deduplicate.
pub fn extract_identifiers(expr: &str) -> Vec<String> {
    IDENTIFIER_RE
        .find_iter(expr)
        .map(|m| m.as_str().to_string())
        .filter(|ident| !is_sql_keyword(ident))
        .collect()
}

/// Extract the distinct set of identifiers in `expr` that name a column of
/// `table_columns`, excluding SQL keywords. This is what the calculated-
/// column graph builder uses to find same-table dependencies.
pub fn extract_same_table_dependencies<'a>(
    expr: &str,
    table_columns: &'a HashSet<String>,
) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    let mut deps = Vec::new();
    for ident in extract_identifiers(expr) {
        if let Some(col) = table_columns.get(&ident) {
            if seen.insert(col.clone()) {
                deps.push(col.as_str());
            }
        }
    }
    deps
}

/// Rewrite `expr`, prefixing every bare identifier that is (a) not a SQL
/// keyword, (b) not already qualified with `NEW.`/`OLD.`/a table name, and
/// (c) a column of the current table, with `NEW.`. Used to emit the
/// assignment for a calculated column.
///
/// Identifiers that are immediately followed by `(` are treated as function
/// calls and never qualified (e.g. `COALESCE(...)`, `now()`).
pub fn qualify_with_new(expr: &str, table_columns: &HashSet<String>) -> String {
    let mut out = String::with_capacity(expr.len() + 8);
    let mut last_end = 0usize;

    for m in IDENTIFIER_RE.find_iter(expr) {
        let ident = m.as_str();
        out.push_str(&expr[last_end..m.start()]);
        last_end = m.end();

        if is_sql_keyword(ident) {
            out.push_str(ident);
            continue;
        }

        // already qualified, e.g. `NEW.col` or `other_table.col` — the
        // identifier immediately preceding this one (skipping whitespace)
        // ends in a `.`.
        let prefix = &expr[..m.start()];
        let already_qualified = prefix.trim_end().ends_with('.');

        // function call, e.g. `coalesce(`
        let suffix = &expr[m.end()..];
        let is_call = suffix.trim_start().starts_with('(');

        if already_qualified || is_call || !table_columns.contains(ident) {
            out.push_str(ident);
        } else {
            out.push_str("NEW.");
            out.push_str(ident);
        }
    }
    out.push_str(&expr[last_end..]);
    out
}
