//! The `IS DISTINCT FROM` change-detection guard used by every PUSH step.
//! NULL-safe, so a transition to/from `NULL` still counts as a change.

/// `OLD.c IS DISTINCT FROM NEW.c`.
pub fn column_changed(column: &str) -> String {
    format!("OLD.{column} IS DISTINCT FROM NEW.{column}")
}

/// OR-chain of [`column_changed`] across every column in `columns`. Used
/// for composite-FK change detection and multi-column guards.
pub fn any_changed(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| column_changed(c))
        .collect::<Vec<_>>()
        .join(" OR ")
}
