//! Per-table dependency graph over `calculated` columns, used by the
//! trigger generator to emit `SET` assignments in an order where every
//! calculated column is computed after the columns its expression reads.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{CompileError, Result};
use crate::graph::cycle;
use crate::identifiers;
use crate::processor::ProcessedTable;

/// Emission order for every `calculated` column of one table. Empty if the
/// table has none.
pub fn calculated_column_order(table_name: &str, table: &ProcessedTable) -> Result<Vec<String>> {
    let calculated: Vec<(&String, &String)> = table
        .columns
        .iter()
        .filter_map(|(name, def)| def.calculated.as_ref().map(|expr| (name, expr)))
        .collect();

    if calculated.is_empty() {
        return Ok(Vec::new());
    }

    let column_names = table.all_column_names();

    let mut graph = DiGraph::<String, ()>::new();
    let mut node_indices = HashMap::new();
    for (name, _) in &calculated {
        let idx = graph.add_node((*name).clone());
        node_indices.insert((*name).clone(), idx);
    }

    for (name, expr) in &calculated {
        let deps = identifiers::extract_same_table_dependencies(expr, &column_names);
        for dep in deps {
            if let Some(&dep_idx) = node_indices.get(dep) {
                // `dep` must be computed before `name`.
                graph.add_edge(dep_idx, node_indices[*name], ());
            }
        }
    }

    if let Some(cycle_nodes) = cycle::find_cycle(&graph) {
        let names: Vec<String> = cycle_nodes.iter().map(|&idx| graph[idx].clone()).collect();
        return Err(CompileError::CalcCycle {
            table: table_name.to_string(),
            cycle: names.join(" -> "),
        });
    }

    Ok(kahn_order(&graph))
}

/// Kahn's algorithm, tie-broken by node-insertion order for determinism.
fn kahn_order(graph: &DiGraph<String, ()>) -> Vec<String> {
    let mut in_degree: HashMap<NodeIndex, usize> =
        graph.node_indices().map(|idx| (idx, 0)).collect();
    for edge in graph.edge_indices() {
        let (_, target) = graph.edge_endpoints(edge).expect("edge index from this graph");
        *in_degree.get_mut(&target).expect("target counted above") += 1;
    }

    let mut ready: Vec<NodeIndex> = graph
        .node_indices()
        .filter(|idx| in_degree[idx] == 0)
        .collect();
    ready.sort_by_key(|idx| idx.index());
    let mut queue: VecDeque<NodeIndex> = ready.into();

    let mut order = Vec::new();
    while let Some(node) = queue.pop_front() {
        order.push(graph[node].clone());

        let mut newly_ready = Vec::new();
        for neighbor in graph.neighbors(node) {
            let degree = in_degree.get_mut(&neighbor).expect("neighbor counted above");
            *degree -= 1;
            if *degree == 0 {
                newly_ready.push(neighbor);
            }
        }
        newly_ready.sort_by_key(|idx| idx.index());
        queue.extend(newly_ready);
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SqlType;
    use indexmap::IndexMap;

    fn column(calculated: Option<&str>) -> crate::ast::ColumnDef {
        crate::ast::ColumnDef {
            sql_type: SqlType::Numeric,
            size: None,
            decimal: Some(2),
            primary_key: false,
            unique: false,
            sequence: false,
            automation: None,
            calculated: calculated.map(str::to_string),
        }
    }

    fn table_with(columns: Vec<(&str, Option<&str>)>) -> ProcessedTable {
        let mut map = IndexMap::new();
        for (name, calc) in columns {
            map.insert(name.to_string(), column(calc));
        }
        ProcessedTable {
            columns: map,
            generated_columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            ui_notes: Vec::new(),
            sync: IndexMap::new(),
            spread: IndexMap::new(),
            content: Vec::new(),
        }
    }

    #[test]
    fn dependency_computed_before_dependent() {
        let table = table_with(vec![
            ("price", None),
            ("quantity", None),
            ("subtotal", Some("price * quantity")),
            ("total", Some("subtotal + 1")),
        ]);

        let order = calculated_column_order("t", &table).unwrap();
        let subtotal_pos = order.iter().position(|c| c == "subtotal").unwrap();
        let total_pos = order.iter().position(|c| c == "total").unwrap();
        assert!(subtotal_pos < total_pos);
    }

    #[test]
    fn no_calculated_columns_yields_empty_order() {
        let table = table_with(vec![("price", None)]);
        assert!(calculated_column_order("t", &table).unwrap().is_empty());
    }

    #[test]
    fn self_referential_calculation_is_a_cycle() {
        let table = table_with(vec![("a", Some("b + 1")), ("b", Some("a + 1"))]);
        let err = calculated_column_order("t", &table).unwrap_err();
        assert!(matches!(err, CompileError::CalcCycle { .. }));
    }
}
