//! Foreign-key dependency graph: one node per table, one edge per foreign
//! key, child → parent. Drives insertion/trigger ordering and the
//! always-fatal cycle check described in [`crate::graph::cycle`].

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::{CompileError, Result};
use crate::graph::cycle;
use crate::processor::ProcessedSchema;

#[derive(Debug, Clone)]
pub struct FkEdge {
    pub fk_name: String,
    pub local_columns: Vec<String>,
}

pub struct FkGraph {
    graph: DiGraph<String, FkEdge>,
    node_indices: HashMap<String, NodeIndex>,
}

impl FkGraph {
    pub fn build(schema: &ProcessedSchema) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for table_name in schema.tables.keys() {
            let idx = graph.add_node(table_name.clone());
            node_indices.insert(table_name.clone(), idx);
        }

        for (table_name, table) in &schema.tables {
            for (fk_name, fk) in &table.foreign_keys {
                if let (Some(&from), Some(&to)) = (
                    node_indices.get(table_name),
                    node_indices.get(&fk.target_table),
                ) {
                    graph.add_edge(
                        from,
                        to,
                        FkEdge {
                            fk_name: fk_name.clone(),
                            local_columns: fk.column_mapping.values().cloned().collect(),
                        },
                    );
                }
            }
        }

        Self { graph, node_indices }
    }

    pub fn table_name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_index(&self, table: &str) -> Option<NodeIndex> {
        self.node_indices.get(table).copied()
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `(child, parent, fk_name)` for every edge, in insertion order.
    pub fn edges(&self) -> Vec<(&str, &str, &str)> {
        self.graph
            .edge_indices()
            .map(|idx| {
                let (from, to) = self.graph.edge_endpoints(idx).unwrap();
                let weight = &self.graph[idx];
                (self.table_name(from), self.table_name(to), weight.fk_name.as_str())
            })
            .collect()
    }

    /// Unlike a seed-insertion dependency graph, a cycle here is never
    /// broken — it means no valid AFTER-trigger execution order exists.
    pub fn check_acyclic(&self) -> Result<()> {
        if let Some(cycle_nodes) = cycle::find_cycle(&self.graph) {
            let names: Vec<String> = cycle_nodes
                .iter()
                .map(|&idx| self.table_name(idx).to_string())
                .collect();
            return Err(CompileError::FKCycle {
                cycle: names.join(" -> "),
            });
        }
        Ok(())
    }

    /// Parents before children. Fails if the graph is cyclic.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.check_acyclic()?;
        match petgraph::algo::toposort(&self.graph, None) {
            Ok(sorted) => Ok(sorted
                .into_iter()
                .rev()
                .map(|idx| self.table_name(idx).to_string())
                .collect()),
            Err(_) => Err(CompileError::Internal(
                "toposort failed on a graph already proven acyclic".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::DeletePolicy;
    use crate::processor::fk_synthesis::ResolvedForeignKey;
    use crate::processor::ProcessedTable;
    use indexmap::IndexMap;

    fn empty_table() -> ProcessedTable {
        ProcessedTable {
            columns: IndexMap::new(),
            generated_columns: IndexMap::new(),
            foreign_keys: IndexMap::new(),
            ui_notes: Vec::new(),
            sync: IndexMap::new(),
            spread: IndexMap::new(),
            content: Vec::new(),
        }
    }

    fn fk(target: &str, local_col: &str) -> ResolvedForeignKey {
        let mut column_mapping = IndexMap::new();
        column_mapping.insert("id".to_string(), local_col.to_string());
        ResolvedForeignKey {
            target_table: target.to_string(),
            on_delete: DeletePolicy::NoAction,
            column_mapping,
        }
    }

    #[test]
    fn acyclic_fk_graph_sorts_parents_first() {
        let mut schema = ProcessedSchema::default();
        schema.tables.insert("users".to_string(), empty_table());

        let mut orders = empty_table();
        orders
            .foreign_keys
            .insert("customer".to_string(), fk("users", "customer"));
        schema.tables.insert("orders".to_string(), orders);

        let graph = FkGraph::build(&schema);
        let order = graph.topological_order().unwrap();
        let users_pos = order.iter().position(|t| t == "users").unwrap();
        let orders_pos = order.iter().position(|t| t == "orders").unwrap();
        assert!(users_pos < orders_pos);
    }

    #[test]
    fn mutual_fk_cycle_is_fatal() {
        let mut schema = ProcessedSchema::default();

        let mut a = empty_table();
        a.foreign_keys.insert("b".to_string(), fk("table_b", "b"));
        schema.tables.insert("table_a".to_string(), a);

        let mut b = empty_table();
        b.foreign_keys.insert("a".to_string(), fk("table_a", "a"));
        schema.tables.insert("table_b".to_string(), b);

        let graph = FkGraph::build(&schema);
        let err = graph.check_acyclic().unwrap_err();
        assert!(matches!(err, CompileError::FKCycle { .. }));
    }
}
