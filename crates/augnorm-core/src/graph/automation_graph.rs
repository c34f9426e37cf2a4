//! Graph of automation directives: one edge per `automation` column, from
//! the table that supplies the value to the table whose column receives
//! it. Both aggregation (SUM/COUNT/MAX/MIN/LATEST) and cascade
//! (SNAPSHOT/FOLLOW) directives point the same way — `automation.table`
//! toward the declaring table — so one graph and one reachability check
//! serve both.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::ast::AutomationType;
use crate::processor::ProcessedSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationEdgeKind {
    Aggregation,
    Cascade,
}

#[derive(Debug, Clone)]
pub struct AutomationEdge {
    pub column: String,
    pub via_fk: String,
    pub kind: AutomationEdgeKind,
}

pub struct AutomationGraph {
    graph: DiGraph<String, AutomationEdge>,
    node_indices: HashMap<String, NodeIndex>,
}

impl AutomationGraph {
    pub fn build(schema: &ProcessedSchema) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for table_name in schema.tables.keys() {
            let idx = graph.add_node(table_name.clone());
            node_indices.insert(table_name.clone(), idx);
        }

        for (table_name, table) in &schema.tables {
            for (column_name, column) in &table.columns {
                let Some(automation) = &column.automation else {
                    continue;
                };
                let (Some(&from), Some(&to)) = (
                    node_indices.get(&automation.table),
                    node_indices.get(table_name),
                ) else {
                    continue;
                };

                let kind = if automation.automation_type.is_aggregation() {
                    AutomationEdgeKind::Aggregation
                } else {
                    debug_assert!(matches!(
                        automation.automation_type,
                        AutomationType::Snapshot | AutomationType::Follow
                    ));
                    AutomationEdgeKind::Cascade
                };

                graph.add_edge(
                    from,
                    to,
                    AutomationEdge {
                        column: column_name.clone(),
                        via_fk: automation.foreign_key.clone(),
                        kind,
                    },
                );
            }
        }

        Self { graph, node_indices }
    }

    /// Whether automation data can flow from `from` to `to`, directly or
    /// transitively (e.g. a SNAPSHOT chained through an intermediate
    /// table). Used to validate that a directive's declared path actually
    /// exists before the trigger generator relies on it.
    pub fn is_reachable(&self, from: &str, to: &str) -> bool {
        let (Some(&start), Some(&target)) =
            (self.node_indices.get(from), self.node_indices.get(to))
        else {
            return false;
        };
        if start == target {
            return true;
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);

        while let Some(node) = queue.pop_front() {
            for neighbor in self.graph.neighbors(node) {
                if neighbor == target {
                    return true;
                }
                if visited.insert(neighbor) {
                    queue.push_back(neighbor);
                }
            }
        }
        false
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
