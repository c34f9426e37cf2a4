//! # Dependency Graph Engine
//!
//! Three graphs drive the trigger generator: the foreign-key graph (table
//! ordering, cycle rejection), the per-table calculated-column graph
//! (assignment ordering within one trigger body), and the automation graph
//! (reachability checks for SUM/COUNT/MAX/MIN/LATEST/SNAPSHOT/FOLLOW
//! directives). All three share the DFS cycle detector in [`cycle`].

pub mod automation_graph;
pub mod calc_graph;
pub mod cycle;
pub mod fk_graph;
pub mod visualize;

pub use automation_graph::AutomationGraph;
pub use calc_graph::calculated_column_order;
pub use fk_graph::FkGraph;

use crate::error::Result;
use crate::processor::ProcessedSchema;

/// Build the foreign-key graph and reject it outright if it contains a
/// cycle — see [`fk_graph::FkGraph::check_acyclic`].
pub fn build_fk_graph(schema: &ProcessedSchema) -> Result<FkGraph> {
    let graph = FkGraph::build(schema);
    graph.check_acyclic()?;
    Ok(graph)
}
