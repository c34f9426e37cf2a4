//! Generic cycle detection shared by the foreign-key graph and the
//! per-table calculated-column graph.
//!
//! Unlike a seed-insertion planner, nothing here ever breaks a cycle —
//! a cycle in either graph means the trigger execution order this compiler
//! emits cannot be proven to terminate, so it is always a hard error. DFS
//! with an explicit recursion-stack color map gives back the actual path,
//! which Tarjan's SCC alone would not.

use petgraph::graph::{DiGraph, NodeIndex};

#[derive(Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

/// Find one cycle in `graph`, if any, and return the nodes along it in
/// order (the first node repeats as the last edge's target).
pub fn find_cycle<N, E>(graph: &DiGraph<N, E>) -> Option<Vec<NodeIndex>> {
    let mut state = vec![VisitState::Unvisited; graph.node_count()];
    let mut path = Vec::new();

    for start in graph.node_indices() {
        if state[start.index()] == VisitState::Unvisited {
            if let Some(cycle) = visit(graph, start, &mut state, &mut path) {
                return Some(cycle);
            }
        }
    }
    None
}

fn visit<N, E>(
    graph: &DiGraph<N, E>,
    node: NodeIndex,
    state: &mut [VisitState],
    path: &mut Vec<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    state[node.index()] = VisitState::InProgress;
    path.push(node);

    for neighbor in graph.neighbors(node) {
        match state[neighbor.index()] {
            VisitState::InProgress => {
                let start = path.iter().position(|&n| n == neighbor).expect(
                    "neighbor marked InProgress must be on the current path",
                );
                let mut cycle = path[start..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
            VisitState::Unvisited => {
                if let Some(cycle) = visit(graph, neighbor, state, path) {
                    return Some(cycle);
                }
            }
            VisitState::Done => {}
        }
    }

    path.pop();
    state[node.index()] = VisitState::Done;
    None
}
