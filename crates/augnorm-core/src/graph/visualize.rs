//! Renders the foreign-key graph as Mermaid or Graphviz dot, for the `graph`
//! command to print without a database round trip beyond introspection.

use crate::graph::fk_graph::FkGraph;

pub enum GraphFormat {
    Mermaid,
    Dot,
}

pub fn visualize(graph: &FkGraph, format: GraphFormat) -> String {
    match format {
        GraphFormat::Mermaid => generate_mermaid(graph),
        GraphFormat::Dot => generate_dot(graph),
    }
}

fn generate_mermaid(graph: &FkGraph) -> String {
    use std::collections::BTreeSet;

    let mut output = String::from("graph TD\n");
    let mut nodes = BTreeSet::new();
    for (child, parent, _) in graph.edges() {
        nodes.insert(child);
        nodes.insert(parent);
    }
    for name in &nodes {
        output.push_str(&format!("    {name}[{name}]\n"));
    }

    output.push('\n');
    for (child, parent, fk_name) in graph.edges() {
        output.push_str(&format!("    {child} -->|{fk_name}| {parent}\n"));
    }

    output
}

fn generate_dot(graph: &FkGraph) -> String {
    let mut output = String::from("digraph dependencies {\n");
    output.push_str("    rankdir=TB;\n");
    output.push_str("    node [shape=box, style=rounded];\n\n");

    for (child, parent, fk_name) in graph.edges() {
        output.push_str(&format!(
            "    \"{child}\" -> \"{parent}\" [label=\"{fk_name}\"];\n"
        ));
    }

    output.push_str("}\n");
    output
}
