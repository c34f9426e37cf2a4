use std::path::Path;

use anyhow::Result;

use augnorm_core::graph::visualize::{self, GraphFormat as VizFormat};
use augnorm_core::graph::FkGraph;

use crate::args::{GraphArgs, GraphFormat};
use crate::loader;

pub async fn run(args: &GraphArgs) -> Result<()> {
    let document = loader::load(Path::new(&args.schema))?;
    let processed = augnorm_core::processor::process_schema(&document)?;
    let graph = FkGraph::build(&processed);

    let format = match args.format {
        GraphFormat::Mermaid => VizFormat::Mermaid,
        GraphFormat::Dot => VizFormat::Dot,
    };

    println!("{}", visualize::visualize(&graph, format));
    Ok(())
}
