//! One-shot `parse -> convert -> layout` over a complete outline.

use tracing::debug;

use crate::config::Config;
use crate::error::LayoutError;
use crate::graph::{convert, Graph, NodeSizer, SizeEstimator};
use crate::layout::{LaidOutGraph, LayoutEngine};
use crate::outline::{parse_with, ParseOptions};

/// Parse and convert `text` into an unpositioned graph.
pub fn build_graph<S: SizeEstimator + ?Sized>(
    text: &str,
    options: &ParseOptions,
    sizer: &S,
) -> Graph {
    let tree = parse_with(text, options);
    let graph = convert(&tree, sizer);
    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        depth = graph.max_depth(),
        "outline converted"
    );
    graph
}

fn prepare(text: &str, config: &Config) -> (Graph, LayoutEngine) {
    let options = ParseOptions {
        id_strategy: config.coordinator.id_strategy,
    };
    let graph = build_graph(text, &options, &NodeSizer::new(config.sizer));
    (graph, LayoutEngine::new(config.layout.clone()))
}

/// Run the whole pipeline on the calling thread.
pub fn render(text: &str, config: &Config) -> Result<LaidOutGraph, LayoutError> {
    let (graph, engine) = prepare(text, config);
    engine.layout_blocking(graph)
}

/// Run the whole pipeline, laying out on the blocking pool.
pub async fn render_async(text: &str, config: &Config) -> Result<LaidOutGraph, LayoutError> {
    let (graph, engine) = prepare(text, config);
    engine.layout(graph).await
}
