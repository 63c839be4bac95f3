use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::Graph;

use super::layered::{LayeredLayout, LayoutAlgorithm};
use super::spacing::compute_spacing;
use super::types::{Algorithm, BBox, LaidOutGraph, LayoutPos, PositionedNode};

/// Runs a [`LayoutAlgorithm`] over a converted graph.
///
/// Spacing is derived from the graph before every run. The result is
/// checked for totality: an algorithm that leaves a node unpositioned is
/// reported as an error rather than returned half-done.
#[derive(Clone)]
pub struct LayoutEngine {
    algorithm: Arc<dyn LayoutAlgorithm>,
    options: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(options: LayoutConfig) -> Self {
        let algorithm: Arc<dyn LayoutAlgorithm> = match options.algorithm {
            Algorithm::Layered => Arc::new(LayeredLayout),
        };
        Self { algorithm, options }
    }

    pub fn with_algorithm(options: LayoutConfig, algorithm: Arc<dyn LayoutAlgorithm>) -> Self {
        Self { algorithm, options }
    }

    /// Lay out `graph` on the calling thread.
    pub fn layout_blocking(&self, graph: Graph) -> Result<LaidOutGraph, LayoutError> {
        if graph.is_empty() {
            return Ok(LaidOutGraph::default());
        }

        validate(&graph).inspect_err(|e| warn!(error = %e, "rejected graph"))?;
        let spacing = compute_spacing(&graph, &self.options)?;
        debug!(
            algorithm = self.algorithm.name(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            complexity = spacing.complexity,
            node_node = spacing.node_node,
            layer = spacing.layer,
            "running layout"
        );

        let mut positions = self
            .algorithm
            .layout(&graph, &spacing, self.options.direction)
            .inspect_err(|e| warn!(error = %e, "layout failed"))?;

        let Graph { nodes, edges } = graph;
        let mut placed = Vec::with_capacity(nodes.len());
        for node in nodes {
            let Some(pos) = positions.remove(&node.id) else {
                return Err(LayoutError::Unpositioned(node.id));
            };
            placed.push(PositionedNode {
                node,
                x: pos.x,
                y: pos.y,
            });
        }

        let rects: Vec<LayoutPos> = placed.iter().map(PositionedNode::pos).collect();
        let bounds = BBox::covering(&rects);

        Ok(LaidOutGraph {
            nodes: placed,
            edges,
            bounds,
            spacing: Some(spacing),
        })
    }

    /// Lay out `graph` on the blocking pool. Callers that may be overtaken
    /// by newer text should tag the call and drop stale results themselves.
    pub async fn layout(&self, graph: Graph) -> Result<LaidOutGraph, LayoutError> {
        if graph.is_empty() {
            return Ok(LaidOutGraph::default());
        }
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.layout_blocking(graph))
            .await
            .map_err(|e| LayoutError::Task(e.to_string()))?
    }
}

/// Node ids must be unique and every edge end must name a node.
fn validate(graph: &Graph) -> Result<(), LayoutError> {
    let mut ids: HashSet<&str> = HashSet::with_capacity(graph.nodes.len());
    for node in &graph.nodes {
        if !ids.insert(node.id.as_str()) {
            return Err(LayoutError::DuplicateNode(node.id.clone()));
        }
    }
    for edge in &graph.edges {
        for end in [&edge.source, &edge.target] {
            if !ids.contains(end.as_str()) {
                return Err(LayoutError::UnknownNode {
                    edge: edge.id.clone(),
                    node: end.clone(),
                });
            }
        }
    }
    Ok(())
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}
