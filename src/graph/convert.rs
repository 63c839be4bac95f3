use crate::outline::OutlineNode;

use super::sizer::SizeEstimator;
use super::types::{Graph, GraphEdge, GraphNode, NodeClass};

/// Flatten an outline tree into sized nodes and parent→child edges.
///
/// Nodes and edges come out in pre-order, so a parent always precedes its
/// children and siblings keep document order.
pub fn convert<S: SizeEstimator + ?Sized>(root: &OutlineNode, sizer: &S) -> Graph {
    let count = root.count();
    let mut graph = Graph {
        nodes: Vec::with_capacity(count),
        edges: Vec::with_capacity(count.saturating_sub(1)),
    };

    let mut stack: Vec<(&OutlineNode, Option<&str>)> = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let class = NodeClass::classify(node.level, node.children.len());
        graph.nodes.push(GraphNode {
            id: node.id.clone(),
            class,
            size: sizer.size(&node.content, class),
            content: node.content.clone(),
            level: node.level,
            children: node.children.iter().map(|c| c.id.clone()).collect(),
        });

        if let Some(parent) = parent {
            graph.edges.push(GraphEdge::new(parent, &node.id));
        }

        for child in node.children.iter().rev() {
            stack.push((child, Some(node.id.as_str())));
        }
    }

    graph
}
