use serde::{Deserialize, Serialize};

/// Coarse node class driving size bounds and visual style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeClass {
    Root,
    Branch,
    Leaf,
}

impl NodeClass {
    /// `Root` iff level 1, else `Branch` iff the node has children.
    pub fn classify(level: usize, child_count: usize) -> Self {
        if level == 1 {
            NodeClass::Root
        } else if child_count > 0 {
            NodeClass::Branch
        } else {
            NodeClass::Leaf
        }
    }
}

/// Width and height of a node box in layout units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

impl BoxSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "nodeClass")]
    pub class: NodeClass,
    #[serde(rename = "box")]
    pub size: BoxSize,
    pub content: String,
    pub level: usize,
    /// Ids of the child nodes, in document order.
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl GraphEdge {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            id: edge_id(source, target),
            source: source.to_string(),
            target: target.to_string(),
        }
    }
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("e-{}-{}", source, target)
}

/// Unpositioned graph handed to the layout stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Largest `level` in the graph, 0 when empty.
    pub fn max_depth(&self) -> usize {
        self.nodes.iter().map(|n| n.level).max().unwrap_or(0)
    }

    /// Largest child count in the graph, 0 when empty.
    pub fn max_branching(&self) -> usize {
        self.nodes.iter().map(|n| n.children.len()).max().unwrap_or(0)
    }

    /// Mean box size, or `None` for an empty graph.
    pub fn average_size(&self) -> Option<BoxSize> {
        if self.nodes.is_empty() {
            return None;
        }
        let count = self.nodes.len() as f32;
        let width = self.nodes.iter().map(|n| n.size.width).sum::<f32>() / count;
        let height = self.nodes.iter().map(|n| n.size.height).sum::<f32>() / count;
        Some(BoxSize::new(width, height))
    }
}
