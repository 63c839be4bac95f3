use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::{GraphEdge, GraphNode};

/// Bounding box for layout elements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box covering every position, default when empty.
    pub fn covering<'a>(positions: impl IntoIterator<Item = &'a LayoutPos>) -> Self {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut any = false;

        for pos in positions {
            any = true;
            min_x = min_x.min(pos.x);
            min_y = min_y.min(pos.y);
            max_x = max_x.max(pos.right());
            max_y = max_y.max(pos.bottom());
        }

        if !any {
            return BBox::default();
        }
        BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Absolute top-left position and size of a laid-out node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPos {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutPos {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &LayoutPos) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Layout algorithm family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Layered (Sugiyama-style) drawing, one layer per tree depth.
    #[default]
    Layered,
}

/// Direction in which layers advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    LeftRight,
    RightLeft,
    TopDown,
    BottomUp,
}

impl Direction {
    /// Layers stacked vertically rather than side by side.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Direction::TopDown | Direction::BottomUp)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "lr" | "left_right" => Ok(Direction::LeftRight),
            "rl" | "right_left" => Ok(Direction::RightLeft),
            "td" | "tb" | "top_down" => Ok(Direction::TopDown),
            "bt" | "bu" | "bottom_up" => Ok(Direction::BottomUp),
            other => Err(format!(
                "unknown direction '{}' (use lr, rl, td or bt)",
                other
            )),
        }
    }
}

/// Concrete spacing handed to a layout algorithm, already scaled for the
/// graph at hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spacing {
    /// Gap between neighbouring nodes of one layer.
    pub node_node: f32,
    /// Gap between consecutive layers.
    pub layer: f32,
    /// Gap kept between edge bend points and nodes.
    pub edge_node: f32,
    /// Depth/branching factor the base constants were scaled by.
    pub complexity: f32,
    pub margin: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    #[serde(flatten)]
    pub node: GraphNode,
    pub x: f32,
    pub y: f32,
}

impl PositionedNode {
    pub fn pos(&self) -> LayoutPos {
        LayoutPos::new(self.x, self.y, self.node.size.width, self.node.size.height)
    }
}

/// Final output: every node with absolute coordinates, plus the edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaidOutGraph {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<GraphEdge>,
    pub bounds: BBox,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
}

impl LaidOutGraph {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.node.id == id)
    }
}
