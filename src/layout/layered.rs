use std::collections::HashMap;

use dugong::graphlib::{Graph as DagreGraph, GraphOptions};
use dugong::{EdgeLabel, GraphLabel, NodeLabel, RankDir};

use crate::error::LayoutError;
use crate::graph::Graph;

use super::types::{Direction, LayoutPos, Spacing};

/// A pluggable layout capability. Implementations take the unpositioned
/// graph and return an absolute position for every node.
///
/// The engine validates ids before calling an algorithm, so every edge end
/// names a node and node ids are unique.
pub trait LayoutAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    fn layout(
        &self,
        graph: &Graph,
        spacing: &Spacing,
        direction: Direction,
    ) -> Result<HashMap<String, LayoutPos>, LayoutError>;
}

/// Layered (Sugiyama-style) layout backed by `dugong`, a port of dagre.
///
/// Dagre reports node centers; they are turned into top-left corners and
/// shifted so the drawing starts at the spacing margin.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredLayout;

fn rank_dir(direction: Direction) -> RankDir {
    match direction {
        Direction::LeftRight => RankDir::LR,
        Direction::RightLeft => RankDir::RL,
        Direction::TopDown => RankDir::TB,
        Direction::BottomUp => RankDir::BT,
    }
}

impl LayoutAlgorithm for LayeredLayout {
    fn name(&self) -> &'static str {
        "layered"
    }

    fn layout(
        &self,
        graph: &Graph,
        spacing: &Spacing,
        direction: Direction,
    ) -> Result<HashMap<String, LayoutPos>, LayoutError> {
        let mut positions: HashMap<String, LayoutPos> = HashMap::new();
        if graph.nodes.is_empty() {
            return Ok(positions);
        }

        let mut g = DagreGraph::<NodeLabel, EdgeLabel, GraphLabel>::new(GraphOptions {
            multigraph: false,
            compound: false,
            ..Default::default()
        });
        g.set_graph(GraphLabel {
            rankdir: rank_dir(direction),
            nodesep: f64::from(spacing.node_node),
            ranksep: f64::from(spacing.layer),
            edgesep: f64::from(spacing.edge_node),
            ..Default::default()
        });

        for node in &graph.nodes {
            g.set_node(
                node.id.clone(),
                NodeLabel {
                    width: f64::from(node.size.width),
                    height: f64::from(node.size.height),
                    ..Default::default()
                },
            );
        }

        // Self loops carry no ranking information.
        for edge in graph.edges.iter().filter(|e| e.source != e.target) {
            g.set_edge_named(
                edge.source.clone(),
                edge.target.clone(),
                None::<String>,
                Some(EdgeLabel {
                    minlen: 1,
                    weight: 1.0,
                    ..Default::default()
                }),
            );
        }

        dugong::layout(&mut g);

        for node in &graph.nodes {
            let Some(label) = g.node(&node.id) else {
                continue;
            };
            let (Some(cx), Some(cy)) = (label.x, label.y) else {
                continue;
            };
            let (width, height) = (node.size.width, node.size.height);
            positions.insert(
                node.id.clone(),
                LayoutPos::new(
                    cx as f32 - width / 2.0,
                    cy as f32 - height / 2.0,
                    width,
                    height,
                ),
            );
        }

        normalize(&mut positions, spacing.margin);
        Ok(positions)
    }
}

fn normalize(positions: &mut HashMap<String, LayoutPos>, margin: f32) {
    if positions.is_empty() {
        return;
    }
    let min_x = positions.values().map(|p| p.x).fold(f32::MAX, f32::min);
    let min_y = positions.values().map(|p| p.y).fold(f32::MAX, f32::min);
    let dx = margin - min_x;
    let dy = margin - min_y;
    for pos in positions.values_mut() {
        pos.x += dx;
        pos.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{convert, GraphEdge, NodeSizer};
    use crate::outline::parse;

    fn spacing() -> Spacing {
        Spacing {
            node_node: 40.0,
            layer: 80.0,
            edge_node: 20.0,
            complexity: 1.0,
            margin: 30.0,
        }
    }

    fn graph(text: &str) -> Graph {
        convert(&parse(text), &NodeSizer::default())
    }

    fn run(graph: &Graph, direction: Direction) -> HashMap<String, LayoutPos> {
        LayeredLayout
            .layout(graph, &spacing(), direction)
            .expect("layout succeeds")
    }

    fn assert_no_overlaps(positions: &HashMap<String, LayoutPos>) {
        let all: Vec<(&String, &LayoutPos)> = positions.iter().collect();
        for (i, (a_id, a)) in all.iter().enumerate() {
            for (b_id, b) in &all[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {}", a_id, b_id);
            }
        }
    }

    #[test]
    fn layers_advance_left_to_right() {
        let g = graph("# T\n## A\n### A1\n## B");
        let pos = run(&g, Direction::LeftRight);
        assert_eq!(pos.len(), 4);
        assert!(pos["n0"].right() < pos["n1"].x);
        assert!(pos["n1"].right() < pos["n2"].x);
        assert!(pos["n0"].right() < pos["n3"].x);
        assert_no_overlaps(&pos);
    }

    #[test]
    fn drawing_starts_at_the_margin() {
        let g = graph("# T\n## A\n## B\n## C");
        let pos = run(&g, Direction::LeftRight);
        let min_x = pos.values().map(|p| p.x).fold(f32::MAX, f32::min);
        let min_y = pos.values().map(|p| p.y).fold(f32::MAX, f32::min);
        assert!((min_x - 30.0).abs() < 1e-3);
        assert!((min_y - 30.0).abs() < 1e-3);
    }

    #[test]
    fn boxes_keep_their_size() {
        let g = graph("# Title\n## A much longer section heading");
        let pos = run(&g, Direction::TopDown);
        for node in &g.nodes {
            assert_eq!(pos[&node.id].width, node.size.width);
            assert_eq!(pos[&node.id].height, node.size.height);
        }
    }

    #[test]
    fn subtrees_do_not_interleave() {
        let g = graph("# T\n## A\n### A1\n### A2\n## B\n### B1\n### B2");
        let pos = run(&g, Direction::LeftRight);
        let (a_lo, a_hi) = (pos["n2"].y.min(pos["n3"].y), pos["n2"].y.max(pos["n3"].y));
        let (b_lo, b_hi) = (pos["n5"].y.min(pos["n6"].y), pos["n5"].y.max(pos["n6"].y));
        assert!(a_hi < b_lo || b_hi < a_lo);
        assert_no_overlaps(&pos);
    }

    #[test]
    fn right_left_puts_children_left_of_the_root() {
        let g = graph("# T\n## A");
        let pos = run(&g, Direction::RightLeft);
        assert!(pos["n0"].x > pos["n1"].right());
    }

    #[test]
    fn top_down_and_bottom_up() {
        let g = graph("# T\n## A\n## B");
        let down = run(&g, Direction::TopDown);
        assert!(down["n0"].bottom() < down["n1"].y);
        assert!(down["n0"].bottom() < down["n2"].y);
        assert_no_overlaps(&down);

        let up = run(&g, Direction::BottomUp);
        assert!(up["n0"].y > up["n1"].bottom());
        assert_no_overlaps(&up);
    }

    #[test]
    fn cycles_do_not_fail() {
        let mut g = graph("# T\n## A\n## B");
        g.edges.push(GraphEdge::new("n1", "n0"));
        g.edges.push(GraphEdge::new("n2", "n2"));
        let pos = run(&g, Direction::LeftRight);
        assert_eq!(pos.len(), 3);

        // A pure cycle has no source at all.
        g.edges = vec![GraphEdge::new("n0", "n1"), GraphEdge::new("n1", "n0")];
        let pos = run(&g, Direction::LeftRight);
        assert_eq!(pos.len(), 3);
    }

    #[test]
    fn long_edges_only_place_real_nodes() {
        let mut g = graph("# T\n## A\n### A1\n#### A2");
        g.edges.push(GraphEdge::new("n0", "n3"));
        let pos = run(&g, Direction::LeftRight);
        assert_eq!(pos.len(), 4);
        assert!(g.nodes.iter().all(|n| pos.contains_key(&n.id)));
    }

    #[test]
    fn disconnected_nodes_are_placed() {
        let mut g = graph("# T\n## A\n## B");
        g.edges.clear();
        let pos = run(&g, Direction::LeftRight);
        assert_eq!(pos.len(), 3);
        assert_no_overlaps(&pos);
    }
}
