use mindmark::graph::{convert, NodeClass, NodeSizer};
use mindmark::layout::{Direction, LayoutEngine};
use mindmark::outline::{parse, PLACEHOLDER_ROOT};
use mindmark::{render, render_async, Config, LayoutError};

fn classes(text: &str) -> Vec<(String, NodeClass)> {
    convert(&parse(text), &NodeSizer::default())
        .nodes
        .into_iter()
        .map(|n| (n.content, n.class))
        .collect()
}

#[test]
fn scenario_single_title() {
    let root = parse("# Title");
    assert_eq!(root.content, "Title");
    assert_eq!(root.level, 1);
    assert!(root.children.is_empty());

    let graph = convert(&root, &NodeSizer::default());
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].class, NodeClass::Root);
    assert!(graph.edges.is_empty());
}

#[test]
fn scenario_sections_and_subsection() {
    let root = parse("# Title\n## A\n### A1\n## B");
    let names: Vec<&str> = root.children.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(root.children[0].children[0].content, "A1");

    let graph = convert(&root, &NodeSizer::default());
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(
        classes("# Title\n## A\n### A1\n## B"),
        vec![
            ("Title".to_string(), NodeClass::Root),
            ("A".to_string(), NodeClass::Branch),
            ("A1".to_string(), NodeClass::Leaf),
            ("B".to_string(), NodeClass::Leaf),
        ]
    );
}

#[test]
fn scenario_subsection_attaches_to_latest_section() {
    // A `###` always nests under the closest preceding `##`.
    let root = parse("# Title\n## A\n## B\n### A1");
    assert!(root.children[0].children.is_empty());
    assert_eq!(root.children[1].children[0].content, "A1");
}

#[test]
fn scenario_two_titles() {
    let root = parse("# First\n# Second");
    assert_eq!(root.content, "First");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].content, "Second");
    assert!(root.children[0].children.is_empty());
    assert_eq!(root.walk().iter().filter(|n| n.level == 1).count(), 1);
}

#[test]
fn scenario_code_fence() {
    let root = parse("# T\n```\n# not a header\n```");
    assert_eq!(root.children.len(), 1);
    assert_eq!(root.children[0].content, "```\n# not a header\n```");
    assert!(root.walk().iter().all(|n| n.content != "not a header"));
}

#[test]
fn scenario_empty_input() {
    let root = parse("");
    assert_eq!(root.content, PLACEHOLDER_ROOT);
    assert!(root.children.is_empty());

    let graph = convert(&root, &NodeSizer::default());
    assert_eq!(graph.nodes.len(), 1);
    assert!(graph.edges.is_empty());
}

#[test]
fn render_positions_every_node() {
    let text = "# Plan\n## Research\n- papers\n- interviews\n## Build\n### Backend\n### Frontend\n## Ship";
    let graph = render(text, &Config::default()).expect("render");
    let tree = parse(text);
    assert_eq!(graph.nodes.len(), tree.count());
    assert_eq!(graph.edges.len(), tree.count() - 1);
    assert!(graph.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));

    for (i, a) in graph.nodes.iter().enumerate() {
        for b in &graph.nodes[i + 1..] {
            assert!(!a.pos().overlaps(&b.pos()), "{} overlaps {}", a.node.id, b.node.id);
        }
    }
}

#[test]
fn render_respects_direction() {
    let mut config = Config::default();
    config.layout.direction = Direction::RightLeft;
    let graph = render("# T\n## A", &config).expect("render");
    let root = graph.node("n0").expect("root");
    let child = graph.node("n1").expect("child");
    assert!(root.x > child.x);
}

#[test]
fn layout_errors_surface() {
    let mut graph = convert(&parse("# T\n## A"), &NodeSizer::default());
    graph.edges[0].target = "nowhere".to_string();
    let err = LayoutEngine::default().layout_blocking(graph).unwrap_err();
    assert!(matches!(err, LayoutError::UnknownNode { ref node, .. } if node == "nowhere"));
}

#[tokio::test]
async fn async_render_matches_blocking() {
    let text = "# T\n## A\n### A1\n## B";
    let config = Config::default();
    let blocking = render(text, &config).expect("blocking");
    let asynchronous = render_async(text, &config).await.expect("async");
    assert_eq!(blocking, asynchronous);
}

#[test]
fn graph_serializes_with_renderer_field_names() {
    let graph = render("# T\n## A", &Config::default()).expect("render");
    let json = serde_json::to_value(&graph).expect("json");
    let first = &json["nodes"][0];
    assert_eq!(first["id"], "n0");
    assert_eq!(first["nodeClass"], "root");
    assert!(first["box"]["width"].as_f64().is_some());
    assert!(first["x"].as_f64().is_some());
    assert_eq!(json["edges"][0]["id"], "e-n0-n1");
}
