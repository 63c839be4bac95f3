use mindmark::graph::{convert, NodeClass, NodeSizer, SizeEstimator};
use mindmark::layout::LayoutEngine;
use mindmark::outline::parse;
use proptest::prelude::*;

fn outline_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (1usize..=6, "[A-Za-z][A-Za-z ]{0,12}").prop_map(|(n, t)| format!("{} {}", "#".repeat(n), t)),
        "[a-z][a-z ]{0,20}",
        Just("```".to_string()),
        Just("---".to_string()),
        Just(String::new()),
        "- [a-z]{1,8}",
        "#{1,3}",
    ]
}

fn outline() -> impl Strategy<Value = String> {
    prop::collection::vec(outline_line(), 0..30).prop_map(|lines| lines.join("\n"))
}

fn class() -> impl Strategy<Value = NodeClass> {
    prop_oneof![
        Just(NodeClass::Root),
        Just(NodeClass::Branch),
        Just(NodeClass::Leaf),
    ]
}

proptest! {
    #[test]
    fn conversion_is_idempotent(text in outline()) {
        let sizer = NodeSizer::default();
        let first = convert(&parse(&text), &sizer);
        let second = convert(&parse(&text), &sizer);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn exactly_one_root(text in outline()) {
        let root = parse(&text);
        prop_assert_eq!(root.level, 1);
        prop_assert_eq!(root.walk().iter().filter(|n| n.level == 1).count(), 1);
    }

    #[test]
    fn graph_is_complete(text in outline()) {
        let root = parse(&text);
        let graph = convert(&root, &NodeSizer::default());
        let n = root.count();
        prop_assert_eq!(graph.nodes.len(), n);
        prop_assert_eq!(graph.edges.len(), n - 1);
        prop_assert_eq!(
            graph.nodes.iter().filter(|node| node.class == NodeClass::Root).count(),
            1
        );
    }

    #[test]
    fn fenced_headers_stay_literal(title in "[A-Za-z]{1,10}", inner in "[A-Za-z]{1,10}") {
        let text = format!("# {}\n```\n## {}\n```", title, inner);
        let root = parse(&text);
        prop_assert_eq!(root.children.len(), 1);
        prop_assert!(root.walk().iter().all(|n| n.content != inner));
    }

    #[test]
    fn size_never_shrinks_when_appending(
        content in "[ -~\n]{0,60}",
        suffix in "[!-~]{1,20}",
        class in class(),
    ) {
        let sizer = NodeSizer::default();
        let before = sizer.size(&content, class);
        let after = sizer.size(&format!("{}{}", content, suffix), class);
        prop_assert!(after.width >= before.width);
        prop_assert!(after.height >= before.height);
        prop_assert!(after.width > 0.0 && after.height > 0.0);
    }

    #[test]
    fn layout_places_every_node(text in outline()) {
        let graph = convert(&parse(&text), &NodeSizer::default());
        let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.clone()).collect();
        let result = LayoutEngine::default().layout_blocking(graph);
        prop_assert!(result.is_ok());
        let result = result.unwrap();
        let placed: Vec<String> = result.nodes.iter().map(|n| n.node.id.clone()).collect();
        prop_assert_eq!(placed, ids);
        prop_assert!(result.nodes.iter().all(|n| n.x.is_finite() && n.y.is_finite()));
    }
}
