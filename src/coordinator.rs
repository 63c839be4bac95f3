//! Incremental render coordination for streamed outlines.
//!
//! The pipeline itself is pure; this module owns the little state that sits
//! above it while text streams in:
//!
//! ```text
//! Idle -> Pending(text) -> LayingOut(text, generation) -> Applied(generation)
//!            ^                   |
//!            +---- new text -----+
//! ```
//!
//! Every pipeline pass is stamped with a monotonic generation. A layout
//! result is only applied when its generation is still the newest one
//! issued, so a slow layout overtaken by newer text is dropped instead of
//! being painted out of order.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::{CoordinatorConfig, SizerConfig};
use crate::error::LayoutError;
use crate::graph::{convert, CachedSizer, Graph, NodeSizer};
use crate::layout::{LaidOutGraph, PositionedNode};
use crate::outline::{parse_with, ParseOptions};

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Pending {
        text: String,
        first: Instant,
        last: Instant,
    },
    LayingOut {
        text: String,
        generation: u64,
    },
    Applied {
        generation: u64,
    },
}

/// What the caller should do after [`RenderCoordinator::poll`].
#[derive(Debug)]
pub enum Step {
    /// Nothing pending.
    Idle,
    /// Text is pending; poll again after this long.
    Wait(Duration),
    /// Structure and boxes were unchanged; the committed positions were
    /// reused and the frame is already applied.
    Reused { generation: u64 },
    /// Run the layout and hand the result to [`RenderCoordinator::complete`].
    Layout(LayoutRequest),
}

#[derive(Debug)]
pub struct LayoutRequest {
    pub generation: u64,
    pub graph: Graph,
}

#[derive(Debug, PartialEq)]
pub enum Completion {
    Applied {
        generation: u64,
        new_ids: Vec<String>,
    },
    /// A newer pass was issued meanwhile; the result was dropped.
    Stale { generation: u64 },
    /// Layout failed; the previous frame stays visible.
    Failed { generation: u64, error: LayoutError },
}

/// The graph currently on screen.
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: u64,
    pub graph: LaidOutGraph,
    /// Ids shown for the first time in this frame.
    pub new_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    pub passes: u64,
    pub layouts: u64,
    pub reused: u64,
    pub applied: u64,
    pub stale: u64,
    pub failed: u64,
}

pub struct RenderCoordinator {
    debounce: Duration,
    max_wait: Duration,
    parse_options: ParseOptions,
    sizer: CachedSizer,
    phase: Phase,
    issued: u64,
    last_text: Option<String>,
    frame: Option<Frame>,
    seen: HashSet<String>,
    stats: CoordinatorStats,
}

impl RenderCoordinator {
    pub fn new(config: CoordinatorConfig, sizer: SizerConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            max_wait: Duration::from_millis(config.max_wait_ms.max(config.debounce_ms)),
            parse_options: ParseOptions {
                id_strategy: config.id_strategy,
            },
            sizer: CachedSizer::new(NodeSizer::new(sizer), config.sizer_cache),
            phase: Phase::Idle,
            issued: 0,
            last_text: None,
            frame: None,
            seen: HashSet::new(),
            stats: CoordinatorStats::default(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn stats(&self) -> CoordinatorStats {
        self.stats
    }

    /// Newest generation handed out so far.
    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// True once nothing is pending and no current layout is outstanding.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Applied { .. })
    }

    /// Record the full text received so far.
    pub fn submit(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        match &mut self.phase {
            Phase::Pending {
                text: pending,
                last,
                ..
            } => {
                *pending = text;
                *last = now;
            }
            _ => {
                if self.last_text.as_deref() == Some(text.as_str()) {
                    return;
                }
                self.phase = Phase::Pending {
                    text,
                    first: now,
                    last: now,
                };
            }
        }
    }

    /// Start a pipeline pass if the pending text has been quiet for the
    /// debounce window, or has waited longer than the max wait.
    pub fn poll(&mut self, now: Instant) -> Step {
        let Phase::Pending { first, last, .. } = &self.phase else {
            return Step::Idle;
        };

        let quiet_at = *last + self.debounce;
        let forced_at = *first + self.max_wait;
        let due_at = quiet_at.min(forced_at);
        if now < due_at {
            return Step::Wait(due_at - now);
        }

        self.start_pass()
    }

    /// Start a pass for pending text right away, ignoring the debounce.
    pub fn flush(&mut self) -> Step {
        if !matches!(self.phase, Phase::Pending { .. }) {
            return Step::Idle;
        }
        self.start_pass()
    }

    fn start_pass(&mut self) -> Step {
        let Phase::Pending { text, .. } = std::mem::replace(&mut self.phase, Phase::Idle) else {
            return Step::Idle;
        };

        self.issued += 1;
        self.stats.passes += 1;
        let generation = self.issued;

        let tree = parse_with(&text, &self.parse_options);
        let graph = convert(&tree, &self.sizer);
        debug!(
            generation,
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "pipeline pass"
        );
        self.last_text = Some(text.clone());

        if let Some(frame) = &self.frame {
            if let Some(reused) = reuse_positions(&frame.graph, &graph) {
                self.stats.reused += 1;
                debug!(generation, "structure unchanged; reusing layout");
                self.frame = Some(Frame {
                    generation,
                    graph: reused,
                    new_ids: Vec::new(),
                });
                self.phase = Phase::Applied { generation };
                return Step::Reused { generation };
            }
        }

        self.stats.layouts += 1;
        self.phase = Phase::LayingOut { text, generation };
        Step::Layout(LayoutRequest { generation, graph })
    }

    /// Hand back the outcome of the layout for `generation`.
    pub fn complete(
        &mut self,
        generation: u64,
        result: Result<LaidOutGraph, LayoutError>,
    ) -> Completion {
        if generation != self.issued {
            self.stats.stale += 1;
            debug!(generation, current = self.issued, "discarding stale layout");
            return Completion::Stale { generation };
        }

        let in_flight = matches!(self.phase, Phase::LayingOut { generation: g, .. } if g == generation);

        match result {
            Ok(graph) => {
                let new_ids: Vec<String> = graph
                    .nodes
                    .iter()
                    .map(|n| n.node.id.clone())
                    .filter(|id| !self.seen.contains(id))
                    .collect();
                self.seen.extend(new_ids.iter().cloned());
                self.stats.applied += 1;
                info!(
                    generation,
                    nodes = graph.nodes.len(),
                    new = new_ids.len(),
                    "frame applied"
                );
                self.frame = Some(Frame {
                    generation,
                    graph,
                    new_ids: new_ids.clone(),
                });
                if in_flight {
                    self.phase = Phase::Applied { generation };
                }
                Completion::Applied {
                    generation,
                    new_ids,
                }
            }
            Err(error) => {
                self.stats.failed += 1;
                warn!(generation, error = %error, "layout failed; keeping previous frame");
                // Let the same text retry on the next submit.
                self.last_text = None;
                if in_flight {
                    self.phase = Phase::Idle;
                }
                Completion::Failed { generation, error }
            }
        }
    }
}

/// Rebuild `committed` with the nodes of `next` when ids, boxes and edges
/// all match, so only text changed.
fn reuse_positions(committed: &LaidOutGraph, next: &Graph) -> Option<LaidOutGraph> {
    if committed.nodes.len() != next.nodes.len() || committed.edges != next.edges {
        return None;
    }

    let mut nodes = Vec::with_capacity(next.nodes.len());
    for (old, new) in committed.nodes.iter().zip(&next.nodes) {
        if old.node.id != new.id || old.node.size != new.size {
            return None;
        }
        nodes.push(PositionedNode {
            node: new.clone(),
            x: old.x,
            y: old.y,
        });
    }

    Some(LaidOutGraph {
        nodes,
        edges: committed.edges.clone(),
        bounds: committed.bounds,
        spacing: committed.spacing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutEngine;

    fn coordinator() -> RenderCoordinator {
        RenderCoordinator::new(CoordinatorConfig::default(), SizerConfig::default())
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn expect_layout(step: Step) -> LayoutRequest {
        match step {
            Step::Layout(request) => request,
            other => panic!("expected layout request, got {:?}", other),
        }
    }

    #[test]
    fn starts_idle() {
        let mut c = coordinator();
        assert_eq!(c.phase(), &Phase::Idle);
        assert!(matches!(c.poll(Instant::now()), Step::Idle));
        assert!(c.is_settled());
    }

    #[test]
    fn debounce_coalesces_bursts() {
        let mut c = coordinator();
        let t0 = Instant::now();
        c.submit("# T", t0);
        c.submit("# T\n## A", t0 + ms(10));
        assert!(matches!(c.poll(t0 + ms(20)), Step::Wait(_)));

        let request = expect_layout(c.poll(t0 + ms(60)));
        assert_eq!(request.generation, 1);
        assert_eq!(request.graph.nodes.len(), 2);
        assert_eq!(c.stats().passes, 1);
    }

    #[test]
    fn max_wait_forces_a_pass_during_a_steady_stream() {
        let mut c = coordinator();
        let t0 = Instant::now();
        let mut text = String::from("# T");
        let mut fired = false;
        for i in 0..40u64 {
            text.push('x');
            let now = t0 + ms(i * 10);
            c.submit(text.clone(), now);
            if matches!(c.poll(now), Step::Layout(_)) {
                fired = true;
                break;
            }
        }
        assert!(fired);
    }

    #[test]
    fn applied_frame_reports_new_ids() {
        let mut c = coordinator();
        let engine = LayoutEngine::default();
        let t0 = Instant::now();

        c.submit("# T\n## A", t0);
        let request = expect_layout(c.flush());
        let result = engine.layout_blocking(request.graph);
        let completion = c.complete(request.generation, result);
        assert_eq!(
            completion,
            Completion::Applied {
                generation: 1,
                new_ids: vec!["n0".to_string(), "n1".to_string()],
            }
        );
        assert_eq!(c.phase(), &Phase::Applied { generation: 1 });

        c.submit("# T\n## A\n## B", t0 + ms(100));
        let request = expect_layout(c.flush());
        let result = engine.layout_blocking(request.graph);
        match c.complete(request.generation, result) {
            Completion::Applied { new_ids, .. } => assert_eq!(new_ids, vec!["n2".to_string()]),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.frame().map(|f| f.graph.nodes.len()), Some(3));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut c = coordinator();
        let engine = LayoutEngine::default();
        let t0 = Instant::now();

        c.submit("# T\n## A", t0);
        let first = expect_layout(c.flush());
        c.submit("# T\n## A\n## B", t0 + ms(5));
        let second = expect_layout(c.flush());

        let second_result = engine.layout_blocking(second.graph);
        assert!(matches!(
            c.complete(second.generation, second_result),
            Completion::Applied { generation: 2, .. }
        ));

        let first_result = engine.layout_blocking(first.graph);
        assert_eq!(
            c.complete(first.generation, first_result),
            Completion::Stale { generation: 1 }
        );
        assert_eq!(c.frame().map(|f| f.generation), Some(2));
        assert_eq!(c.stats().stale, 1);
    }

    #[test]
    fn failure_keeps_previous_frame() {
        let mut c = coordinator();
        let engine = LayoutEngine::default();
        let t0 = Instant::now();

        c.submit("# T", t0);
        let request = expect_layout(c.flush());
        c.complete(request.generation, engine.layout_blocking(request.graph));

        c.submit("# T\n## A", t0 + ms(5));
        let request = expect_layout(c.flush());
        let error = LayoutError::Task("boom".to_string());
        assert_eq!(
            c.complete(request.generation, Err(error.clone())),
            Completion::Failed {
                generation: 2,
                error,
            }
        );
        assert_eq!(c.phase(), &Phase::Idle);
        assert_eq!(c.frame().map(|f| f.generation), Some(1));

        // Same text is retried after a failure.
        c.submit("# T\n## A", t0 + ms(10));
        assert!(matches!(c.flush(), Step::Layout(_)));
    }

    #[test]
    fn unchanged_boxes_reuse_positions() {
        let mut c = coordinator();
        let engine = LayoutEngine::default();
        let t0 = Instant::now();

        c.submit("# T\n## Apple", t0);
        let request = expect_layout(c.flush());
        c.complete(request.generation, engine.layout_blocking(request.graph));
        let before = c.frame().map(|f| f.graph.nodes[1].clone());

        // Same length, same class: the box does not change.
        c.submit("# T\n## Mango", t0 + ms(5));
        assert!(matches!(c.flush(), Step::Reused { generation: 2 }));
        let after = c.frame().map(|f| f.graph.nodes[1].clone());

        let (before, after) = (before.expect("before"), after.expect("after"));
        assert_eq!(after.node.content, "Mango");
        assert_eq!((before.x, before.y), (after.x, after.y));
        assert_eq!(c.stats().reused, 1);
    }

    #[test]
    fn identical_text_is_ignored() {
        let mut c = coordinator();
        let engine = LayoutEngine::default();
        let t0 = Instant::now();

        c.submit("# T", t0);
        let request = expect_layout(c.flush());
        c.complete(request.generation, engine.layout_blocking(request.graph));

        c.submit("# T", t0 + ms(5));
        assert!(matches!(c.flush(), Step::Idle));
        assert_eq!(c.generation(), 1);
    }
}
