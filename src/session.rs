//! Async driver replaying a chunked text stream through the coordinator.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::debug;

use crate::config::Config;
use crate::coordinator::{Completion, CoordinatorStats, RenderCoordinator, Step};
use crate::error::LayoutError;
use crate::layout::{LaidOutGraph, LayoutEngine};

type LayoutDone = (u64, Result<LaidOutGraph, LayoutError>);

/// One applied frame, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEvent {
    pub generation: u64,
    pub nodes: usize,
    pub new_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub frames: Vec<FrameEvent>,
    pub stats: CoordinatorStats,
    pub last_error: Option<LayoutError>,
    pub final_graph: Option<LaidOutGraph>,
}

/// Split `text` into chunks of at most `size` characters, mimicking a token
/// stream.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let size = size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

pub struct StreamSession {
    coordinator: RenderCoordinator,
    engine: LayoutEngine,
    tx: mpsc::UnboundedSender<LayoutDone>,
    rx: mpsc::UnboundedReceiver<LayoutDone>,
    text: String,
    frames: Vec<FrameEvent>,
    last_error: Option<LayoutError>,
}

impl StreamSession {
    pub fn new(config: &Config) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator: RenderCoordinator::new(config.coordinator, config.sizer),
            engine: LayoutEngine::new(config.layout.clone()),
            tx,
            rx,
            text: String::new(),
            frames: Vec::new(),
            last_error: None,
        }
    }

    /// Append a chunk, apply finished layouts and start a pass if one is due.
    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        let now = Instant::now();
        self.coordinator.submit(self.text.clone(), now);
        self.drain();
        let step = self.coordinator.poll(now);
        self.dispatch(step);
    }

    /// Apply any layouts that finished since the last call.
    pub fn drain(&mut self) {
        while let Ok((generation, result)) = self.rx.try_recv() {
            self.apply(generation, result);
        }
    }

    /// Start a due pass, if any, without waiting for new text.
    pub fn tick(&mut self) {
        self.drain();
        let step = self.coordinator.poll(Instant::now());
        self.dispatch(step);
    }

    /// Flush pending text and wait until the newest pass is applied.
    pub async fn finish(mut self) -> SessionReport {
        self.drain();
        let step = self.coordinator.flush();
        self.dispatch(step);

        while !self.coordinator.is_settled() {
            match self.rx.recv().await {
                Some((generation, result)) => self.apply(generation, result),
                None => break,
            }
        }

        SessionReport {
            frames: self.frames,
            stats: self.coordinator.stats(),
            last_error: self.last_error,
            final_graph: self.coordinator.frame().map(|f| f.graph.clone()),
        }
    }

    fn dispatch(&mut self, step: Step) {
        match step {
            Step::Layout(request) => {
                let engine = self.engine.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = engine.layout(request.graph).await;
                    let _ = tx.send((request.generation, result));
                });
            }
            Step::Reused { generation } => {
                if let Some(frame) = self.coordinator.frame() {
                    self.frames.push(FrameEvent {
                        generation,
                        nodes: frame.graph.nodes.len(),
                        new_ids: Vec::new(),
                    });
                }
            }
            Step::Wait(_) | Step::Idle => {}
        }
    }

    fn apply(&mut self, generation: u64, result: Result<LaidOutGraph, LayoutError>) {
        let nodes = result.as_ref().map(|g| g.nodes.len()).unwrap_or(0);
        match self.coordinator.complete(generation, result) {
            Completion::Applied {
                generation,
                new_ids,
            } => self.frames.push(FrameEvent {
                generation,
                nodes,
                new_ids,
            }),
            Completion::Stale { generation } => debug!(generation, "stale frame dropped"),
            Completion::Failed { error, .. } => self.last_error = Some(error),
        }
    }
}

/// Feed `chunks` one by one, pausing `delay` between them, and return once
/// the final text is laid out.
pub async fn replay<I>(chunks: I, delay: Duration, config: &Config) -> SessionReport
where
    I: IntoIterator<Item = String>,
{
    let mut session = StreamSession::new(config);
    for chunk in chunks {
        session.push(&chunk);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        session.tick();
    }
    session.finish().await
}
