use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::config::{ClassMetrics, SizerConfig};

use super::types::{BoxSize, NodeClass};

/// Estimates the box a node needs for its text.
pub trait SizeEstimator {
    fn size(&self, content: &str, class: NodeClass) -> BoxSize;
}

/// Character-count based box estimator.
///
/// Width follows the widest line, height the sum of line heights, and both
/// are clamped to the class bounds. Line styles are recognised from
/// prefixes (or, for inline code, from the presence of a backtick) so that
/// appending text never switches a line to a narrower style.
#[derive(Debug, Clone, Default)]
pub struct NodeSizer {
    config: SizerConfig,
}

impl NodeSizer {
    pub fn new(config: SizerConfig) -> Self {
        Self { config }
    }

    fn metrics(&self, class: NodeClass) -> &ClassMetrics {
        match class {
            NodeClass::Root => &self.config.root,
            NodeClass::Branch => &self.config.branch,
            NodeClass::Leaf => &self.config.leaf,
        }
    }

    fn width_factor(&self, line: &str) -> f32 {
        let styles = &self.config.styles;
        let head = line.trim_start();
        let mut factor = styles.plain;

        if head.starts_with("# ") {
            factor = factor.max(styles.h1);
        } else if head.starts_with("## ") {
            factor = factor.max(styles.h2);
        } else if head.starts_with("### ") {
            factor = factor.max(styles.h3);
        }
        if head.starts_with("**") || head.starts_with("__") {
            factor = factor.max(styles.bold);
        }
        if line.contains('`') {
            factor = factor.max(styles.inline_code);
        }
        factor
    }

    fn height_factor(&self, line: &str, in_fence: bool) -> f32 {
        let styles = &self.config.styles;
        if in_fence {
            return styles.code_line.max(1.0);
        }
        let head = line.trim_start();
        if head.starts_with("# ") {
            styles.h1_line.max(1.0)
        } else if head.starts_with("## ") {
            styles.h2_line.max(1.0)
        } else if head.starts_with("### ") {
            styles.h3_line.max(1.0)
        } else {
            1.0
        }
    }
}

impl SizeEstimator for NodeSizer {
    fn size(&self, content: &str, class: NodeClass) -> BoxSize {
        let metrics = self.metrics(class);

        if content.trim().is_empty() {
            return BoxSize::new(metrics.min_width * 0.6, metrics.min_height);
        }

        let mut max_line_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        let mut in_fence = false;

        for line in content.lines() {
            let is_fence = line.trim_start().starts_with("```");
            if is_fence {
                in_fence = !in_fence;
            }

            let chars = line.chars().count() as f32;
            let width = chars * metrics.char_width * self.width_factor(line);
            max_line_width = max_line_width.max(width);

            // Both fence delimiters count as code lines.
            let code_line = in_fence || is_fence;
            total_height += metrics.line_height * self.height_factor(line, code_line);
        }

        let width = (max_line_width + metrics.padding).clamp(metrics.min_width, metrics.max_width);
        let height =
            (total_height + metrics.line_padding).clamp(metrics.min_height, metrics.max_height);

        BoxSize::new(width, height)
    }
}

/// [`NodeSizer`] memoized per `(content, class)`.
///
/// Streaming re-parses mostly resize nodes that did not change.
pub struct CachedSizer {
    inner: NodeSizer,
    cache: Mutex<LruCache<(String, NodeClass), BoxSize>>,
}

impl CachedSizer {
    pub fn new(inner: NodeSizer, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SizeEstimator for CachedSizer {
    fn size(&self, content: &str, class: NodeClass) -> BoxSize {
        let key = (content.to_string(), class);
        if let Some(cached) = self.cache.lock().get(&key) {
            return *cached;
        }

        let measured = self.inner.size(content, class);
        self.cache.lock().put(key, measured);
        measured
    }
}
