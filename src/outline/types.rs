use serde::Serialize;

/// Content given to the root when the outline has no `#` title yet.
pub const PLACEHOLDER_ROOT: &str = "Untitled";

/// A node of the parsed outline tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineNode {
    pub id: String,
    pub content: String,
    pub level: usize,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }

    /// Pre-order walk over the subtree.
    pub fn walk(&self) -> Vec<&OutlineNode> {
        let mut out = Vec::with_capacity(self.count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in node.children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }

    pub fn find(&self, id: &str) -> Option<&OutlineNode> {
        self.walk().into_iter().find(|n| n.id == id)
    }
}

/// How node ids are assigned during a parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// `n0`, `n1`, ... in document order. Cheap, but an early edit shifts
    /// every later id.
    #[default]
    Counter,
    /// Sibling-index path from the root (`0`, `0.2`, `0.2.1`). Survives
    /// edits that do not insert a preceding sibling.
    Path,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub id_strategy: IdStrategy,
}
