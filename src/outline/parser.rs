use super::types::*;

/// Parse an outline with counter ids.
pub fn parse(text: &str) -> OutlineNode {
    parse_with(text, &ParseOptions::default())
}

/// Parse a (possibly partial) markdown outline into a rooted tree.
///
/// Never fails: malformed or truncated input degrades to the best
/// structure available, and empty input yields a placeholder root.
pub fn parse_with(text: &str, options: &ParseOptions) -> OutlineNode {
    let mut builder = OutlineBuilder::default();

    for line in text.lines() {
        builder.feed_line(line);
    }
    builder.flush();

    builder.finish(options.id_strategy)
}

/// Deepest stored level. Nesting below it keeps the tree shape but not the
/// level number.
const MAX_LEVEL: usize = 6;

struct Slot {
    content: String,
    level: usize,
    children: Vec<usize>,
}

#[derive(Default)]
struct OutlineBuilder<'a> {
    slots: Vec<Slot>,
    titled: bool,
    // (slot index, header level as written in the source)
    stack: Vec<(usize, usize)>,
    // Set once a second `#` title has been folded under the root; every
    // header after that lives one level deeper than written.
    shift: usize,
    buffer: Vec<&'a str>,
    in_code: bool,
}

impl<'a> OutlineBuilder<'a> {
    fn feed_line(&mut self, line: &'a str) {
        if is_fence(line) {
            if self.in_code {
                self.buffer.push(line);
                self.in_code = false;
                self.flush();
            } else {
                self.flush();
                self.in_code = true;
                self.buffer.push(line);
            }
            return;
        }

        if self.in_code {
            self.buffer.push(line);
            return;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !self.buffer.is_empty() {
                self.buffer.push("");
            }
            return;
        }

        if is_rule(trimmed) {
            return;
        }

        match header_marker(trimmed) {
            Some((_, "")) => {}
            Some((level, title)) => self.header(level, title),
            None => self.buffer.push(line.trim_end()),
        }
    }

    fn ensure_root(&mut self) -> usize {
        if self.slots.is_empty() {
            self.slots.push(Slot {
                content: PLACEHOLDER_ROOT.to_string(),
                level: 1,
                children: Vec::new(),
            });
            self.stack = vec![(0, 1)];
        }
        0
    }

    fn add_child(&mut self, parent: usize, content: String, level: usize) -> usize {
        let idx = self.slots.len();
        self.slots.push(Slot {
            content,
            level,
            children: Vec::new(),
        });
        self.slots[parent].children.push(idx);
        idx
    }

    /// Attach accumulated body text to the current section as one leaf.
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let joined = self.buffer.join("\n");
        self.buffer.clear();

        let content = joined.trim();
        if content.is_empty() {
            return;
        }

        self.ensure_root();
        let (parent, _) = self.stack.last().copied().unwrap_or((0, 1));
        let level = (self.slots[parent].level + 1).min(MAX_LEVEL);
        self.add_child(parent, content.to_string(), level);
    }

    fn header(&mut self, level: usize, title: &str) {
        self.flush();

        if level == 1 {
            if self.slots.is_empty() {
                self.ensure_root();
                self.slots[0].content = title.to_string();
                self.titled = true;
            } else if !self.titled {
                // Body text or subsections arrived before the title.
                self.slots[0].content = title.to_string();
                self.titled = true;
                self.stack.truncate(1);
            } else {
                self.shift = 1;
                self.stack.truncate(1);
                let idx = self.add_child(0, title.to_string(), 1 + self.shift);
                self.stack.push((idx, 1));
            }
            return;
        }

        self.ensure_root();
        while self.stack.len() > 1 && self.stack.last().is_some_and(|&(_, l)| l >= level) {
            self.stack.pop();
        }
        let (parent, _) = self.stack.last().copied().unwrap_or((0, 1));
        let idx = self.add_child(parent, title.to_string(), (level + self.shift).min(MAX_LEVEL));
        self.stack.push((idx, level));
    }

    fn finish(mut self, strategy: IdStrategy) -> OutlineNode {
        self.ensure_root();
        let mut counter = 0usize;
        self.materialize(0, "0", strategy, &mut counter)
    }

    fn materialize(
        &self,
        idx: usize,
        path: &str,
        strategy: IdStrategy,
        counter: &mut usize,
    ) -> OutlineNode {
        let id = match strategy {
            IdStrategy::Counter => format!("n{}", *counter),
            IdStrategy::Path => path.to_string(),
        };
        *counter += 1;

        let slot = &self.slots[idx];
        let children = slot
            .children
            .iter()
            .enumerate()
            .map(|(i, &child)| {
                let child_path = format!("{}.{}", path, i);
                self.materialize(child, &child_path, strategy, counter)
            })
            .collect();

        OutlineNode {
            id,
            content: slot.content.clone(),
            level: slot.level,
            children,
        }
    }
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// `---`, `***`, `___` (three or more of one marker and nothing else).
fn is_rule(trimmed: &str) -> bool {
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    matches!(first, '-' | '_' | '*') && trimmed.len() >= 3 && chars.all(|c| c == first)
}

/// Returns the header level and title for `#`..`######` lines. A marker
/// without a title (still streaming in) yields an empty title.
fn header_marker(trimmed: &str) -> Option<(usize, &str)> {
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if rest.is_empty() {
        return Some((hashes, ""));
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((hashes, rest.trim()))
}
