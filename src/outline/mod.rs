mod parser;
mod types;

pub use parser::{parse, parse_with};
pub use types::{IdStrategy, OutlineNode, ParseOptions, PLACEHOLDER_ROOT};
