mod convert;
mod sizer;
mod types;

pub use convert::convert;
pub use sizer::{CachedSizer, NodeSizer, SizeEstimator};
pub use types::{edge_id, BoxSize, Graph, GraphEdge, GraphNode, NodeClass};
