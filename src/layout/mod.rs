mod engine;
mod layered;
mod spacing;
mod types;

pub use engine::LayoutEngine;
pub use layered::{LayeredLayout, LayoutAlgorithm};
pub use spacing::{complexity_multiplier, compute_spacing};
pub use types::{
    Algorithm, BBox, Direction, LaidOutGraph, LayoutPos, PositionedNode, Spacing,
};

/// Layout configuration as consumed by [`LayoutEngine`].
pub type LayoutOptions = crate::config::LayoutConfig;
