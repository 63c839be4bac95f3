use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::graph::Graph;

use super::types::Spacing;

/// Sub-linear growth: `metric ^ exponent`, with metrics below 1 treated as 1.
fn growth(metric: usize, exponent: f32) -> f32 {
    (metric.max(1) as f32).powf(exponent)
}

/// Spacing factor for a graph `max_depth` levels deep whose busiest node
/// has `max_branching` children.
pub fn complexity_multiplier(max_depth: usize, max_branching: usize, options: &LayoutConfig) -> f32 {
    growth(max_depth, options.depth_exponent) * growth(max_branching, options.branching_exponent)
}

/// Scale the base spacing constants for `graph`.
///
/// Every gap grows with the complexity multiplier. Layer gaps additionally
/// follow the average box extent along the layer axis and in-layer gaps the
/// extent across it, each clamped to the configured scale range.
pub fn compute_spacing(graph: &Graph, options: &LayoutConfig) -> Result<Spacing, LayoutError> {
    let complexity = complexity_multiplier(graph.max_depth(), graph.max_branching(), options);

    let (width_scale, height_scale) = match graph.average_size() {
        Some(avg) => (
            (avg.width / options.reference_width)
                .clamp(options.size_scale_min, options.size_scale_max),
            (avg.height / options.reference_height)
                .clamp(options.size_scale_min, options.size_scale_max),
        ),
        None => (1.0, 1.0),
    };

    let (along_scale, across_scale) = if options.direction.is_vertical() {
        (height_scale, width_scale)
    } else {
        (width_scale, height_scale)
    };

    let spacing = Spacing {
        node_node: options.node_spacing * complexity * across_scale,
        layer: options.layer_spacing * complexity * along_scale,
        edge_node: options.edge_node_spacing * complexity * (width_scale + height_scale) / 2.0,
        complexity,
        margin: options.margin,
    };

    for (name, value) in [
        ("node_node", spacing.node_node),
        ("layer", spacing.layer),
        ("edge_node", spacing.edge_node),
        ("margin", spacing.margin),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(LayoutError::InvalidSpacing { name, value });
        }
    }

    Ok(spacing)
}
