use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::layout::{Algorithm, Direction};
use crate::outline::IdStrategy;

const NODE_SPACING: f32 = 40.0;
const LAYER_SPACING: f32 = 80.0;
const EDGE_NODE_SPACING: f32 = 20.0;
const DEPTH_EXPONENT: f32 = 0.35;
const BRANCHING_EXPONENT: f32 = 0.25;
const REFERENCE_WIDTH: f32 = 180.0;
const REFERENCE_HEIGHT: f32 = 60.0;
const SIZE_SCALE_MIN: f32 = 0.75;
const SIZE_SCALE_MAX: f32 = 2.5;
const LAYOUT_MARGIN: f32 = 30.0;

const DEBOUNCE_MS: u64 = 40;
const MAX_WAIT_MS: u64 = 250;
const SIZER_CACHE: usize = 512;

/// Box bounds and text metrics for one node class.
///
/// Every field must be at least the matching field of the next smaller
/// class (root, then branch, then leaf), so the same text never yields a
/// bigger box for a smaller class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub min_width: f32,
    pub max_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Added to the widest line before clamping.
    pub padding: f32,
    /// Added to the summed line heights before clamping.
    pub line_padding: f32,
    pub line_height: f32,
    /// Width of one plain character.
    pub char_width: f32,
}

impl ClassMetrics {
    pub fn root() -> Self {
        Self {
            min_width: 180.0,
            max_width: 420.0,
            min_height: 56.0,
            max_height: 280.0,
            padding: 48.0,
            line_padding: 28.0,
            line_height: 26.0,
            char_width: 11.0,
        }
    }

    pub fn branch() -> Self {
        Self {
            min_width: 140.0,
            max_width: 360.0,
            min_height: 44.0,
            max_height: 240.0,
            padding: 36.0,
            line_padding: 22.0,
            line_height: 22.0,
            char_width: 9.0,
        }
    }

    pub fn leaf() -> Self {
        Self {
            min_width: 110.0,
            max_width: 320.0,
            min_height: 36.0,
            max_height: 200.0,
            padding: 28.0,
            line_padding: 18.0,
            line_height: 19.0,
            char_width: 8.0,
        }
    }

    fn fields(&self) -> [(&'static str, f32); 8] {
        [
            ("min_width", self.min_width),
            ("max_width", self.max_width),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
            ("padding", self.padding),
            ("line_padding", self.line_padding),
            ("line_height", self.line_height),
            ("char_width", self.char_width),
        ]
    }

    fn validate(&self, class: &str) -> Result<(), ConfigError> {
        for (name, value) in self.fields() {
            if matches!(name, "padding" | "line_padding") {
                continue;
            }
            positive(&format!("sizer.{}.{}", class, name), value)?;
        }
        for (name, value) in [("padding", self.padding), ("line_padding", self.line_padding)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(
                    format!("sizer.{}.{}", class, name),
                    "must be finite and non-negative",
                ));
            }
        }
        if self.min_width > self.max_width {
            return Err(invalid(format!("sizer.{}.min_width", class), "exceeds max_width"));
        }
        if self.min_height > self.max_height {
            return Err(invalid(format!("sizer.{}.min_height", class), "exceeds max_height"));
        }
        Ok(())
    }

    /// `self` must not exceed `larger` in any field.
    fn check_within(
        &self,
        class: &str,
        larger: &ClassMetrics,
        larger_class: &str,
    ) -> Result<(), ConfigError> {
        for ((name, value), (_, bound)) in self.fields().into_iter().zip(larger.fields()) {
            if value > bound {
                return Err(ConfigError::Invalid {
                    field: format!("sizer.{}.{}", class, name),
                    reason: format!(
                        "exceeds sizer.{}.{} ({} > {})",
                        larger_class, name, value, bound
                    ),
                });
            }
        }
        Ok(())
    }
}

/// A class table as written in a config file. Missing fields fall back to
/// the class defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClassMetricsTable {
    min_width: Option<f32>,
    max_width: Option<f32>,
    min_height: Option<f32>,
    max_height: Option<f32>,
    padding: Option<f32>,
    line_padding: Option<f32>,
    line_height: Option<f32>,
    char_width: Option<f32>,
}

impl ClassMetricsTable {
    fn over(self, base: ClassMetrics) -> ClassMetrics {
        ClassMetrics {
            min_width: self.min_width.unwrap_or(base.min_width),
            max_width: self.max_width.unwrap_or(base.max_width),
            min_height: self.min_height.unwrap_or(base.min_height),
            max_height: self.max_height.unwrap_or(base.max_height),
            padding: self.padding.unwrap_or(base.padding),
            line_padding: self.line_padding.unwrap_or(base.line_padding),
            line_height: self.line_height.unwrap_or(base.line_height),
            char_width: self.char_width.unwrap_or(base.char_width),
        }
    }
}

fn root_metrics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ClassMetrics, D::Error> {
    ClassMetricsTable::deserialize(deserializer).map(|t| t.over(ClassMetrics::root()))
}

fn branch_metrics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ClassMetrics, D::Error> {
    ClassMetricsTable::deserialize(deserializer).map(|t| t.over(ClassMetrics::branch()))
}

fn leaf_metrics<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ClassMetrics, D::Error> {
    ClassMetricsTable::deserialize(deserializer).map(|t| t.over(ClassMetrics::leaf()))
}

/// Per-style width and height factors applied on top of [`ClassMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleMultipliers {
    pub h1: f32,
    pub h2: f32,
    pub h3: f32,
    pub bold: f32,
    pub inline_code: f32,
    pub plain: f32,
    pub h1_line: f32,
    pub h2_line: f32,
    pub h3_line: f32,
    pub code_line: f32,
}

impl Default for StyleMultipliers {
    fn default() -> Self {
        Self {
            h1: 1.6,
            h2: 1.4,
            h3: 1.2,
            bold: 1.15,
            inline_code: 1.1,
            plain: 1.0,
            h1_line: 1.5,
            h2_line: 1.35,
            h3_line: 1.2,
            code_line: 1.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizerConfig {
    #[serde(default = "ClassMetrics::root", deserialize_with = "root_metrics")]
    pub root: ClassMetrics,
    #[serde(default = "ClassMetrics::branch", deserialize_with = "branch_metrics")]
    pub branch: ClassMetrics,
    #[serde(default = "ClassMetrics::leaf", deserialize_with = "leaf_metrics")]
    pub leaf: ClassMetrics,
    #[serde(default)]
    pub styles: StyleMultipliers,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            root: ClassMetrics::root(),
            branch: ClassMetrics::branch(),
            leaf: ClassMetrics::leaf(),
            styles: StyleMultipliers::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub algorithm: Algorithm,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default = "default_node_spacing")]
    pub node_spacing: f32,
    #[serde(default = "default_layer_spacing")]
    pub layer_spacing: f32,
    #[serde(default = "default_edge_node_spacing")]
    pub edge_node_spacing: f32,
    #[serde(default = "default_depth_exponent")]
    pub depth_exponent: f32,
    #[serde(default = "default_branching_exponent")]
    pub branching_exponent: f32,
    #[serde(default = "default_reference_width")]
    pub reference_width: f32,
    #[serde(default = "default_reference_height")]
    pub reference_height: f32,
    #[serde(default = "default_size_scale_min")]
    pub size_scale_min: f32,
    #[serde(default = "default_size_scale_max")]
    pub size_scale_max: f32,
    #[serde(default = "default_margin")]
    pub margin: f32,
}

fn default_node_spacing() -> f32 {
    NODE_SPACING
}

fn default_layer_spacing() -> f32 {
    LAYER_SPACING
}

fn default_edge_node_spacing() -> f32 {
    EDGE_NODE_SPACING
}

fn default_depth_exponent() -> f32 {
    DEPTH_EXPONENT
}

fn default_branching_exponent() -> f32 {
    BRANCHING_EXPONENT
}

fn default_reference_width() -> f32 {
    REFERENCE_WIDTH
}

fn default_reference_height() -> f32 {
    REFERENCE_HEIGHT
}

fn default_size_scale_min() -> f32 {
    SIZE_SCALE_MIN
}

fn default_size_scale_max() -> f32 {
    SIZE_SCALE_MAX
}

fn default_margin() -> f32 {
    LAYOUT_MARGIN
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            direction: Direction::default(),
            node_spacing: NODE_SPACING,
            layer_spacing: LAYER_SPACING,
            edge_node_spacing: EDGE_NODE_SPACING,
            depth_exponent: DEPTH_EXPONENT,
            branching_exponent: BRANCHING_EXPONENT,
            reference_width: REFERENCE_WIDTH,
            reference_height: REFERENCE_HEIGHT,
            size_scale_min: SIZE_SCALE_MIN,
            size_scale_max: SIZE_SCALE_MAX,
            margin: LAYOUT_MARGIN,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("node_spacing", self.node_spacing),
            ("layer_spacing", self.layer_spacing),
            ("edge_node_spacing", self.edge_node_spacing),
            ("reference_width", self.reference_width),
            ("reference_height", self.reference_height),
            ("size_scale_min", self.size_scale_min),
            ("size_scale_max", self.size_scale_max),
        ] {
            positive(&format!("layout.{}", name), value)?;
        }
        for (name, value) in [
            ("depth_exponent", self.depth_exponent),
            ("branching_exponent", self.branching_exponent),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("layout.{}", name), "must be within 0.0..=1.0"));
            }
        }
        if self.size_scale_min > self.size_scale_max {
            return Err(invalid("layout.size_scale_min", "exceeds size_scale_max"));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(invalid("layout.margin", "must be finite and non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
    #[serde(default)]
    pub id_strategy: IdStrategy,
    #[serde(default = "default_sizer_cache")]
    pub sizer_cache: usize,
}

fn default_debounce_ms() -> u64 {
    DEBOUNCE_MS
}

fn default_max_wait_ms() -> u64 {
    MAX_WAIT_MS
}

fn default_sizer_cache() -> usize {
    SIZER_CACHE
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEBOUNCE_MS,
            max_wait_ms: MAX_WAIT_MS,
            id_strategy: IdStrategy::default(),
            sizer_cache: SIZER_CACHE,
        }
    }
}

/// Every tunable of the pipeline. Missing sections and fields fall back to
/// the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sizer: SizerConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub coordinator: CoordinatorConfig,
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            other => Err(ConfigError::Extension(other.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sizer.root.validate("root")?;
        self.sizer.branch.validate("branch")?;
        self.sizer.leaf.validate("leaf")?;
        self.sizer.branch.check_within("branch", &self.sizer.root, "root")?;
        self.sizer.leaf.check_within("leaf", &self.sizer.branch, "branch")?;
        let styles = &self.sizer.styles;
        for (name, value) in [
            ("h1", styles.h1),
            ("h2", styles.h2),
            ("h3", styles.h3),
            ("bold", styles.bold),
            ("inline_code", styles.inline_code),
            ("plain", styles.plain),
            ("h1_line", styles.h1_line),
            ("h2_line", styles.h2_line),
            ("h3_line", styles.h3_line),
            ("code_line", styles.code_line),
        ] {
            positive(&format!("sizer.styles.{}", name), value)?;
        }
        self.layout.validate()?;
        if self.coordinator.sizer_cache == 0 {
            return Err(invalid("coordinator.sizer_cache", "must be at least 1"));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be finite and positive"))
    }
}

fn invalid(field: impl Into<String>, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.into(),
        reason: reason.to_string(),
    }
}
