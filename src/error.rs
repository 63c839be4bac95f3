use std::path::PathBuf;

/// Failures of the layout stage. The other pipeline stages are total.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("edge {edge} references unknown node {node}")]
    UnknownNode { edge: String, node: String },
    #[error("duplicate node id {0}")]
    DuplicateNode(String),
    #[error("node {0} was not assigned a position")]
    Unpositioned(String),
    #[error("invalid spacing {name} = {value}")]
    InvalidSpacing { name: &'static str, value: f32 },
    #[error("layout task failed: {0}")]
    Task(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config extension: {0} (use .toml, .yaml or .yml)")]
    Extension(String),
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: String, reason: String },
}
