//! Incremental markdown outline to mind-map pipeline.
//!
//! A (possibly partial) markdown outline is parsed into a tree
//! ([`outline`]), flattened into sized nodes and edges ([`graph`]) and laid
//! out with a layered algorithm ([`layout`]). [`coordinator`] and
//! [`session`] keep a streamed rendition stable while text keeps arriving.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod graph;
pub mod layout;
pub mod outline;
pub mod pipeline;
pub mod session;

pub use config::Config;
pub use error::{ConfigError, LayoutError};
pub use pipeline::{build_graph, render, render_async};
