pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod hashing;
pub mod logging;
pub mod pipeline;

// Ports for swappable readers and the file-format adapters behind them
pub mod app;
pub mod infra;

pub mod observability;

pub use config::{PipelineConfig, Settings};
pub use error::{PipelineError, Result};
pub use pipeline::{FeaturePipeline, PipelineReport};
