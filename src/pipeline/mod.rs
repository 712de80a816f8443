// Data processing pipeline: ingestion, processing, and orchestration

pub mod ingestion;
pub mod orchestrator;
pub mod processing;

// Re-export key types and functions from each stage
pub use orchestrator::{FeaturePipeline, PipelineReport};
pub use processing::quality_gate;
