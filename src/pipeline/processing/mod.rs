// Pipeline processing: transcript quality rules and final-table postprocessing

pub mod postprocess;
pub mod quality_gate;

pub use postprocess::{extract_url, postprocess};
pub use quality_gate::{CleaningReport, QualityRule, RuleBuckets, TranscriptCleaner};
