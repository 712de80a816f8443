// Observability: metric counters for each pipeline phase

pub mod metrics;

pub use metrics::MetricName;
