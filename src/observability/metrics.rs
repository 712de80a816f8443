//! Metric counters for the feature pipeline.
//!
//! Recording goes through the `metrics` facade; without an installed recorder the
//! calls are no-ops, so library users and tests pay nothing.

use std::fmt;

/// All metric names used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    RunsTotal,

    // Loader
    RecordsParsed,
    RowsSkipped,

    // Merge
    NetworkFiltered,
    MissingTranscript,

    // Quality gate
    QualityDropped,
    QualityRetained,

    // Postprocess
    DuplicateIds,
    CleanRows,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::RunsTotal => "feature_pipeline_runs_total",
            MetricName::RecordsParsed => "feature_pipeline_records_parsed_total",
            MetricName::RowsSkipped => "feature_pipeline_rows_skipped_total",
            MetricName::NetworkFiltered => "feature_pipeline_network_filtered_total",
            MetricName::MissingTranscript => "feature_pipeline_missing_transcript_total",
            MetricName::QualityDropped => "feature_pipeline_quality_dropped_total",
            MetricName::QualityRetained => "feature_pipeline_quality_retained_total",
            MetricName::DuplicateIds => "feature_pipeline_duplicate_ids_total",
            MetricName::CleanRows => "feature_pipeline_clean_rows_total",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        use MetricName::*;
        [
            RunsTotal,
            RecordsParsed,
            RowsSkipped,
            NetworkFiltered,
            MissingTranscript,
            QualityDropped,
            QualityRetained,
            DuplicateIds,
            CleanRows,
        ]
        .into_iter()
    }
}

fn add(name: MetricName, count: usize) {
    ::metrics::counter!(name.as_str()).increment(count as u64);
}

pub fn run_started() {
    add(MetricName::RunsTotal, 1);
}

// ============================================================================
// Loader Metrics
// ============================================================================

pub mod loader {
    use super::{add, MetricName};

    pub fn record_parsed() {
        add(MetricName::RecordsParsed, 1);
    }

    pub fn row_skipped() {
        add(MetricName::RowsSkipped, 1);
    }
}

// ============================================================================
// Merge Metrics
// ============================================================================

pub mod merge {
    use super::{add, MetricName};

    pub fn network_filtered(count: usize) {
        add(MetricName::NetworkFiltered, count);
    }

    pub fn missing_transcript(count: usize) {
        add(MetricName::MissingTranscript, count);
    }
}

// ============================================================================
// Quality Gate Metrics
// ============================================================================

pub mod quality_gate {
    use super::{add, MetricName};

    /// Rows removed by one rule, labelled with the rule name
    pub fn rule_dropped(rule: &'static str, count: usize) {
        ::metrics::counter!(MetricName::QualityDropped.as_str(), "rule" => rule)
            .increment(count as u64);
    }

    pub fn retained(count: usize) {
        add(MetricName::QualityRetained, count);
    }
}

// ============================================================================
// Postprocess Metrics
// ============================================================================

pub mod postprocess {
    use super::{add, MetricName};

    pub fn duplicate_ids(count: usize) {
        add(MetricName::DuplicateIds, count);
    }

    pub fn clean_rows(count: usize) {
        add(MetricName::CleanRows, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_are_unique_and_prefixed() {
        let names: Vec<&str> = MetricName::all_metrics().map(|m| m.as_str()).collect();
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(names.len(), unique.len());
        assert!(names.iter().all(|n| n.starts_with("feature_pipeline_")));
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        run_started();
        quality_gate::rule_dropped("short", 3);
        postprocess::clean_rows(0);
    }
}
