use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use tracing::{info, warn};

use crate::config::CleaningConfig;
use crate::domain::{MergedRow, TextColumns};
use crate::observability::metrics;

/// Transcript quality rules, in the order they are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRule {
    /// Trimmed text shorter than the minimum length
    Short,
    /// Text containing any non-ASCII character
    NonEnglish,
    /// Too few distinct words relative to total words
    Repetitive,
}

impl QualityRule {
    pub const ALL: [QualityRule; 3] = [
        QualityRule::Short,
        QualityRule::NonEnglish,
        QualityRule::Repetitive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityRule::Short => "short",
            QualityRule::NonEnglish => "non_english",
            QualityRule::Repetitive => "repetitive",
        }
    }
}

impl fmt::Display for QualityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityRule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| format!("unknown quality rule '{}'", s))
    }
}

/// Rows rejected by each rule during the last clean.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBuckets<R> {
    short: Vec<R>,
    non_english: Vec<R>,
    repetitive: Vec<R>,
}

impl<R> Default for RuleBuckets<R> {
    fn default() -> Self {
        Self {
            short: Vec::new(),
            non_english: Vec::new(),
            repetitive: Vec::new(),
        }
    }
}

impl<R> RuleBuckets<R> {
    pub fn get(&self, rule: QualityRule) -> &[R] {
        match rule {
            QualityRule::Short => &self.short,
            QualityRule::NonEnglish => &self.non_english,
            QualityRule::Repetitive => &self.repetitive,
        }
    }

    fn set(&mut self, rule: QualityRule, rows: Vec<R>) {
        match rule {
            QualityRule::Short => self.short = rows,
            QualityRule::NonEnglish => self.non_english = rows,
            QualityRule::Repetitive => self.repetitive = rows,
        }
    }

    /// Total rejected rows, counting each bucket separately
    pub fn total(&self) -> usize {
        self.short.len() + self.non_english.len() + self.repetitive.len()
    }
}

/// Per-rule counts from the last clean
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub initial: usize,
    pub short: usize,
    pub non_english: usize,
    pub repetitive: usize,
    pub retained: usize,
}

impl CleaningReport {
    pub fn dropped(&self, rule: QualityRule) -> usize {
        match rule {
            QualityRule::Short => self.short,
            QualityRule::NonEnglish => self.non_english,
            QualityRule::Repetitive => self.repetitive,
        }
    }
}

/// Drops short, non-English and repetitive transcripts, keeping what it dropped.
///
/// Rules run as a waterfall: each one only sees the rows the previous rules kept,
/// and recomputes the candidate text (trimmed cell value) from those rows.
#[derive(Debug, Clone)]
pub struct TranscriptCleaner<R = MergedRow> {
    text_column: String,
    min_length: usize,
    unique_ratio: f64,
    dropped: RuleBuckets<R>,
    report: Option<CleaningReport>,
}

impl<R> TranscriptCleaner<R>
where
    R: TextColumns + Clone + Eq + Hash,
{
    pub fn new(text_column: impl Into<String>, min_length: usize, unique_ratio: f64) -> Self {
        Self {
            text_column: text_column.into(),
            min_length,
            unique_ratio,
            dropped: RuleBuckets::default(),
            report: None,
        }
    }

    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.text_column.clone(), config.min_length, config.unique_ratio)
    }

    pub fn text_column(&self) -> &str {
        &self.text_column
    }

    /// Apply every rule and return the surviving rows in their original order.
    ///
    /// When rows have no column named like the configured text column, they are
    /// returned untouched and the previous buckets are left as they were.
    pub fn clean(&mut self, rows: Vec<R>, verbose: bool) -> Vec<R> {
        if !R::has_column(&self.text_column) {
            warn!(column = %self.text_column, "⚠️ Text column not found, skipping text cleaning");
            return rows;
        }

        let initial = rows.len();
        self.dropped = RuleBuckets::default();

        let mut remaining = rows;
        for rule in QualityRule::ALL {
            let (rejected, kept): (Vec<R>, Vec<R>) = remaining
                .into_iter()
                .partition(|row| self.violates(rule, self.candidate_text(row)));

            metrics::quality_gate::rule_dropped(rule.as_str(), rejected.len());
            self.dropped.set(rule, rejected);
            remaining = kept;
        }

        let report = CleaningReport {
            initial,
            short: self.dropped.get(QualityRule::Short).len(),
            non_english: self.dropped.get(QualityRule::NonEnglish).len(),
            repetitive: self.dropped.get(QualityRule::Repetitive).len(),
            retained: remaining.len(),
        };
        metrics::quality_gate::retained(report.retained);

        if verbose {
            self.log_report(&report);
        }
        self.report = Some(report);

        remaining
    }

    fn candidate_text<'r>(&self, row: &'r R) -> &'r str {
        row.text(&self.text_column).unwrap_or("").trim()
    }

    fn violates(&self, rule: QualityRule, text: &str) -> bool {
        match rule {
            QualityRule::Short => text.chars().count() < self.min_length,
            QualityRule::NonEnglish => !text.is_ascii(),
            QualityRule::Repetitive => self.is_repetitive(text),
        }
    }

    /// Distinct lower-cased words below `unique_ratio` of all words. Empty text is not repetitive.
    pub fn is_repetitive(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        if words.is_empty() {
            return false;
        }
        let distinct: HashSet<&str> = words.iter().copied().collect();
        (distinct.len() as f64) < self.unique_ratio * words.len() as f64
    }

    fn log_report(&self, report: &CleaningReport) {
        info!(
            short = report.short,
            non_english = report.non_english,
            repetitive = report.repetitive,
            min_length = self.min_length,
            "🧹 Cleaning report: kept {}/{} rows",
            report.retained,
            report.initial
        );
    }

    /// Counts from the most recent [`clean`](Self::clean), if any.
    pub fn last_report(&self) -> Option<&CleaningReport> {
        self.report.as_ref()
    }

    pub fn buckets(&self) -> &RuleBuckets<R> {
        &self.dropped
    }

    /// Rows dropped by `rule`, or by any rule with exact duplicates collapsed.
    /// Empty before the first clean.
    pub fn get_dropped(&self, rule: Option<QualityRule>) -> Vec<R> {
        match rule {
            Some(rule) => self.dropped.get(rule).to_vec(),
            None => {
                let mut seen = HashSet::new();
                QualityRule::ALL
                    .into_iter()
                    .flat_map(|rule| self.dropped.get(rule))
                    .filter(|row| seen.insert(*row))
                    .cloned()
                    .collect()
            }
        }
    }
}

impl Default for TranscriptCleaner<MergedRow> {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}
