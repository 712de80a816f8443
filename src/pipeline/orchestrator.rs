use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, instrument};

use crate::app::ports::WorkbookReader;
use crate::config::{PipelineConfig, Settings};
use crate::constants;
use crate::domain::{CleanRow, CleanTableRow, MergedRow};
use crate::error::{PipelineError, Result};
use crate::infra::{write_table, CalamineWorkbookReader};
use crate::observability::metrics;
use crate::pipeline::ingestion::{read_transcripts, SheetLoader, TranscriptIndex};
use crate::pipeline::processing::{postprocess, CleaningReport, TranscriptCleaner};

/// Row counts for one run. Every row the loader produced lands in exactly one of
/// `network_filtered`, `missing_transcript`, the quality buckets, or `clean_rows`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PipelineReport {
    pub parsed_records: usize,
    pub network_filtered: usize,
    pub merged_rows: usize,
    pub missing_transcript: usize,
    pub quality: CleaningReport,
    pub duplicate_id_rows: usize,
    pub clean_rows: usize,
    /// Rows in the dropped table after collapsing duplicates
    pub dropped_rows_written: usize,
    pub output_path: PathBuf,
    pub dropped_path: PathBuf,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PipelineReport {
    /// Sum of all rows removed along the way plus the rows kept
    pub fn accounted_rows(&self) -> usize {
        self.network_filtered
            + self.missing_transcript
            + self.quality.short
            + self.quality.non_english
            + self.quality.repetitive
            + self.clean_rows
    }
}

/// Merge -> clean -> postprocess -> save, for one workbook and one transcript table.
pub struct FeaturePipeline {
    settings: Settings,
    config: PipelineConfig,
    reader: Box<dyn WorkbookReader>,
    cleaner: TranscriptCleaner<MergedRow>,
    /// Log the cleaning report after the quality rules run
    verbose: bool,
    report: Option<PipelineReport>,
}

impl FeaturePipeline {
    pub fn new(settings: Settings, config: PipelineConfig) -> Self {
        Self::with_reader(settings, config, Box::new(CalamineWorkbookReader::new()))
    }

    pub fn with_reader(
        settings: Settings,
        config: PipelineConfig,
        reader: Box<dyn WorkbookReader>,
    ) -> Self {
        let cleaner = TranscriptCleaner::from_config(&config.cleaning);
        Self {
            settings,
            config,
            reader,
            cleaner,
            verbose: true,
            report: None,
        }
    }

    /// Turn the cleaning report log on or off. Counts in [`PipelineReport`] are unaffected.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn cleaner(&self) -> &TranscriptCleaner<MergedRow> {
        &self.cleaner
    }

    /// Counts from the most recent successful [`run`](Self::run).
    pub fn last_report(&self) -> Option<&PipelineReport> {
        self.report.as_ref()
    }

    /// Execute the full pipeline, writing the clean and dropped tables.
    ///
    /// Fails with [`PipelineError::MissingInputs`] before reading anything when
    /// the workbook or the transcript table does not exist.
    #[instrument(skip(self))]
    pub fn run(&mut self) -> Result<Vec<CleanRow>> {
        info!("🚀 Starting feature pipeline");
        metrics::run_started();

        self.validate_inputs()?;

        let mut report = PipelineReport {
            output_path: self.settings.output_path(),
            dropped_path: self.settings.dropped_path(),
            ..PipelineReport::default()
        };

        let merged = self.load_and_merge(&mut report)?;
        let cleaned = self.clean(merged, &mut report);
        let rows = postprocess(cleaned, &self.config);
        report.duplicate_id_rows = rows.iter().filter(|r| r.is_duplicate_id).count();
        report.clean_rows = rows.len();

        self.save(&rows, &mut report)?;

        report.completed_at = Some(Utc::now());
        self.report = Some(report);
        Ok(rows)
    }

    fn validate_inputs(&self) -> Result<()> {
        let missing: Vec<PathBuf> = [self.settings.excel_path(), self.settings.transcripts_path()]
            .into_iter()
            .filter(|p| !p.exists())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::MissingInputs(missing))
        }
    }

    /// Load workbook records for the transcript network and left-join transcripts by join key.
    #[instrument(skip_all)]
    fn load_and_merge(&self, report: &mut PipelineReport) -> Result<Vec<MergedRow>> {
        let records = SheetLoader::new(&self.config, self.reader.as_ref())
            .load(&self.settings.excel_path())?;
        report.parsed_records = records.len();

        let network = &self.config.defaults.transcript_network;
        let records: Vec<_> = records
            .into_iter()
            .filter(|r| &r.social_network == network)
            .collect();
        report.network_filtered = report.parsed_records - records.len();
        metrics::merge::network_filtered(report.network_filtered);
        info!(network = %network, rows = records.len(), "📊 Rows for transcript network");

        let transcripts = TranscriptIndex::build(read_transcripts(&self.settings.transcripts_path())?);

        let merged: Vec<MergedRow> = records
            .into_iter()
            .map(|record| {
                let mut row = MergedRow::new(record, None);
                row.transcript = transcripts.lookup(&row.join_key).map(str::to_string);
                row
            })
            .collect();
        report.merged_rows = merged.len();

        Ok(merged)
    }

    /// Drop rows without a transcript, then apply the quality rules.
    #[instrument(skip_all)]
    fn clean(&mut self, rows: Vec<MergedRow>, report: &mut PipelineReport) -> Vec<MergedRow> {
        info!("🧼 Running data cleaning");

        let before = rows.len();
        let rows: Vec<MergedRow> = rows
            .into_iter()
            .map(|mut row| {
                if row.transcript.as_deref() == Some(constants::NAN_LITERAL) {
                    row.transcript = None;
                }
                row
            })
            .filter(|row| row.transcript.is_some())
            .collect();
        report.missing_transcript = before - rows.len();
        metrics::merge::missing_transcript(report.missing_transcript);
        info!(rows = report.missing_transcript, "Dropped rows missing transcript");

        let cleaned = self.cleaner.clean(rows, self.verbose);
        report.quality = self.cleaner.last_report().cloned().unwrap_or_else(|| CleaningReport {
            initial: cleaned.len(),
            retained: cleaned.len(),
            ..CleaningReport::default()
        });
        cleaned
    }

    #[instrument(skip_all)]
    fn save(&self, rows: &[CleanRow], report: &mut PipelineReport) -> Result<()> {
        write_table(
            &report.output_path,
            &constants::CLEAN_COLUMNS,
            rows.iter().map(CleanTableRow::from),
        )?;
        metrics::postprocess::clean_rows(rows.len());

        let dropped = self.cleaner.get_dropped(None);
        report.dropped_rows_written =
            write_table(&report.dropped_path, &constants::MERGED_COLUMNS, &dropped)?;

        info!(
            clean_path = %report.output_path.display(),
            clean_rows = rows.len(),
            dropped_path = %report.dropped_path.display(),
            dropped_rows = report.dropped_rows_written,
            "✅ Pipeline complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ports::RawSheet;
    use std::path::Path;
    use tempfile::tempdir;

    struct NoSheets;

    impl WorkbookReader for NoSheets {
        fn read_sheets(&self, _path: &Path) -> Result<Vec<RawSheet>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_missing_inputs_fail_before_any_work() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path());
        let mut pipeline =
            FeaturePipeline::with_reader(settings.clone(), PipelineConfig::default(), Box::new(NoSheets));

        let err = pipeline.run().unwrap_err();
        match err {
            PipelineError::MissingInputs(paths) => {
                assert_eq!(paths, vec![settings.excel_path(), settings.transcripts_path()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!settings.output_path().exists());
        assert!(pipeline.last_report().is_none());
    }

    #[test]
    fn test_empty_workbook_writes_empty_tables() {
        let dir = tempdir().unwrap();
        let settings = Settings::with_data_dir(dir.path());
        std::fs::write(settings.excel_path(), b"placeholder").unwrap();
        std::fs::write(settings.transcripts_path(), "Link,Transcript\n").unwrap();

        let mut pipeline =
            FeaturePipeline::with_reader(settings.clone(), PipelineConfig::default(), Box::new(NoSheets));
        let rows = pipeline.run().unwrap();

        assert!(rows.is_empty());
        let clean = std::fs::read_to_string(settings.output_path()).unwrap();
        assert_eq!(
            clean,
            "\u{feff}id,link_id,main_subject,sub_topic,question,link_cleaned,transcript\n"
        );
        assert!(settings.dropped_path().exists());
        let report = pipeline.last_report().unwrap();
        assert_eq!(report.parsed_records, 0);
        assert_eq!(report.accounted_rows(), 0);
    }
}
