use std::path::Path;
use tracing::{info, instrument, warn};

use crate::app::ports::{RawSheet, RowCells, WorkbookReader};
use crate::config::PipelineConfig;
use crate::domain::SourceRecord;
use crate::error::Result;
use crate::hashing;
use crate::observability::metrics;

/// How a sheet row is interpreted, decided from cells A, B and C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind<'a> {
    /// A and B both empty
    Blank,
    /// Only A is filled: starts a new sub-topic section
    Header(&'a str),
    /// B or C is filled: one question/link entry
    Data {
        question: Option<&'a str>,
        link: Option<&'a str>,
    },
}

impl<'a> RowKind<'a> {
    /// The data-row test runs before the header test, so a row with A and B filled
    /// is always data.
    pub fn classify(cells: &'a RowCells) -> Self {
        let [a, b, c] = cells;
        match (a.as_deref(), b.as_deref(), c.as_deref()) {
            (None, None, _) => RowKind::Blank,
            (Some(title), None, None) => RowKind::Header(title),
            (question, link, _) => RowKind::Data { question, link },
        }
    }
}

/// Parses a multi-sheet workbook into validated [`SourceRecord`]s.
pub struct SheetLoader<'a> {
    config: &'a PipelineConfig,
    reader: &'a dyn WorkbookReader,
}

impl<'a> SheetLoader<'a> {
    pub fn new(config: &'a PipelineConfig, reader: &'a dyn WorkbookReader) -> Self {
        Self { config, reader }
    }

    /// Load every sheet in workbook order. Rows that fail validation are skipped with a warning.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn load(&self, path: &Path) -> Result<Vec<SourceRecord>> {
        info!("📂 Loading workbook");

        let sheets = self.reader.read_sheets(path)?;
        let records: Vec<SourceRecord> = sheets
            .iter()
            .filter(|sheet| !sheet.rows.is_empty())
            .flat_map(|sheet| parse_sheet(sheet, self.config))
            .collect();

        info!(records = records.len(), sheets = sheets.len(), "✅ Extracted valid rows");
        Ok(records)
    }
}

/// Fold one sheet's rows into records, carrying the current sub-topic as the accumulator.
pub fn parse_sheet(sheet: &RawSheet, config: &PipelineConfig) -> Vec<SourceRecord> {
    let initial = (Vec::new(), config.defaults.sub_topic.clone());

    let (records, _) = sheet
        .rows
        .iter()
        .enumerate()
        .fold(initial, |(mut records, sub_topic), (index, cells)| {
            match RowKind::classify(cells) {
                RowKind::Blank => (records, sub_topic),
                RowKind::Header(title) => (records, title.to_string()),
                RowKind::Data { question, link } => {
                    match build_record(&sheet.name, &sub_topic, question, link, config) {
                        Ok(record) => {
                            metrics::loader::record_parsed();
                            records.push(record);
                        }
                        Err(e) => {
                            metrics::loader::row_skipped();
                            warn!(sheet = %sheet.name, row = index, "⚠️ Skipping invalid row: {}", e);
                        }
                    }
                    (records, sub_topic)
                }
            }
        });

    records
}

fn build_record(
    sheet_name: &str,
    sub_topic: &str,
    question: Option<&str>,
    link: Option<&str>,
    config: &PipelineConfig,
) -> Result<SourceRecord> {
    let question = question.unwrap_or(&config.defaults.unknown_question);
    SourceRecord::new(
        hashing::record_id(question, link),
        sheet_name.to_string(),
        sub_topic.to_string(),
        question.to_string(),
        link.map(str::to_string),
        detect_network(link, config),
    )
}

/// Classify a link by the first configured keyword it contains (case-insensitive).
pub fn detect_network(link: Option<&str>, config: &PipelineConfig) -> String {
    let link = match link {
        Some(l) if !l.is_empty() => l.to_lowercase(),
        _ => return config.defaults.no_link_network.clone(),
    };

    config
        .social_networks
        .iter()
        .find(|entry| link.contains(&entry.keyword.to_lowercase()))
        .map(|entry| entry.network.clone())
        .unwrap_or_else(|| config.defaults.other_network.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NetworkKeyword;

    fn cells(a: Option<&str>, b: Option<&str>, c: Option<&str>) -> RowCells {
        [a.map(str::to_string), b.map(str::to_string), c.map(str::to_string)]
    }

    fn header(title: &str) -> RowCells {
        cells(Some(title), None, None)
    }

    fn data(question: &str, link: &str) -> RowCells {
        cells(Some(question), Some(link), None)
    }

    #[test]
    fn test_row_with_question_and_link_is_always_data() {
        for status in [None, Some("done")] {
            let row = cells(Some("Q"), Some("https://instagram.com/p/1"), status);
            assert_eq!(
                RowKind::classify(&row),
                RowKind::Data {
                    question: Some("Q"),
                    link: Some("https://instagram.com/p/1"),
                }
            );
        }
    }

    #[test]
    fn test_row_kinds() {
        assert_eq!(RowKind::classify(&cells(None, None, None)), RowKind::Blank);
        assert_eq!(RowKind::classify(&cells(None, None, Some("x"))), RowKind::Blank);
        assert_eq!(RowKind::classify(&header("Topic")), RowKind::Header("Topic"));
        assert_eq!(
            RowKind::classify(&cells(Some("Q"), None, Some("pending"))),
            RowKind::Data { question: Some("Q"), link: None }
        );
        assert_eq!(
            RowKind::classify(&cells(None, Some("https://a"), None)),
            RowKind::Data { question: None, link: Some("https://a") }
        );
    }

    #[test]
    fn test_sub_topic_is_sticky_until_next_header() {
        let config = PipelineConfig::default();
        let sheet = RawSheet::new(
            "Antisemitism",
            vec![
                header("X"),
                data("q1", "https://instagram.com/p/1"),
                data("q2", "https://instagram.com/p/2"),
                header("Y"),
                data("q3", "https://instagram.com/p/3"),
            ],
        );

        let records = parse_sheet(&sheet, &config);
        let topics: Vec<&str> = records.iter().map(|r| r.sub_topic.as_str()).collect();
        assert_eq!(topics, vec!["X", "X", "Y"]);
        assert!(records.iter().all(|r| r.main_subject == "Antisemitism"));
    }

    #[test]
    fn test_sub_topic_defaults_before_first_header() {
        let config = PipelineConfig::default();
        let sheet = RawSheet::new("S", vec![data("q1", "https://tiktok.com/@a/1")]);

        let records = parse_sheet(&sheet, &config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sub_topic, "General");
        assert_eq!(records[0].social_network, "TikTok");
    }

    #[test]
    fn test_missing_question_uses_default_and_hashes_it() {
        let config = PipelineConfig::default();
        let sheet = RawSheet::new("S", vec![cells(None, Some("https://instagram.com/p/9"), None)]);

        let records = parse_sheet(&sheet, &config);
        assert_eq!(records[0].question, "Unknown Question");
        assert_eq!(
            records[0].id,
            hashing::record_id("Unknown Question", Some("https://instagram.com/p/9"))
        );
    }

    #[test]
    fn test_status_only_row_has_no_link() {
        let config = PipelineConfig::default();
        let sheet = RawSheet::new("S", vec![cells(Some("Q"), None, Some("todo"))]);

        let records = parse_sheet(&sheet, &config);
        assert_eq!(records[0].link, None);
        assert_eq!(records[0].social_network, "No Link");
        assert_eq!(records[0].id, hashing::record_id("Q", None));
    }

    #[test]
    fn test_invalid_row_is_skipped_and_sheet_continues() {
        let mut config = PipelineConfig::default();
        // A blank default question makes question-less data rows invalid
        config.defaults.unknown_question = String::new();
        let sheet = RawSheet::new(
            "S",
            vec![
                cells(None, Some("https://instagram.com/p/1"), None),
                data("q2", "https://instagram.com/p/2"),
            ],
        );

        let records = parse_sheet(&sheet, &config);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "q2");
    }

    #[test]
    fn test_empty_sheet_yields_nothing() {
        let config = PipelineConfig::default();
        assert!(parse_sheet(&RawSheet::new("Empty", Vec::new()), &config).is_empty());
    }

    #[test]
    fn test_detect_network_first_match_wins() {
        let mut config = PipelineConfig::default();
        config.social_networks = vec![
            NetworkKeyword { keyword: "gram".to_string(), network: "First".to_string() },
            NetworkKeyword { keyword: "instagram".to_string(), network: "Second".to_string() },
        ];

        assert_eq!(detect_network(Some("https://INSTAGRAM.com/p/1"), &config), "First");
        assert_eq!(detect_network(Some("https://example.com"), &config), "Other");
        assert_eq!(detect_network(None, &config), "No Link");
        assert_eq!(detect_network(Some(""), &config), "No Link");
    }

    struct FixedWorkbook(Vec<RawSheet>);

    impl WorkbookReader for FixedWorkbook {
        fn read_sheets(&self, _path: &Path) -> Result<Vec<RawSheet>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_loader_concatenates_sheets_in_order() {
        let config = PipelineConfig::default();
        let reader = FixedWorkbook(vec![
            RawSheet::new("A", vec![data("a1", "https://instagram.com/p/a1")]),
            RawSheet::new("Empty", Vec::new()),
            RawSheet::new("B", vec![header("H"), data("b1", "https://youtu.be/b1")]),
        ]);

        let records = SheetLoader::new(&config, &reader)
            .load(Path::new("unused.xlsx"))
            .unwrap();

        let subjects: Vec<&str> = records.iter().map(|r| r.main_subject.as_str()).collect();
        assert_eq!(subjects, vec!["A", "B"]);
        assert_eq!(records[1].sub_topic, "H");
        assert_eq!(records[1].social_network, "YouTube");
    }
}
