use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::constants;
use crate::domain::{is_na_token, join_key};
use crate::error::{PipelineError, Result};

/// One row of the companion transcript table, keyed for the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    pub join_key: String,
    /// Raw transcript cell; an empty or NA cell is `None`
    pub transcript: Option<String>,
}

/// Read the transcript CSV. The link column may be `Link` or `link`; the text column is `Transcript`.
pub fn read_transcripts(path: &Path) -> Result<Vec<TranscriptRow>> {
    let mut reader = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let link_idx = constants::TRANSCRIPT_LINK_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .ok_or_else(|| {
            PipelineError::MissingColumn(format!(
                "transcript table has no {:?} column",
                constants::TRANSCRIPT_LINK_COLUMNS
            ))
        })?;
    let text_idx = headers
        .iter()
        .position(|h| h == constants::TRANSCRIPT_TEXT_COLUMN)
        .ok_or_else(|| {
            PipelineError::MissingColumn(format!(
                "transcript table has no '{}' column",
                constants::TRANSCRIPT_TEXT_COLUMN
            ))
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let link = record.get(link_idx).filter(|l| !is_na_token(l)).unwrap_or("");
        let transcript = record
            .get(text_idx)
            .filter(|t| !is_na_token(t))
            .map(str::to_string);
        rows.push(TranscriptRow {
            join_key: join_key(link),
            transcript,
        });
    }

    debug!(rows = rows.len(), path = %path.display(), "Read transcript table");
    Ok(rows)
}

/// Join-key -> transcript lookup holding the first occurrence of each key.
#[derive(Debug, Default, Clone)]
pub struct TranscriptIndex {
    by_key: HashMap<String, Option<String>>,
}

impl TranscriptIndex {
    pub fn build(rows: Vec<TranscriptRow>) -> Self {
        let total = rows.len();
        let mut by_key = HashMap::with_capacity(total);
        for row in rows {
            by_key.entry(row.join_key).or_insert(row.transcript);
        }
        info!(
            unique = by_key.len(),
            duplicates = total - by_key.len(),
            "Deduplicated transcripts by join key"
        );
        Self { by_key }
    }

    /// Transcript for `join_key`, `None` when unmatched or when the kept row had no text.
    pub fn lookup(&self, join_key: &str) -> Option<&str> {
        self.by_key.get(join_key).and_then(|t| t.as_deref())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
