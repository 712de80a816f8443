use serde::{Deserialize, Serialize};

use crate::config::Defaults;
use crate::constants;
use crate::error::{PipelineError, Result};

/// One topic/question/link entry parsed from a workbook sheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRecord {
    /// MD5 hex of question + link, see [`crate::hashing::record_id`]
    pub id: String,
    /// Sheet the record came from
    pub main_subject: String,
    /// Section header in effect when the row was read
    pub sub_topic: String,
    pub question: String,
    pub link: Option<String>,
    pub social_network: String,
}

impl SourceRecord {
    /// Build a validated record. The link is trimmed, and the usual spellings of
    /// "no value" (`nan`, `none`, empty) are stored as absent.
    pub fn new(
        id: String,
        main_subject: String,
        sub_topic: String,
        question: String,
        link: Option<String>,
        social_network: String,
    ) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(PipelineError::InvalidRecord("id is empty".to_string()));
        }
        if main_subject.trim().is_empty() {
            return Err(PipelineError::InvalidRecord("main_subject is empty".to_string()));
        }
        if question.trim().is_empty() {
            return Err(PipelineError::InvalidRecord("question is empty".to_string()));
        }
        if sub_topic.trim().is_empty() {
            return Err(PipelineError::InvalidRecord("sub_topic is empty".to_string()));
        }

        Ok(Self {
            id,
            main_subject,
            sub_topic,
            question,
            link: normalize_link(link),
            social_network,
        })
    }

    /// Build a record outside any sheet section: `sub_topic` and `social_network`
    /// take the built-in defaults (`General`, `Other`).
    pub fn with_defaults(
        id: String,
        main_subject: String,
        question: String,
        link: Option<String>,
    ) -> Result<Self> {
        let defaults = Defaults::default();
        Self::new(
            id,
            main_subject,
            defaults.sub_topic,
            question,
            link,
            defaults.other_network,
        )
    }
}

fn normalize_link(link: Option<String>) -> Option<String> {
    let link = link?;
    let trimmed = link.trim();
    if constants::EMPTY_LINK_LITERALS.contains(&trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether a raw cell value is one of the spellings of "no value".
pub fn is_na_token(value: &str) -> bool {
    constants::NA_TOKENS.contains(&value)
}

/// Normalized join key shared by workbook links and transcript links.
pub fn join_key(link: &str) -> String {
    link.trim().to_lowercase()
}

/// A source record widened with the transcript matched on its join key.
///
/// Field order is the column order of the dropped-rows table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergedRow {
    pub id: String,
    pub main_subject: String,
    pub sub_topic: String,
    pub question: String,
    pub link: Option<String>,
    pub social_network: String,
    pub join_key: String,
    pub transcript: Option<String>,
}

impl MergedRow {
    pub fn new(record: SourceRecord, transcript: Option<String>) -> Self {
        let join_key = join_key(record.link.as_deref().unwrap_or(""));
        Self {
            id: record.id,
            main_subject: record.main_subject,
            sub_topic: record.sub_topic,
            question: record.question,
            link: record.link,
            social_network: record.social_network,
            join_key,
            transcript,
        }
    }
}

/// Row access by column name, used by the quality gate to find its text column.
pub trait TextColumns {
    /// Whether rows of this type carry `column` at all.
    fn has_column(column: &str) -> bool;

    /// Value of `column` for this row; `None` for a missing value or unknown column.
    fn text(&self, column: &str) -> Option<&str>;
}

impl TextColumns for MergedRow {
    fn has_column(column: &str) -> bool {
        matches!(
            column,
            constants::COL_ID
                | constants::COL_MAIN_SUBJECT
                | constants::COL_SUB_TOPIC
                | constants::COL_QUESTION
                | constants::COL_LINK
                | constants::COL_SOCIAL_NETWORK
                | constants::COL_JOIN_KEY
                | constants::COL_TRANSCRIPT
        )
    }

    fn text(&self, column: &str) -> Option<&str> {
        match column {
            constants::COL_ID => Some(&self.id),
            constants::COL_MAIN_SUBJECT => Some(&self.main_subject),
            constants::COL_SUB_TOPIC => Some(&self.sub_topic),
            constants::COL_QUESTION => Some(&self.question),
            constants::COL_LINK => self.link.as_deref(),
            constants::COL_SOCIAL_NETWORK => Some(&self.social_network),
            constants::COL_JOIN_KEY => Some(&self.join_key),
            constants::COL_TRANSCRIPT => self.transcript.as_deref(),
            _ => None,
        }
    }
}

/// A merged row that passed every quality rule, plus postprocessing columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRow {
    pub id: String,
    /// Absent when no URL could be extracted from the link
    pub link_id: Option<u64>,
    pub main_subject: String,
    pub sub_topic: String,
    /// Placeholder questions are cleared to `None`
    pub question: Option<String>,
    pub link: Option<String>,
    pub link_cleaned: Option<String>,
    pub social_network: String,
    pub transcript: String,
    /// Advisory: another surviving row shares this id
    pub is_duplicate_id: bool,
}

/// Borrowed projection of a [`CleanRow`] onto the persisted clean-table columns.
#[derive(Debug, Serialize)]
pub struct CleanTableRow<'a> {
    pub id: &'a str,
    pub link_id: Option<u64>,
    pub main_subject: &'a str,
    pub sub_topic: &'a str,
    pub question: Option<&'a str>,
    pub link_cleaned: Option<&'a str>,
    pub transcript: &'a str,
}

impl<'a> From<&'a CleanRow> for CleanTableRow<'a> {
    fn from(row: &'a CleanRow) -> Self {
        Self {
            id: &row.id,
            link_id: row.link_id,
            main_subject: &row.main_subject,
            sub_topic: &row.sub_topic,
            question: row.question.as_deref(),
            link_cleaned: row.link_cleaned.as_deref(),
            transcript: &row.transcript,
        }
    }
}
