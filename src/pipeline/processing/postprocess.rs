use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::warn;

use crate::config::PipelineConfig;
use crate::constants;
use crate::domain::{CleanRow, MergedRow};
use crate::hashing;
use crate::observability::metrics;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("URL pattern is a valid regex"));

/// First `http(s)://` run of non-whitespace in `link`.
pub fn extract_url(link: &str) -> Option<&str> {
    URL_PATTERN.find(link).map(|m| m.as_str())
}

/// Whether `question` is one of the placeholder questions written for rows without one.
pub fn is_placeholder_question(question: &str, config: &PipelineConfig) -> bool {
    constants::UNKNOWN_QUESTION_SENTINELS.contains(&question)
        || question == config.defaults.unknown_question
}

/// Turn quality-checked rows into clean rows: extract URLs, flag duplicate ids,
/// clear placeholder questions and derive link ids.
pub fn postprocess(rows: Vec<MergedRow>, config: &PipelineConfig) -> Vec<CleanRow> {
    let mut id_counts: HashMap<&str, usize> = HashMap::new();
    for row in &rows {
        *id_counts.entry(row.id.as_str()).or_default() += 1;
    }
    let duplicated: Vec<bool> = rows
        .iter()
        .map(|row| id_counts.get(row.id.as_str()).copied().unwrap_or(0) > 1)
        .collect();

    let dup_count = duplicated.iter().filter(|d| **d).count();
    if dup_count > 0 {
        warn!(rows = dup_count, "⚠️ Rows with duplicate IDs");
    }
    metrics::postprocess::duplicate_ids(dup_count);

    rows.into_iter()
        .zip(duplicated)
        .map(|(row, is_duplicate_id)| {
            let link_cleaned = row.link.as_deref().and_then(extract_url).map(str::to_string);
            let link_id = link_cleaned.as_deref().map(hashing::link_id);
            let question = if is_placeholder_question(&row.question, config) {
                None
            } else {
                Some(row.question)
            };

            CleanRow {
                id: row.id,
                link_id,
                main_subject: row.main_subject,
                sub_topic: row.sub_topic,
                question,
                link: row.link,
                link_cleaned,
                social_network: row.social_network,
                transcript: row.transcript.unwrap_or_default(),
                is_duplicate_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(id: &str, question: &str, link: Option<&str>) -> MergedRow {
        MergedRow {
            id: id.to_string(),
            main_subject: "Subject".to_string(),
            sub_topic: "General".to_string(),
            question: question.to_string(),
            link: link.map(str::to_string),
            social_network: "Instagram".to_string(),
            join_key: link.unwrap_or("").trim().to_lowercase(),
            transcript: Some("text".to_string()),
        }
    }

    #[test]
    fn test_extracts_first_url_from_messy_cell() {
        assert_eq!(
            extract_url("Check this out: https://insta.gr/abc123 thanks"),
            Some("https://insta.gr/abc123")
        );
        assert_eq!(
            extract_url("http://a.com/1 and https://b.com/2"),
            Some("http://a.com/1")
        );
        assert_eq!(extract_url("instagram.com/p/1"), None);
    }

    #[test]
    fn test_link_id_absent_without_url() {
        let config = PipelineConfig::default();
        let rows = postprocess(
            vec![
                merged("1", "Q1", Some("instagram.com/p/no-scheme")),
                merged("2", "Q2", Some("see https://instagram.com/p/2")),
            ],
            &config,
        );

        assert_eq!(rows[0].link_cleaned, None);
        assert_eq!(rows[0].link_id, None);
        assert_eq!(rows[1].link_cleaned.as_deref(), Some("https://instagram.com/p/2"));
        assert_eq!(rows[1].link_id, Some(hashing::link_id("https://instagram.com/p/2")));
    }

    #[test]
    fn test_duplicate_ids_flag_every_occurrence() {
        let config = PipelineConfig::default();
        let rows = postprocess(
            vec![
                merged("dup", "Q", Some("https://instagram.com/p/1")),
                merged("solo", "Q", Some("https://instagram.com/p/2")),
                merged("dup", "Q", Some("https://instagram.com/p/1")),
            ],
            &config,
        );

        let flags: Vec<bool> = rows.iter().map(|r| r.is_duplicate_id).collect();
        assert_eq!(flags, vec![true, false, true]);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_placeholder_questions_are_cleared() {
        let config = PipelineConfig::default();
        let rows = postprocess(
            vec![
                merged("1", "missing question", None),
                merged("2", "Unknown Question", None),
                merged("3", "Is this real?", None),
            ],
            &config,
        );

        let questions: Vec<Option<&str>> = rows.iter().map(|r| r.question.as_deref()).collect();
        assert_eq!(questions, vec![None, None, Some("Is this real?")]);
    }
}
