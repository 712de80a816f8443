use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants;
use crate::error::{PipelineError, Result};

/// Immutable pipeline configuration, loaded once and passed by reference.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub defaults: Defaults,
    /// Keyword -> network entries, matched in file order (first match wins)
    pub social_networks: Vec<NetworkKeyword>,
    pub cleaning: CleaningConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Defaults {
    pub sub_topic: String,
    pub unknown_question: String,
    pub no_link_network: String,
    pub other_network: String,
    /// The only network whose posts have transcripts
    pub transcript_network: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NetworkKeyword {
    pub keyword: String,
    pub network: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningConfig {
    pub text_column: String,
    pub min_length: usize,
    pub unique_ratio: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            sub_topic: "General".to_string(),
            unknown_question: "Unknown Question".to_string(),
            no_link_network: "No Link".to_string(),
            other_network: "Other".to_string(),
            transcript_network: "Instagram".to_string(),
        }
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            text_column: constants::COL_TRANSCRIPT.to_string(),
            min_length: 80,
            unique_ratio: 0.3,
        }
    }
}

impl NetworkKeyword {
    fn new(keyword: &str, network: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            network: network.to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            social_networks: vec![
                NetworkKeyword::new("instagram", "Instagram"),
                NetworkKeyword::new("instagr.am", "Instagram"),
                NetworkKeyword::new("insta.gr", "Instagram"),
                NetworkKeyword::new("tiktok", "TikTok"),
                NetworkKeyword::new("youtube", "YouTube"),
                NetworkKeyword::new("youtu.be", "YouTube"),
                NetworkKeyword::new("facebook", "Facebook"),
                NetworkKeyword::new("fb.watch", "Facebook"),
                NetworkKeyword::new("twitter", "Twitter"),
                NetworkKeyword::new("linkedin", "LinkedIn"),
            ],
            cleaning: CleaningConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file. Sections left out of the file keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to the built-in configuration.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.cleaning.unique_ratio) {
            return Err(PipelineError::Config(format!(
                "cleaning.unique_ratio must be within [0, 1], got {}",
                self.cleaning.unique_ratio
            )));
        }
        if self.cleaning.text_column.trim().is_empty() {
            return Err(PipelineError::Config("cleaning.text_column is empty".to_string()));
        }
        for entry in &self.social_networks {
            if entry.keyword.trim().is_empty() || entry.network.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "social network entry has an empty keyword or network: {:?}",
                    entry
                )));
            }
        }
        let d = &self.defaults;
        for (name, value) in [
            ("defaults.sub_topic", &d.sub_topic),
            ("defaults.unknown_question", &d.unknown_question),
            ("defaults.no_link_network", &d.no_link_network),
            ("defaults.other_network", &d.other_network),
            ("defaults.transcript_network", &d.transcript_network),
        ] {
            if value.trim().is_empty() {
                return Err(PipelineError::Config(format!("{} is empty", name)));
            }
        }
        Ok(())
    }
}

/// File-system locations for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub excel_filename: String,
    pub transcripts_filename: String,
    pub output_filename: String,
    pub dropped_filename: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_data_dir(constants::DEFAULT_DATA_DIR)
    }
}

impl Settings {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            excel_filename: constants::DEFAULT_EXCEL_FILENAME.to_string(),
            transcripts_filename: constants::DEFAULT_TRANSCRIPTS_FILENAME.to_string(),
            output_filename: constants::DEFAULT_OUTPUT_FILENAME.to_string(),
            dropped_filename: constants::DEFAULT_DROPPED_FILENAME.to_string(),
        }
    }

    /// Read `DATA_DIR` from the environment (after loading `.env`), defaulting to `data`.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        match std::env::var("DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => Self::with_data_dir(dir.trim()),
            _ => Self::default(),
        }
    }

    pub fn excel_path(&self) -> PathBuf {
        self.data_dir.join(&self.excel_filename)
    }

    pub fn transcripts_path(&self) -> PathBuf {
        self.data_dir.join(&self.transcripts_filename)
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(&self.output_filename)
    }

    pub fn dropped_path(&self) -> PathBuf {
        self.data_dir.join(&self.dropped_filename)
    }
}
