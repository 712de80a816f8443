/// Column and file-name constants shared by the loaders, the cleaner and the writers.

// Default file names, resolved against the data directory
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_EXCEL_FILENAME: &str = "riseapp_hot_topics.xlsx";
pub const DEFAULT_TRANSCRIPTS_FILENAME: &str = "rise_app_data_with_transcripts.csv";
pub const DEFAULT_OUTPUT_FILENAME: &str = "rise_app_clean.csv";
pub const DEFAULT_DROPPED_FILENAME: &str = "dropped_rows.csv";
pub const DEFAULT_CONFIG_PATH: &str = "config/feature_pipeline.toml";

// Transcript table headers. The link header shows up in two capitalizations.
pub const TRANSCRIPT_LINK_COLUMNS: [&str; 2] = ["Link", "link"];
pub const TRANSCRIPT_TEXT_COLUMN: &str = "Transcript";

// Merged-row column names
pub const COL_ID: &str = "id";
pub const COL_MAIN_SUBJECT: &str = "main_subject";
pub const COL_SUB_TOPIC: &str = "sub_topic";
pub const COL_QUESTION: &str = "question";
pub const COL_LINK: &str = "link";
pub const COL_SOCIAL_NETWORK: &str = "social_network";
pub const COL_JOIN_KEY: &str = "join_key";
pub const COL_TRANSCRIPT: &str = "transcript";

/// Columns of the dropped-rows table, in [`crate::domain::MergedRow`] field order
pub const MERGED_COLUMNS: [&str; 8] = [
    COL_ID,
    COL_MAIN_SUBJECT,
    COL_SUB_TOPIC,
    COL_QUESTION,
    COL_LINK,
    COL_SOCIAL_NETWORK,
    COL_JOIN_KEY,
    COL_TRANSCRIPT,
];

/// Ordered column set persisted to the clean table
pub const CLEAN_COLUMNS: [&str; 7] = [
    "id",
    "link_id",
    "main_subject",
    "sub_topic",
    "question",
    "link_cleaned",
    "transcript",
];

/// Stringified null that survives earlier CSV round-trips
pub const NAN_LITERAL: &str = "nan";

/// Placeholder questions written by upstream tooling; both spellings are in the wild
pub const UNKNOWN_QUESTION_SENTINELS: [&str; 2] = ["missing question", "Unknown Question"];

/// Link cell values that mean "no link"
pub const EMPTY_LINK_LITERALS: [&str; 3] = ["nan", "none", ""];

/// UTF-8 byte order mark so spreadsheet tools pick the right encoding
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Cell values read as missing in both the workbook and the transcript table
pub const NA_TOKENS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "",
];
