// Pipeline ingestion: workbook parsing and the companion transcript table

pub mod sheet_loader;
pub mod transcripts;

pub use sheet_loader::{detect_network, parse_sheet, RowKind, SheetLoader};
pub use transcripts::{read_transcripts, TranscriptIndex, TranscriptRow};
