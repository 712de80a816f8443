use std::path::Path;

use crate::error::Result;

/// The first three cells (A, B, C) of one sheet row, trimmed; blank cells are `None`.
pub type RowCells = [Option<String>; 3];

/// One workbook tab as read from disk, header-less: row 0 is data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSheet {
    pub name: String,
    pub rows: Vec<RowCells>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<RowCells>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Source of workbook sheets, in workbook order.
pub trait WorkbookReader {
    fn read_sheets(&self, path: &Path) -> Result<Vec<RawSheet>>;
}
