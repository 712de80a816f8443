use calamine::{open_workbook_auto, Data, Range, Reader};
use std::path::Path;
use tracing::debug;

use crate::app::ports::{RawSheet, RowCells, WorkbookReader};
use crate::domain::is_na_token;
use crate::error::Result;

/// Reads `.xlsx`/`.xls`/`.ods` workbooks through calamine.
#[derive(Debug, Default, Clone, Copy)]
pub struct CalamineWorkbookReader;

impl CalamineWorkbookReader {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookReader for CalamineWorkbookReader {
    fn read_sheets(&self, path: &Path) -> Result<Vec<RawSheet>> {
        let mut workbook = open_workbook_auto(path)?;
        let mut sheets = Vec::new();

        for name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&name)?;
            let rows = leading_cells(&range);
            debug!(sheet = %name, rows = rows.len(), "Read worksheet");
            sheets.push(RawSheet::new(name, rows));
        }

        Ok(sheets)
    }
}

/// Columns A..C of every row in the used range. calamine ranges start at the first
/// non-empty cell, so cells are addressed absolutely rather than by offset.
fn leading_cells(range: &Range<Data>) -> Vec<RowCells> {
    let (Some(start), Some(end)) = (range.start(), range.end()) else {
        return Vec::new();
    };

    (start.0..=end.0)
        .map(|row| {
            [0u32, 1, 2].map(|col| range.get_value((row, col)).and_then(cell_text))
        })
        .collect()
}

/// Trimmed text of a cell; empty cells, error cells and NA spellings read as missing.
pub fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    if is_na_token(&text) {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_text_trims_and_drops_blanks() {
        assert_eq!(cell_text(&Data::String("  Hello ".to_string())), Some("Hello".to_string()));
        assert_eq!(cell_text(&Data::String("   ".to_string())), None);
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::Int(3)), Some("3".to_string()));
    }

    #[test]
    fn test_na_spellings_read_as_missing() {
        for token in ["N/A", " NULL ", "#N/A", "NaN", "nan"] {
            assert_eq!(cell_text(&Data::String(token.to_string())), None, "{token}");
        }
        assert_eq!(cell_text(&Data::String("Nation".to_string())), Some("Nation".to_string()));
    }

    #[test]
    fn test_leading_cells_addresses_absolute_columns() {
        // Used range starts at B2: column A is empty throughout
        let mut range: Range<Data> = Range::new((1, 1), (2, 3));
        range.set_value((1, 1), Data::String("https://instagram.com/p/1".to_string()));
        range.set_value((2, 3), Data::String("ignored column D".to_string()));

        let rows = leading_cells(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], [None, Some("https://instagram.com/p/1".to_string()), None]);
        assert_eq!(rows[1], [None, None, None]);
    }

    #[test]
    fn test_empty_range_has_no_rows() {
        let range: Range<Data> = Range::empty();
        assert!(leading_cells(&range).is_empty());
    }
}
