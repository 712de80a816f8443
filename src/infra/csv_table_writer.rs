use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use crate::constants::UTF8_BOM;
use crate::error::Result;

/// Writes a CSV table prefixed with a UTF-8 byte order mark, replacing any existing file.
///
/// The header row comes from `columns` so empty tables still carry their schema;
/// `rows` must serialize to fields in the same order.
pub fn write_table<S, I>(path: &Path, columns: &[&str], rows: I) -> Result<usize>
where
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(UTF8_BOM)?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(columns)?;

    let mut written = 0;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = written, "💾 Wrote table");
    Ok(written)
}
