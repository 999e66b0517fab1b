use std::path::Path;

use super::normalize_headers;
use crate::error::Result;
use crate::table::{Table, Value};

/// Read a comma-separated file with a header row
///
/// Cells are decoded lossily so files saved in a legacy encoding still load;
/// rows of uneven length are padded or truncated to the header width.
pub(super) fn read_delimited(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let headers = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).to_string())
        .collect::<Vec<_>>();
    let mut table = Table::new(normalize_headers(headers));

    for record in reader.byte_records() {
        let record = record?;
        let row = record
            .iter()
            .map(|cell| Value::infer(&String::from_utf8_lossy(cell)))
            .collect();
        table.push_row(row);
    }

    Ok(table)
}
