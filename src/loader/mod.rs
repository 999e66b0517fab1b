//! Reading files from disk into [`Table`]s
//!
//! The reader is picked from the file extension. Headers are normalized the
//! same way for every format: surrounding whitespace is trimmed, blank headers
//! become `column_<n>`, and repeated names get a `.1`, `.2`, ... suffix.

mod delimited;
mod file_scanner;
mod json;
mod workbook;

pub use file_scanner::{FileMatch, FileScanner, MatchOptions};

use std::path::Path;
use tracing::debug;

use crate::error::{DirlinError, Result};
use crate::table::Table;

/// Options applied when reading a single file
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Worksheet to read from a workbook; the first sheet when unset
    pub sheet: Option<String>,
}

const DELIMITED_TYPES: &[&str] = &["csv", "txt"];
const WORKBOOK_TYPES: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Load a file into a table, dispatching on its extension
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    debug!("Loading {} as .{extension}", path.display());

    let table = if DELIMITED_TYPES.contains(&extension.as_str()) {
        delimited::read_delimited(path)?
    } else if WORKBOOK_TYPES.contains(&extension.as_str()) {
        workbook::read_workbook(path, options.sheet.as_deref())?
    } else if extension == "json" {
        json::read_json(path)?
    } else {
        return Err(DirlinError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        });
    };

    debug!(
        "Loaded {} row(s) x {} column(s) from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Whether `load_table` knows how to read this file
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            DELIMITED_TYPES.contains(&ext.as_str())
                || WORKBOOK_TYPES.contains(&ext.as_str())
                || ext == "json"
        })
        .unwrap_or(false)
}

pub(crate) fn normalize_headers<I, S>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for (idx, header) in headers.into_iter().enumerate() {
        let trimmed = header.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("column_{idx}")
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.push(name);
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_headers() {
        let headers = normalize_headers([" Date ", "", "Amount", "Amount"]);
        assert_eq!(headers, vec!["Date", "column_1", "Amount", "Amount.1"]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.md");
        fs::write(&path, "# hi").unwrap();

        let result = load_table(&path, &LoadOptions::default());
        assert!(matches!(
            result,
            Err(DirlinError::UnsupportedFormat { ref extension, .. }) if extension == "md"
        ));
        assert!(!is_supported(&path));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("PRICES.CSV");
        fs::write(&path, "a,b\n1,2\n").unwrap();

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(is_supported(&path));
    }
}
