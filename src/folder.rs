//! Locating and loading files that follow a naming convention inside a folder

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DirlinError, Result};
use crate::loader::{self, FileMatch, FileScanner, LoadOptions, MatchOptions};
use crate::path::FolderPath;
use crate::table::{Table, Value};

/// Column added by [`Folder::find_and_combine`] naming the file each row came from
pub const SOURCE_COLUMN: &str = "From";

/// A base directory plus file-matching operations
#[derive(Debug, Clone)]
pub struct Folder {
    path: FolderPath,
    matching: MatchOptions,
    loading: LoadOptions,
}

impl Folder {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::from_path(FolderPath::new(path)?))
    }

    pub fn from_path(path: FolderPath) -> Self {
        Self {
            path,
            matching: MatchOptions::default(),
            loading: LoadOptions::default(),
        }
    }

    /// Match patterns literally instead of appending a trailing `*`
    pub fn exact(mut self) -> Self {
        self.matching.with_wildcard = false;
        self
    }

    pub fn recurse(mut self, recurse: bool) -> Self {
        self.matching.recurse = recurse;
        self
    }

    /// Only consider files modified within the last `days` days
    pub fn within_days(mut self, days: u64) -> Self {
        self.matching.days = Some(days);
        self
    }

    /// Read this worksheet from workbooks instead of the first one
    pub fn sheet(mut self, sheet: impl Into<String>) -> Self {
        self.loading.sheet = Some(sheet.into());
        self
    }

    pub fn with_match_options(mut self, options: MatchOptions) -> Self {
        self.matching = options;
        self
    }

    pub fn path(&self) -> &FolderPath {
        &self.path
    }

    pub fn match_options(&self) -> &MatchOptions {
        &self.matching
    }

    /// All files matching `pattern`, most recently modified first
    pub fn list_matches(&self, pattern: &str) -> Result<Vec<FileMatch>> {
        FileScanner::scan(self.path.as_path(), pattern, &self.matching)
    }

    /// The most recently modified file matching `pattern`
    ///
    /// Ties on modification time go to the lexicographically greatest path.
    pub fn find_recent(&self, pattern: &str) -> Result<FileMatch> {
        self.list_matches(pattern)?
            .into_iter()
            .next()
            .ok_or_else(|| self.no_match(pattern))
    }

    /// Load a single file; relative names resolve against the folder
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Table> {
        let resolved = self.path.resolve(path);
        loader::load_table(&resolved, &self.loading)
    }

    /// Load the most recently modified file matching `pattern`
    pub fn open_recent(&self, pattern: &str) -> Result<Table> {
        let found = self.find_recent(pattern)?;
        info!("Opening {}", found.path.display());
        self.open(&found.path)
    }

    /// Load every file matching `pattern` into one table
    ///
    /// See [`Folder::find_and_combine_limited`].
    pub fn find_and_combine(&self, pattern: &str) -> Result<Table> {
        self.find_and_combine_limited(pattern, None)
    }

    /// Load up to `limit` of the most recent files matching `pattern` into one table
    ///
    /// Files are stacked most recent first. Column sets are unioned and missing
    /// cells are null. A [`SOURCE_COLUMN`] holding each row's file stem is
    /// placed first.
    pub fn find_and_combine_limited(&self, pattern: &str, limit: Option<usize>) -> Result<Table> {
        self.combine_matches(pattern, limit).map(|(_, table)| table)
    }

    /// Like [`Folder::find_and_combine_limited`], also returning the files that went in
    pub fn combine_matches(
        &self,
        pattern: &str,
        limit: Option<usize>,
    ) -> Result<(Vec<FileMatch>, Table)> {
        let mut matches = self.list_matches(pattern)?;
        if matches.is_empty() {
            return Err(self.no_match(pattern));
        }
        if let Some(limit) = limit {
            matches.truncate(limit);
        }

        let mut tables = Vec::with_capacity(matches.len());
        for found in &matches {
            debug!("Adding {}", found.path.display());
            let mut table = self.open(&found.path)?;
            let source = Value::Text(found.stem());
            let sources = vec![source; table.row_count()];
            if table.has_column(SOURCE_COLUMN) {
                table.set_column(SOURCE_COLUMN, sources);
            } else {
                table.insert_column(0, SOURCE_COLUMN, sources);
            }
            tables.push(table);
        }

        let combined = Table::concat(tables);
        info!(
            "Combined {} file(s) into {} row(s)",
            matches.len(),
            combined.row_count()
        );
        Ok((matches, combined))
    }

    /// Build a lookup from two columns of a file
    ///
    /// Keys are the display form of the key cells; later rows win on duplicates.
    pub fn as_map(
        &self,
        path: impl AsRef<Path>,
        key_column: &str,
        value_column: &str,
    ) -> Result<BTreeMap<String, Value>> {
        let table = self.open(path)?;
        for column in [key_column, value_column] {
            if !table.has_column(column) {
                return Err(DirlinError::schema_mismatch(
                    column,
                    "in lookup file",
                    table.columns(),
                ));
            }
        }

        let mut mapping = BTreeMap::new();
        for row in table.iter_rows() {
            if let (Some(key), Some(value)) = (row.get(key_column), row.get(value_column)) {
                mapping.insert(key.to_string(), value.clone());
            }
        }
        Ok(mapping)
    }

    /// Every file with the given suffix (`.csv`, `.xlsx`, ...), sorted by path
    pub fn index_files(&self, extension: &str, recurse: bool) -> Result<Vec<PathBuf>> {
        FileScanner::index_files(self.path.as_path(), extension, recurse)
    }

    fn no_match(&self, pattern: &str) -> DirlinError {
        let shown = FileScanner::glob_pattern(pattern, &self.matching)
            .unwrap_or_else(|_| pattern.to_string());
        DirlinError::NoMatchFound {
            pattern: shown,
            folder: self.path.as_path().to_path_buf(),
        }
    }
}
