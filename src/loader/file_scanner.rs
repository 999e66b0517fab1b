//! File scanning utilities for discovering files that follow a naming convention

use chrono::{DateTime, Days, Local};
use globwalk::{FileType, GlobWalkerBuilder};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use crate::error::{DirlinError, Result};

/// Options controlling which files a pattern matches
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Append a trailing `*` to the pattern (`ohlcv` matches `ohlcv_2025.xlsx`)
    pub with_wildcard: bool,
    /// Search sub-folders as well
    pub recurse: bool,
    /// Only keep files modified within the last N days
    pub days: Option<u64>,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            with_wildcard: true,
            recurse: false,
            days: None,
        }
    }
}

/// A file that satisfied a pattern, with its modification time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMatch {
    pub path: PathBuf,
    pub modified: SystemTime,
    pub pattern: String,
}

impl FileMatch {
    pub fn modified_at(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.modified)
    }

    /// File name without its extension, used as the source label when combining
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

pub struct FileScanner;

impl FileScanner {
    /// Office lock files (`~$report.xlsx`) and hidden files never count as matches
    pub fn is_candidate(path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| !name.starts_with('~') && !name.starts_with('.'))
            .unwrap_or(false)
    }

    /// Turn a user pattern into the glob actually evaluated
    pub fn glob_pattern(pattern: &str, options: &MatchOptions) -> Result<String> {
        if options.with_wildcard {
            Ok(format!("{pattern}*"))
        } else if pattern.is_empty() {
            Err(DirlinError::EmptyPattern)
        } else {
            Ok(pattern.to_string())
        }
    }

    /// Find every file under `dir` matching `pattern`, most recently modified first
    ///
    /// Files with equal modification times are ordered by path, greatest first,
    /// so the head of the list is deterministic.
    pub fn scan(dir: &Path, pattern: &str, options: &MatchOptions) -> Result<Vec<FileMatch>> {
        let glob = Self::glob_pattern(pattern, options)?;

        let mut builder = GlobWalkerBuilder::from_patterns(dir, &[glob.as_str()])
            .follow_links(true)
            .case_insensitive(cfg!(windows))
            .file_type(FileType::FILE);
        if !options.recurse {
            builder = builder.max_depth(1);
        }
        let walker = builder.build()?;

        let cutoff = options
            .days
            .and_then(|days| Local::now().date_naive().checked_sub_days(Days::new(days)));

        let mut matches = Vec::new();
        for entry in walker.into_iter().filter_map(std::result::Result::ok) {
            let path = entry.path();
            if !Self::is_candidate(path) {
                continue;
            }

            let modified = std::fs::metadata(path)?.modified()?;
            if let Some(cutoff) = cutoff
                && DateTime::<Local>::from(modified).date_naive() < cutoff
            {
                debug!("Skipping {} (modified before {cutoff})", path.display());
                continue;
            }

            matches.push(FileMatch {
                path: path.to_path_buf(),
                modified,
                pattern: glob.clone(),
            });
        }

        Self::sort_most_recent_first(&mut matches);
        debug!("Pattern '{glob}' matched {} file(s) in {}", matches.len(), dir.display());
        Ok(matches)
    }

    pub fn sort_most_recent_first(matches: &mut [FileMatch]) {
        matches.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.path.cmp(&a.path))
        });
    }

    /// List every file with the given suffix (`.csv`, `xlsx`, ...)
    pub fn index_files(dir: &Path, extension: &str, recurse: bool) -> Result<Vec<PathBuf>> {
        let extension = extension.trim_start_matches('.');
        let glob = format!("*.{extension}");

        let mut builder = GlobWalkerBuilder::from_patterns(dir, &[glob.as_str()])
            .follow_links(true)
            .case_insensitive(cfg!(windows))
            .file_type(FileType::FILE);
        if !recurse {
            builder = builder.max_depth(1);
        }

        let mut files: Vec<PathBuf> = builder
            .build()?
            .into_iter()
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path().to_path_buf())
            .filter(|path| Self::is_candidate(path))
            .collect();
        files.sort();
        Ok(files)
    }
}
