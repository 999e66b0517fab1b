//! Error types shared across the crate

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Toggle this to add spaces for iTerm2 clickability
const ADD_SPACES_FOR_ITERM: bool = true;

/// Format a file path for error display
///
/// When ADD_SPACES_FOR_ITERM is true, adds a space before the path
/// to make it clickable in iTerm2.
pub fn format_error_path(path: &Path) -> String {
    let path_str = path.display().to_string();

    if ADD_SPACES_FOR_ITERM {
        format!(" {path_str}")
    } else {
        path_str
    }
}

#[derive(Error, Debug, Diagnostic)]
pub enum DirlinError {
    /// No file in the folder satisfied the pattern (and the lookback window, if any)
    #[error("No files matching '{pattern}' found in{}", format_error_path(.folder))]
    #[diagnostic(
        code(dirlin::no_match),
        help("Check the filename pattern. A trailing '*' is added unless exact matching is requested.")
    )]
    NoMatchFound { pattern: String, folder: PathBuf },

    #[error("Expected a path to a folder / directory. Got{}", format_error_path(.0))]
    #[diagnostic(code(dirlin::not_a_directory))]
    NotADirectory(PathBuf),

    #[error("Pattern cannot be empty when wildcard matching is disabled")]
    #[diagnostic(code(dirlin::empty_pattern))]
    EmptyPattern,

    /// An expected column is absent from the table
    #[error("Column '{column}' not found {context}. Available columns: {}", .available.join(", "))]
    #[diagnostic(
        code(dirlin::schema_mismatch),
        help("Make sure the report's rename mapping covers every column used downstream.")
    )]
    SchemaMismatch {
        column: String,
        context: String,
        available: Vec<String>,
    },

    /// A single cell could not be coerced. Recorded by reports, never returned from `apply`.
    #[error("Could not parse '{value}' in column '{column}' (row {row}) as {target}")]
    #[diagnostic(code(dirlin::coercion_failure))]
    CoercionFailure {
        row: usize,
        column: String,
        value: String,
        target: String,
    },

    /// A check predicate failed to evaluate. Recorded in the error log, never returned from `run`.
    #[error("Check '{check}' failed to evaluate: {detail}")]
    #[diagnostic(code(dirlin::check_evaluation))]
    CheckEvaluation { check: String, detail: String },

    #[error("File suffix '{extension}' is an unsupported format. Path:{}", format_error_path(.path))]
    #[diagnostic(
        code(dirlin::unsupported_format),
        help("Supported formats: .csv, .txt, .xlsx, .xlsm, .xls, .xlsb, .ods, .json")
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Sheet '{sheet}' not found in{}", format_error_path(.path))]
    #[diagnostic(code(dirlin::missing_sheet))]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("Invalid table data in{}: {message}", format_error_path(.path))]
    #[diagnostic(code(dirlin::invalid_data))]
    InvalidData { path: PathBuf, message: String },

    #[error("Invalid check '{check}': {message}")]
    #[diagnostic(code(dirlin::invalid_check))]
    InvalidCheck { check: String, message: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(dirlin::config))]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globwalk::GlobError),
}

impl DirlinError {
    pub fn schema_mismatch(
        column: impl Into<String>,
        context: impl Into<String>,
        available: &[String],
    ) -> Self {
        Self::SchemaMismatch {
            column: column.into(),
            context: context.into(),
            available: available.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DirlinError>;
