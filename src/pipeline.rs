//! Folder resolution, report shaping and validation composed

use tracing::info;

use crate::error::{DirlinError, Result};
use crate::folder::Folder;
use crate::report::Report;
use crate::table::Table;
use crate::validation::{Validation, ValidationResult};

/// Locate the latest file, shape it with a report, validate it
///
/// Nothing is cached: each call re-resolves the file on disk.
#[derive(Debug, Clone)]
pub struct Pipeline {
    folder: Folder,
    report: Option<Report>,
}

impl Pipeline {
    pub fn new(folder: Folder) -> Self {
        Self {
            folder,
            report: None,
        }
    }

    /// Report used when none is passed to [`Pipeline::get_worksheet`]
    pub fn with_report(mut self, report: Report) -> Self {
        self.report = Some(report);
        self
    }

    pub fn folder(&self) -> &Folder {
        &self.folder
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Open the most recent file matching `pattern` and shape it
    ///
    /// `pattern` defaults to the report's own pattern; `report` defaults to the
    /// pipeline's report. Without any report the table is returned unshaped.
    pub fn get_worksheet(&self, pattern: Option<&str>, report: Option<&Report>) -> Result<Table> {
        let report = report.or(self.report.as_ref());
        let pattern = match (pattern, report) {
            (Some(pattern), _) => pattern,
            (None, Some(report)) => report.pattern.as_str(),
            (None, None) => {
                return Err(DirlinError::Config(
                    "a file pattern or a report is required to find a worksheet".to_string(),
                ));
            }
        };

        let table = self.folder.open_recent(pattern)?;
        match report {
            Some(report) => report.apply(table),
            None => Ok(table),
        }
    }

    /// Resolve, shape, then validate the pipeline's report
    pub fn run(&self, validation: &Validation) -> Result<(Table, ValidationResult)> {
        let table = self.get_worksheet(None, None)?;
        let result = validation.run(&table)?;
        info!(
            "Pipeline on {}: {} row(s), {} failure(s)",
            self.folder.path(),
            table.row_count(),
            result.error_count()
        );
        Ok((table, result))
    }
}
