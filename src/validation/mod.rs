//! Row-level checks over shaped tables

mod check;
mod result;
mod rules;

#[cfg(test)]
mod tests;

pub use check::{Check, Columns, Fields, Outcome, Predicate};
pub use result::{CheckResult, CheckSummary, ErrorEntry, FailureDetail, ValidationResult};
pub use rules::{CheckSpec, Rule};

use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::error::{DirlinError, Result};
use crate::table::Table;

/// An ordered set of checks run together against one table
#[derive(Debug, Clone, Default)]
pub struct Validation {
    checks: Vec<Check>,
    aliases: BTreeMap<String, Vec<String>>,
    key_column: Option<String>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from checks, rejecting duplicate names
    pub fn from_checks(checks: impl IntoIterator<Item = Check>) -> Result<Self> {
        let mut validation = Self::new();
        for check in checks {
            validation.add_check(check)?;
        }
        Ok(validation)
    }

    pub fn add_check(&mut self, check: Check) -> Result<()> {
        if self.checks.iter().any(|c| c.name() == check.name()) {
            return Err(DirlinError::InvalidCheck {
                check: check.name().to_string(),
                message: "a check with this name already exists".to_string(),
            });
        }
        self.checks.push(check);
        Ok(())
    }

    /// Read `field` from the first of `candidates` present in the table
    pub fn alias<I, S>(mut self, field: impl Into<String>, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.insert(
            field.into(),
            candidates.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Column whose value identifies rows in the error log
    pub fn key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = Some(column.into());
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Run every check over every row
    ///
    /// All check fields are resolved before any check runs, so a missing
    /// column fails the whole run with `SchemaMismatch`. Failing predicates
    /// only produce error-log entries.
    pub fn run(&self, table: &Table) -> Result<ValidationResult> {
        let resolved = self
            .checks
            .iter()
            .map(|check| {
                check
                    .fields()
                    .iter()
                    .map(|field| self.resolve_field(table, field, check.name()))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let keys = match &self.key_column {
            Some(key) => {
                let Some(values) = table.column(key) else {
                    return Err(DirlinError::schema_mismatch(
                        key.as_str(),
                        "for the validation key column",
                        table.columns(),
                    ));
                };
                Some(values.into_iter().cloned().collect())
            }
            None => None,
        };

        let mut results = Vec::with_capacity(self.checks.len());
        for (check, indices) in self.checks.iter().zip(&resolved) {
            let outcomes = check.evaluate_columns(table, indices);
            for (row, outcome) in outcomes.iter().enumerate() {
                if let Outcome::Error(detail) = outcome {
                    let err = DirlinError::CheckEvaluation {
                        check: check.name().to_string(),
                        detail: detail.clone(),
                    };
                    warn!("{err} (row {row})");
                }
            }
            debug!("Check '{}' evaluated over {} row(s)", check.name(), outcomes.len());
            results.push(CheckResult {
                name: check.name().to_string(),
                outcomes,
            });
        }

        let result = ValidationResult::new(table.row_count(), results, keys);
        info!(
            "Validation ran {} check(s) over {} row(s): {} failure(s)",
            self.checks.len(),
            table.row_count(),
            result.error_count()
        );
        Ok(result)
    }

    fn resolve_field(&self, table: &Table, field: &str, check: &str) -> Result<usize> {
        let candidates = self.aliases.get(field).map(Vec::as_slice).unwrap_or_default();
        candidates
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(field))
            .find_map(|name| table.column_index(name))
            .ok_or_else(|| {
                DirlinError::schema_mismatch(
                    field,
                    format!("for check '{check}'"),
                    table.columns(),
                )
            })
    }
}
