use anyhow::{Context, anyhow};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{DirlinError, Result};
use crate::table::{Table, Value};

type ScalarFn = dyn Fn(&Fields<'_>) -> anyhow::Result<bool> + Send + Sync;
type VectorFn = dyn Fn(&Columns<'_>) -> anyhow::Result<Vec<anyhow::Result<bool>>> + Send + Sync;

/// How a check's predicate sees the table
#[derive(Clone)]
pub enum Predicate {
    /// Called once per row with that row's fields
    Scalar(Arc<ScalarFn>),
    /// Called once with whole columns, returns one outcome per row
    ///
    /// A row-level `Err` fails only that row; an outer `Err` fails them all.
    Vector(Arc<VectorFn>),
}

/// Result of one check on one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Fail,
    /// The predicate returned an error or panicked; counts as a failure
    Error(String),
}

impl Outcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }

    fn from_bool(passed: bool) -> Self {
        if passed { Outcome::Pass } else { Outcome::Fail }
    }

    fn from_result(result: anyhow::Result<bool>) -> Self {
        match result {
            Ok(passed) => Outcome::from_bool(passed),
            Err(err) => Outcome::Error(format!("{err:#}")),
        }
    }
}

/// The named fields of one row, as handed to a scalar predicate
pub struct Fields<'a> {
    names: &'a [String],
    values: Vec<&'a Value>,
}

impl<'a> Fields<'a> {
    pub fn get(&self, name: &str) -> anyhow::Result<&'a Value> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
            .ok_or_else(|| anyhow!("field '{name}' is not declared by this check"))
    }

    /// Field by position in the check's field list
    pub fn value(&self, idx: usize) -> Option<&'a Value> {
        self.values.get(idx).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    pub fn number(&self, name: &str) -> anyhow::Result<f64> {
        let value = self.get(name)?;
        value
            .as_f64()
            .with_context(|| format!("field '{name}' is not numeric ({})", value.kind()))
    }

    pub fn decimal(&self, name: &str) -> anyhow::Result<Decimal> {
        let value = self.get(name)?;
        value
            .as_decimal()
            .with_context(|| format!("field '{name}' is not numeric ({})", value.kind()))
    }

    pub fn text(&self, name: &str) -> anyhow::Result<&'a str> {
        let value = self.get(name)?;
        value
            .as_str()
            .with_context(|| format!("field '{name}' is not text ({})", value.kind()))
    }
}

/// Whole columns for the declared fields, as handed to a vector predicate
pub struct Columns<'a> {
    names: &'a [String],
    columns: Vec<Vec<&'a Value>>,
    rows: usize,
}

impl<'a> Columns<'a> {
    pub fn get(&self, name: &str) -> anyhow::Result<&[&'a Value]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| anyhow!("field '{name}' is not declared by this check"))
    }

    /// Numeric view of a column; a non-numeric cell is an error for its row only
    pub fn numbers(&self, name: &str) -> anyhow::Result<Vec<anyhow::Result<f64>>> {
        Ok(self
            .get(name)?
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .with_context(|| format!("field '{name}' is not numeric ({})", value.kind()))
            })
            .collect())
    }

    /// Number of rows in every column
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// A named predicate over one or more fields
#[derive(Clone)]
pub struct Check {
    name: String,
    fields: Vec<String>,
    predicate: Predicate,
}

impl Check {
    /// A check evaluated one row at a time
    pub fn scalar<I, S, F>(name: impl Into<String>, fields: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Fields<'_>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            predicate: Predicate::Scalar(Arc::new(predicate)),
        }
    }

    /// A check evaluated over whole columns at once
    pub fn vector<I, S, F>(name: impl Into<String>, fields: I, predicate: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Columns<'_>) -> anyhow::Result<Vec<anyhow::Result<bool>>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            predicate: Predicate::Vector(Arc::new(predicate)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn is_vector(&self) -> bool {
        matches!(self.predicate, Predicate::Vector(_))
    }

    /// Evaluate against a table whose columns carry the field names directly
    pub fn evaluate(&self, table: &Table) -> Result<Vec<Outcome>> {
        let indices = self
            .fields
            .iter()
            .map(|field| {
                table.column_index(field).ok_or_else(|| {
                    DirlinError::schema_mismatch(
                        field.as_str(),
                        format!("for check '{}'", self.name),
                        table.columns(),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self.evaluate_columns(table, &indices))
    }

    /// Evaluate with each field already resolved to a column index
    pub(crate) fn evaluate_columns(&self, table: &Table, indices: &[usize]) -> Vec<Outcome> {
        let rows = table.rows();
        match &self.predicate {
            Predicate::Scalar(predicate) => rows
                .iter()
                .map(|row| {
                    let fields = Fields {
                        names: &self.fields,
                        values: indices.iter().map(|&idx| &row[idx]).collect(),
                    };
                    match guarded(|| predicate(&fields)) {
                        Ok(passed) => Outcome::from_bool(passed),
                        Err(detail) => Outcome::Error(detail),
                    }
                })
                .collect(),
            Predicate::Vector(predicate) => {
                let columns = Columns {
                    names: &self.fields,
                    columns: indices
                        .iter()
                        .map(|&idx| rows.iter().map(|row| &row[idx]).collect())
                        .collect(),
                    rows: rows.len(),
                };
                let detail = match guarded(|| predicate(&columns)) {
                    Ok(results) if results.len() == rows.len() => {
                        return results.into_iter().map(Outcome::from_result).collect();
                    }
                    Ok(results) => format!(
                        "returned {} outcome(s) for {} row(s)",
                        results.len(),
                        rows.len()
                    ),
                    Err(detail) => detail,
                };
                vec![Outcome::Error(detail); rows.len()]
            }
        }
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("vector", &self.is_vector())
            .finish()
    }
}

/// Run a predicate, turning both errors and panics into a message
fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> std::result::Result<T, String> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(format!("panicked: {message}"))
        }
    }
}
