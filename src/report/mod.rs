//! Declarative shaping of loaded tables: column renames and type coercions

mod coerce;

pub use coerce::{CoercionTarget, coerce};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::error::{DirlinError, Result};
use crate::table::{Table, Value};

/// A report definition: which files to pull and how to shape them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Filename pattern used to locate the report in a folder
    pub pattern: String,

    /// Column renames, original name to new name
    #[serde(default)]
    pub rename: BTreeMap<String, String>,

    /// Columns holding money amounts, coerced to exact decimals
    #[serde(default)]
    pub currency: Vec<String>,

    #[serde(default)]
    pub floats: Vec<String>,

    #[serde(default)]
    pub ints: Vec<String>,

    #[serde(default)]
    pub dates: Vec<String>,

    /// When set, every currency column takes the sign of this column
    #[serde(default)]
    pub key_cash_column: Option<String>,
}

impl Report {
    pub fn new<R, K, V, C, S>(pattern: impl Into<String>, rename: R, currency: C) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            rename: rename
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            currency: currency.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn floats<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.floats = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn ints<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.ints = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn dates<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.dates = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn key_cash_column(mut self, column: impl Into<String>) -> Self {
        self.key_cash_column = Some(column.into());
        self
    }

    /// Column names the shaped table is guaranteed to have
    pub fn expected_columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        let all = self
            .rename
            .values()
            .chain(&self.currency)
            .chain(&self.floats)
            .chain(&self.ints)
            .chain(&self.dates)
            .chain(&self.key_cash_column);
        for column in all {
            if !columns.contains(&column.as_str()) {
                columns.push(column);
            }
        }
        columns
    }

    /// Rename and coerce a table
    ///
    /// Unparseable cells become [`Value::Unparseable`] rather than failing the
    /// table; use [`Report::apply_with_issues`] to get the list of them.
    pub fn apply(&self, table: Table) -> Result<Table> {
        self.apply_with_issues(table).map(|(table, _)| table)
    }

    /// Like [`Report::apply`], also returning one `CoercionFailure` per bad cell
    pub fn apply_with_issues(&self, table: Table) -> Result<(Table, Vec<DirlinError>)> {
        let mut table = self.rename_columns(table)?;
        let mut issues = Vec::new();

        let targets = [
            (&self.currency, CoercionTarget::Currency),
            (&self.floats, CoercionTarget::Float),
            (&self.ints, CoercionTarget::Int),
            (&self.dates, CoercionTarget::Date),
        ];
        for (columns, target) in targets {
            for column in columns {
                self.coerce_column(&mut table, column, target, &mut issues)?;
            }
        }

        if let Some(key) = &self.key_cash_column {
            self.normalize_cash_signs(&mut table, key)?;
        }

        for issue in &issues {
            warn!("{issue}");
        }
        debug!(
            "Report '{}' shaped {} row(s) with {} coercion failure(s)",
            self.pattern,
            table.row_count(),
            issues.len()
        );
        Ok((table, issues))
    }

    /// Negate the numeric cells of `columns`, e.g. to build a reversal file
    pub fn flip_signature(table: &Table, columns: &[&str]) -> Result<Table> {
        let mut flipped = table.clone();
        for column in columns {
            if !flipped.map_column(column, |_, value| value.negated()) {
                return Err(DirlinError::schema_mismatch(
                    *column,
                    "when flipping signs",
                    table.columns(),
                ));
            }
        }
        Ok(flipped)
    }

    /// Renames are applied all at once against the original names
    ///
    /// A mapping whose source is gone but whose target is present counts as
    /// already applied, so shaping an already-shaped table changes nothing.
    fn rename_columns(&self, mut table: Table) -> Result<Table> {
        for (old, new) in &self.rename {
            if !table.has_column(old) && !table.has_column(new) {
                return Err(DirlinError::schema_mismatch(
                    old.as_str(),
                    "in the source file",
                    table.columns(),
                ));
            }
        }

        let renamed: Vec<String> = table
            .columns()
            .iter()
            .map(|column| self.rename.get(column).unwrap_or(column).clone())
            .collect();

        for (idx, column) in renamed.iter().enumerate() {
            if renamed[..idx].contains(column) {
                return Err(DirlinError::Config(format!(
                    "renaming produces duplicate column '{column}' in report '{}'",
                    self.pattern
                )));
            }
        }

        table.set_columns(renamed);
        Ok(table)
    }

    fn coerce_column(
        &self,
        table: &mut Table,
        column: &str,
        target: CoercionTarget,
        issues: &mut Vec<DirlinError>,
    ) -> Result<()> {
        let available = table.columns().to_vec();
        let found = table.map_column(column, |row, value| match coerce(value, target) {
            Some(coerced) => coerced,
            None => {
                let raw = match value {
                    Value::Unparseable(raw) => raw.clone(),
                    other => other.to_string(),
                };
                issues.push(DirlinError::CoercionFailure {
                    row,
                    column: column.to_string(),
                    value: raw.clone(),
                    target: target.to_string(),
                });
                Value::Unparseable(raw)
            }
        });

        if found {
            Ok(())
        } else {
            Err(DirlinError::schema_mismatch(
                column,
                format!("after renaming (needed for {target} coercion)"),
                &available,
            ))
        }
    }

    fn normalize_cash_signs(&self, table: &mut Table, key: &str) -> Result<()> {
        let Some(key_values) = table.column(key) else {
            return Err(DirlinError::schema_mismatch(
                key,
                "after renaming (key cash column)",
                table.columns(),
            ));
        };
        let negative: Vec<bool> = key_values
            .iter()
            .map(|v| v.as_decimal().is_some_and(|d| d < Decimal::ZERO))
            .collect();

        for column in self.currency.iter().filter(|c| c.as_str() != key) {
            table.map_column(column, |row, value| match value {
                Value::Decimal(d) if negative[row] => Value::Decimal(-d.abs()),
                Value::Decimal(d) => Value::Decimal(d.abs()),
                other => other.clone(),
            });
        }
        Ok(())
    }
}
